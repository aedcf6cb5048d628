//! Economy, skill ladder and upgrade rules: pure functions over `GameState`.

use super::state::{FloatingText, GameState, SkillKind, UpgradeEffect, Upgrade};

/// Cost of the first skill level-up.
pub const SKILL_BASE_COST: f64 = 50.0;
/// Growth of the skill cost per level.
pub const SKILL_COST_MULTIPLIER: f64 = 1.8;

/// How long the "+N €$" text floats after a hustle.
pub const FLOATING_TEXT_MS: f64 = 1000.0;

/// Manual hustle: add click power to currency.
pub fn click(state: &mut GameState) {
    let power = state.economy.click_power;
    state.economy.currency += power;

    state.click_count += 1;
    state.click_flash_ms = 150.0;
    let col_offset = ((state.click_count * 7) % 13) as i16 - 6; // -6..+6
    state.floating_texts.push(FloatingText {
        text: format!("+{} €$", format_number(power)),
        ms_left: FLOATING_TEXT_MS,
        col_offset,
    });
    if state.floating_texts.len() > 20 {
        state.floating_texts.remove(0);
    }
}

/// Add `passive_income * elapsed_seconds` to currency.
/// Negative elapsed time (clock skew) is treated as zero.
pub fn accrue_passive(state: &mut GameState, elapsed_seconds: f64) -> f64 {
    let elapsed = if elapsed_seconds.is_finite() {
        elapsed_seconds.max(0.0)
    } else {
        0.0
    };
    let earned = state.economy.passive_income * elapsed;
    state.economy.currency += earned;
    earned
}

/// Cost to raise a skill from `level` to `level + 1`.
pub fn skill_cost(level: u32) -> f64 {
    let exponent = level.saturating_sub(1) as f64;
    (SKILL_BASE_COST * SKILL_COST_MULTIPLIER.powf(exponent)).floor()
}

/// Try to level up a skill. Returns true if successful.
pub fn buy_skill(state: &mut GameState, kind: SkillKind) -> bool {
    let level = state.skill_level(kind);
    let cost = skill_cost(level);
    if state.economy.currency < cost {
        return false;
    }

    state.economy.currency -= cost;
    state.skill_levels[kind.index()] = level + 1;
    state.economy.click_power += kind.click_power_bonus();
    state.economy.passive_income += kind.passive_income_bonus();
    state.add_log(&format!("{} → Lv.{}", kind.name(), level + 1), false);
    true
}

/// Cost of the next purchase of an upgrade.
pub fn upgrade_cost(upgrade: &Upgrade) -> f64 {
    let def = upgrade.def;
    (def.base_cost * def.cost_multiplier.powf(upgrade.purchase_count as f64)).floor()
}

/// Try to buy an upgrade by id. Returns true if successful.
/// Unknown ids and insufficient funds leave the state untouched.
pub fn buy_upgrade(state: &mut GameState, id: &str) -> bool {
    let idx = match state.upgrades.iter().position(|u| u.def.id == id) {
        Some(i) => i,
        None => return false,
    };

    let cost = upgrade_cost(&state.upgrades[idx]);
    if state.economy.currency < cost {
        return false;
    }

    state.economy.currency -= cost;
    state.upgrades[idx].purchase_count += 1;
    let def = state.upgrades[idx].def;
    match def.effect {
        UpgradeEffect::ClickPower(amount) => state.economy.click_power += amount,
        UpgradeEffect::PassiveIncome(amount) => state.economy.passive_income += amount,
    }
    state.add_log(
        &format!("Bought {} (x{})", def.name, state.upgrades[idx].purchase_count),
        false,
    );
    true
}

/// Refresh each upgrade's cached affordability.
/// Returns true if any upgrade became affordable or unaffordable.
pub fn refresh_affordability(state: &mut GameState) -> bool {
    let currency = state.economy.currency;
    let mut changed = false;
    for upgrade in &mut state.upgrades {
        let affordable = currency >= upgrade_cost(upgrade);
        if affordable != upgrade.was_affordable {
            changed = true;
        }
        upgrade.was_affordable = affordable;
    }
    changed
}

/// Count down toasts, floating texts and flashes by `elapsed_ms`.
pub fn age_notifications(state: &mut GameState, elapsed_ms: f64) {
    let elapsed_ms = elapsed_ms.max(0.0);
    for n in &mut state.notifications {
        n.ms_left -= elapsed_ms;
    }
    state.notifications.retain(|n| n.ms_left > 0.0);
    for t in &mut state.floating_texts {
        t.ms_left -= elapsed_ms;
    }
    state.floating_texts.retain(|t| t.ms_left > 0.0);
    state.affordability_flash_ms = (state.affordability_flash_ms - elapsed_ms).max(0.0);
    state.click_flash_ms = (state.click_flash_ms - elapsed_ms).max(0.0);
}

/// Format the balance in whole eddies, rounded down, so the shown amount is
/// never more than what can be spent.
pub fn format_balance(currency: f64) -> String {
    if currency.is_finite() {
        format_number(currency.floor())
    } else {
        format_number(currency)
    }
}

/// Format a number with commas and up to two decimals
/// (e.g. 1234567.5 → "1,234,567.5"). Very large values use scientific notation.
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return "∞".to_string();
    }
    if n < 0.0 {
        return format!("-{}", format_number(-n));
    }
    if n >= 1e15 {
        return format!("{:.3e}", n);
    }

    let hundredths = (n * 100.0).round() as u64;
    let int_part = hundredths / 100;
    let frac = hundredths % 100;

    let s = int_part.to_string();
    let mut grouped = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();

    if frac == 0 {
        grouped
    } else if frac % 10 == 0 {
        format!("{}.{}", grouped, frac / 10)
    } else {
        format!("{}.{:02}", grouped, frac)
    }
}
