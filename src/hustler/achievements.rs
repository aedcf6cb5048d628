//! Achievement catalog and evaluation.
//!
//! The catalog is plain data generated once from threshold tables. Each entry
//! carries a [`Condition`] that is checked against an immutable `&GameState`,
//! so predicates never capture or mutate game state.
//!
//! Evaluation is one pass over the catalog. A condition that cannot be
//! evaluated (e.g. it names an upgrade the catalog no longer has) yields a
//! [`PredicateError`]; the fault is logged once and the entry simply stays
//! locked while the rest of the pass continues.

use std::collections::HashSet;

use thiserror::Error;

use super::logic::format_number;
use super::state::{GameState, SkillKind, UPGRADE_DEFS};

/// Achievement category, used for grouping in the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Family {
    Money,
    ClickPower,
    PassiveIncome,
    Upgrades,
    Skills,
    AllSkills,
    Combos,
}

impl Family {
    pub fn all() -> &'static [Family] {
        &[
            Family::Money,
            Family::ClickPower,
            Family::PassiveIncome,
            Family::Upgrades,
            Family::Skills,
            Family::AllSkills,
            Family::Combos,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            Family::Money => "Money",
            Family::ClickPower => "Click Power",
            Family::PassiveIncome => "Passive Income",
            Family::Upgrades => "Upgrades",
            Family::Skills => "Skills",
            Family::AllSkills => "Skill Mastery",
            Family::Combos => "Combos",
        }
    }
}

/// Predicate of an achievement. All comparisons are `>=`.
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    Currency(f64),
    ClickPower(f64),
    PassiveIncome(f64),
    UpgradeOwned { upgrade_id: String, count: u32 },
    SkillLevel { skill: SkillKind, level: u32 },
    /// Every skill at or above `level`.
    AllSkills(u32),
    /// Both named skills at or above `level`.
    SkillPair { a: SkillKind, b: SkillKind, level: u32 },
}

#[derive(Debug, Error, PartialEq)]
pub enum PredicateError {
    #[error("unknown upgrade id `{0}`")]
    UnknownUpgrade(String),
    #[error("{field} is not a finite number")]
    NonFinite { field: &'static str },
}

fn finite(value: f64, field: &'static str) -> Result<f64, PredicateError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PredicateError::NonFinite { field })
    }
}

impl Condition {
    /// Evaluate against the current state. Pure: never mutates.
    pub fn check(&self, state: &GameState) -> Result<bool, PredicateError> {
        let economy = &state.economy;
        let met = match self {
            Condition::Currency(t) => finite(economy.currency, "currency")? >= *t,
            Condition::ClickPower(t) => finite(economy.click_power, "click power")? >= *t,
            Condition::PassiveIncome(t) => {
                finite(economy.passive_income, "passive income")? >= *t
            }
            Condition::UpgradeOwned { upgrade_id, count } => {
                let upgrade = state
                    .upgrade(upgrade_id)
                    .ok_or_else(|| PredicateError::UnknownUpgrade(upgrade_id.clone()))?;
                upgrade.purchase_count >= *count
            }
            Condition::SkillLevel { skill, level } => state.skill_level(*skill) >= *level,
            Condition::AllSkills(level) => state.skill_levels.iter().min().copied().unwrap_or(0) >= *level,
            Condition::SkillPair { a, b, level } => {
                state.skill_level(*a) >= *level && state.skill_level(*b) >= *level
            }
        };
        Ok(met)
    }
}

#[derive(Clone, Debug)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub family: Family,
    pub condition: Condition,
}

/// A geometric threshold family over one economy field.
struct GeometricTier {
    title: &'static str,
    family: Family,
    /// Description with `{X}` standing for the formatted threshold.
    template: &'static str,
    initial: f64,
    growth: f64,
    make: fn(f64) -> Condition,
}

const TIERS_PER_GEOMETRIC_FAMILY: usize = 100;

const GEOMETRIC_TIERS: &[GeometricTier] = &[
    GeometricTier {
        title: "Money Maker",
        family: Family::Money,
        template: "Accumulate €$ {X}",
        initial: 100.0,
        growth: 1.5,
        make: Condition::Currency,
    },
    GeometricTier {
        title: "Click Master",
        family: Family::ClickPower,
        template: "Reach {X} click power",
        initial: 10.0,
        growth: 1.4,
        make: Condition::ClickPower,
    },
    GeometricTier {
        title: "Passive Master",
        family: Family::PassiveIncome,
        template: "Reach {X} passive income per second",
        initial: 5.0,
        growth: 1.45,
        make: Condition::PassiveIncome,
    },
    GeometricTier {
        title: "Eddie King",
        family: Family::Money,
        template: "Hold €$ {X} at once",
        initial: 1000.0,
        growth: 1.6,
        make: Condition::Currency,
    },
    GeometricTier {
        title: "Speed Demon",
        family: Family::ClickPower,
        template: "Push click power to {X}",
        initial: 20.0,
        growth: 1.3,
        make: Condition::ClickPower,
    },
];

/// Ownership tiers per upgrade: 5, 10, … 200.
const UPGRADE_TIERS: u32 = 40;
const UPGRADE_TIER_STEP: u32 = 5;
/// Per-skill tiers: levels 1–20 are "Expert", 21–40 "Legend".
const SKILL_TIERS: u32 = 40;
const SKILL_BASE_TIERS: u32 = 20;
const ALL_SKILLS_TIERS: u32 = 100;
const COMBO_TIERS: u32 = 50;

/// Named skill pairs: (id, title, a, b).
const COMBOS: &[(&str, &str, SkillKind, SkillKind)] = &[
    ("street_samurai", "Street Samurai", SkillKind::Body, SkillKind::Reflexes),
    ("console_cowboy", "Console Cowboy", SkillKind::Technical, SkillKind::Intelligence),
    ("smooth_operator", "Smooth Operator", SkillKind::Intelligence, SkillKind::Cool),
    ("gunslinger", "Gunslinger", SkillKind::Reflexes, SkillKind::Cool),
];

/// Upgrade ids are matched against their short achievement names.
fn upgrade_short_name(id: &str) -> &'static str {
    match id {
        "street_cred" => "Street Cred",
        "data_mining" => "Data Mining",
        "netrunner" => "Netrunner",
        _ => "Upgrade",
    }
}

/// `"Money Maker"` → `"money_maker"`.
fn slug(title: &str) -> String {
    title.to_lowercase().split_whitespace().collect::<Vec<_>>().join("_")
}

/// `floor(initial * growth^index)` for `count` indices.
pub fn geometric_thresholds(initial: f64, growth: f64, count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| (initial * growth.powf(i as f64)).floor())
        .collect()
}

/// `(index + 1) * step` for `count` indices.
pub fn linear_thresholds(step: u32, count: u32) -> Vec<u32> {
    (0..count).map(|i| (i + 1) * step).collect()
}

/// The static achievement catalog. Built once, never mutated.
pub struct Catalog {
    entries: Vec<Achievement>,
}

impl Catalog {
    pub fn build() -> Self {
        let mut entries = Vec::new();

        for tier in GEOMETRIC_TIERS {
            let thresholds =
                geometric_thresholds(tier.initial, tier.growth, TIERS_PER_GEOMETRIC_FAMILY);
            for (i, threshold) in thresholds.into_iter().enumerate() {
                entries.push(Achievement {
                    id: format!("{}_{}", slug(tier.title), i + 1),
                    title: format!("{} {}", tier.title, i + 1),
                    description: tier.template.replace("{X}", &format_number(threshold)),
                    family: tier.family,
                    condition: (tier.make)(threshold),
                });
            }
        }

        for def in UPGRADE_DEFS {
            let name = upgrade_short_name(def.id);
            for (i, count) in linear_thresholds(UPGRADE_TIER_STEP, UPGRADE_TIERS)
                .into_iter()
                .enumerate()
            {
                entries.push(Achievement {
                    id: format!("{}_{}", def.id, i + 1),
                    title: format!("{} Master {}", name, i + 1),
                    description: format!("Own {} {} upgrades", count, name),
                    family: Family::Upgrades,
                    condition: Condition::UpgradeOwned {
                        upgrade_id: def.id.to_string(),
                        count,
                    },
                });
            }
        }

        for &skill in SkillKind::all() {
            for level in linear_thresholds(1, SKILL_TIERS) {
                let rank = if level <= SKILL_BASE_TIERS { "Expert" } else { "Legend" };
                entries.push(Achievement {
                    id: format!("{}_{}", skill.id(), level),
                    title: format!("{} {} {}", skill.name(), rank, level),
                    description: format!("Reach {} level {}", skill.name(), level),
                    family: Family::Skills,
                    condition: Condition::SkillLevel { skill, level },
                });
            }
        }

        for level in linear_thresholds(1, ALL_SKILLS_TIERS) {
            entries.push(Achievement {
                id: format!("all_skills_{}", level),
                title: format!("Well Rounded {}", level),
                description: format!("Reach level {} in every skill", level),
                family: Family::AllSkills,
                condition: Condition::AllSkills(level),
            });
        }

        for &(id, title, a, b) in COMBOS {
            for level in linear_thresholds(1, COMBO_TIERS) {
                entries.push(Achievement {
                    id: format!("{}_{}", id, level),
                    title: format!("{} {}", title, level),
                    description: format!(
                        "Reach level {} in both {} and {}",
                        level,
                        a.name(),
                        b.name()
                    ),
                    family: Family::Combos,
                    condition: Condition::SkillPair { a, b, level },
                });
            }
        }

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, index: usize) -> Option<&Achievement> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Achievement> {
        self.entries.iter()
    }

    pub fn by_family(&self, family: Family) -> impl Iterator<Item = &Achievement> {
        self.entries.iter().filter(move |a| a.family == family)
    }

    /// How many catalog entries the state has unlocked. Ids from older
    /// catalogs that are still in the save are not counted.
    pub fn unlocked_count(&self, state: &GameState) -> usize {
        self.entries
            .iter()
            .filter(|a| state.unlocked.contains(&a.id))
            .count()
    }
}

/// Achievement ids whose predicate already faulted this session.
/// Used to log each fault once instead of on every check.
#[derive(Default)]
pub struct FaultLog {
    reported: HashSet<String>,
}

impl FaultLog {
    /// Returns true the first time `id` is recorded.
    fn record(&mut self, id: &str) -> bool {
        self.reported.insert(id.to_string())
    }
}

/// Check every locked achievement and unlock those whose condition holds.
///
/// Returns the catalog indices of newly unlocked entries, in catalog order.
/// Faulting predicates count as "not met".
pub fn evaluate(catalog: &Catalog, state: &mut GameState, faults: &mut FaultLog) -> Vec<usize> {
    let mut newly = Vec::new();
    for (idx, achievement) in catalog.entries.iter().enumerate() {
        if state.unlocked.contains(&achievement.id) {
            continue;
        }
        match achievement.condition.check(state) {
            Ok(true) => newly.push(idx),
            Ok(false) => {}
            Err(e) => {
                if faults.record(&achievement.id) {
                    crate::console::warn(&format!(
                        "achievement `{}` skipped: {}",
                        achievement.id, e
                    ));
                }
            }
        }
    }
    for &idx in &newly {
        state.unlocked.insert(catalog.entries[idx].id.clone());
    }
    newly
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_unlocked_set_never_shrinks(
            steps in proptest::collection::vec((0.0f64..1e7, 1.0f64..500.0, 0.0f64..300.0, 1u32..45), 1..12)
        ) {
            let catalog = Catalog::build();
            let mut state = GameState::new(0.0);
            let mut faults = FaultLog::default();
            let mut previous = state.unlocked.clone();
            for (currency, click, passive, level) in steps {
                state.economy.currency = currency;
                state.economy.click_power = click;
                state.economy.passive_income = passive;
                state.skill_levels = [level; 5];
                let newly = evaluate(&catalog, &mut state, &mut faults);
                prop_assert!(previous.is_subset(&state.unlocked));
                prop_assert_eq!(state.unlocked.len(), previous.len() + newly.len());
                previous = state.unlocked.clone();
            }
        }

        #[test]
        fn prop_evaluation_matches_predicates(currency in 0.0f64..1e9, level in 1u32..60) {
            let catalog = Catalog::build();
            let mut state = GameState::new(0.0);
            state.economy.currency = currency;
            state.skill_levels = [level; 5];
            let mut faults = FaultLog::default();
            evaluate(&catalog, &mut state, &mut faults);
            for a in catalog.iter() {
                let met = a.condition.check(&state).unwrap_or(false);
                prop_assert_eq!(state.unlocked.contains(&a.id), met, "{}", a.id);
            }
        }
    }
}
