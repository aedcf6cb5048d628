/// Night City Hustler game state definitions.
use std::collections::BTreeSet;

/// The five leveled attributes of the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SkillKind {
    Body,
    Reflexes,
    Technical,
    Intelligence,
    Cool,
}

impl SkillKind {
    /// All skills in display order.
    pub fn all() -> &'static [SkillKind] {
        &[
            SkillKind::Body,
            SkillKind::Reflexes,
            SkillKind::Technical,
            SkillKind::Intelligence,
            SkillKind::Cool,
        ]
    }

    pub fn index(self) -> usize {
        match self {
            SkillKind::Body => 0,
            SkillKind::Reflexes => 1,
            SkillKind::Technical => 2,
            SkillKind::Intelligence => 3,
            SkillKind::Cool => 4,
        }
    }

    pub fn from_index(idx: usize) -> Option<SkillKind> {
        Self::all().get(idx).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            SkillKind::Body => "Body",
            SkillKind::Reflexes => "Reflexes",
            SkillKind::Technical => "Technical",
            SkillKind::Intelligence => "Intelligence",
            SkillKind::Cool => "Cool",
        }
    }

    /// Lowercase identifier used in achievement ids.
    pub fn id(self) -> &'static str {
        match self {
            SkillKind::Body => "body",
            SkillKind::Reflexes => "reflexes",
            SkillKind::Technical => "technical",
            SkillKind::Intelligence => "intelligence",
            SkillKind::Cool => "cool",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SkillKind::Body => "Increases click power by 0.5",
            SkillKind::Reflexes => "Increases passive income by 0.2",
            SkillKind::Technical => "Increases click power by 0.3 and passive income by 0.1",
            SkillKind::Intelligence => "Increases passive income by 0.3",
            SkillKind::Cool => "Increases click power by 0.2 and passive income by 0.2",
        }
    }

    /// Click power gained per level-up.
    pub fn click_power_bonus(self) -> f64 {
        match self {
            SkillKind::Body => 0.5,
            SkillKind::Reflexes => 0.0,
            SkillKind::Technical => 0.3,
            SkillKind::Intelligence => 0.0,
            SkillKind::Cool => 0.2,
        }
    }

    /// Passive income (per second) gained per level-up.
    pub fn passive_income_bonus(self) -> f64 {
        match self {
            SkillKind::Body => 0.0,
            SkillKind::Reflexes => 0.2,
            SkillKind::Technical => 0.1,
            SkillKind::Intelligence => 0.3,
            SkillKind::Cool => 0.2,
        }
    }
}

/// What one purchase of an upgrade adds to the economy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UpgradeEffect {
    ClickPower(f64),
    PassiveIncome(f64),
}

/// Immutable definition of a repeatable upgrade.
#[derive(Debug, PartialEq)]
pub struct UpgradeDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub base_cost: f64,
    pub cost_multiplier: f64,
    pub effect: UpgradeEffect,
}

/// The upgrade catalog, in display order.
pub static UPGRADE_DEFS: &[UpgradeDef] = &[
    UpgradeDef {
        id: "street_cred",
        name: "Street Cred",
        description: "Increase click power by 1",
        base_cost: 10.0,
        cost_multiplier: 1.5,
        effect: UpgradeEffect::ClickPower(1.0),
    },
    UpgradeDef {
        id: "data_mining",
        name: "Data Mining Rig",
        description: "Generate 1 €$ per second",
        base_cost: 25.0,
        cost_multiplier: 1.8,
        effect: UpgradeEffect::PassiveIncome(1.0),
    },
    UpgradeDef {
        id: "netrunner",
        name: "Netrunner Contact",
        description: "Generate 5 €$ per second",
        base_cost: 100.0,
        cost_multiplier: 2.0,
        effect: UpgradeEffect::PassiveIncome(5.0),
    },
];

/// An upgrade definition plus how often it was bought.
#[derive(Clone, Debug)]
pub struct Upgrade {
    pub def: &'static UpgradeDef,
    pub purchase_count: u32,
    /// Affordability at the last check. Only drives UI highlighting.
    pub was_affordable: bool,
}

impl Upgrade {
    pub fn new(def: &'static UpgradeDef) -> Self {
        Self {
            def,
            purchase_count: 0,
            was_affordable: false,
        }
    }
}

/// Currency and the two rates that define the player's power level.
#[derive(Clone, Debug, PartialEq)]
pub struct Economy {
    pub currency: f64,
    /// Currency gained per hustle.
    pub click_power: f64,
    /// Currency gained per second, online or offline.
    pub passive_income: f64,
}

impl Default for Economy {
    fn default() -> Self {
        Self {
            currency: 0.0,
            click_power: 1.0,
            passive_income: 0.0,
        }
    }
}

/// Which panel the lower half of the screen shows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tab {
    Upgrades,
    Skills,
    Achievements,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NotificationKind {
    AchievementUnlocked { title: String },
    /// Several achievements unlocked in the same check.
    AchievementBurst { count: usize },
    Saved,
}

/// A transient toast.
#[derive(Clone, Debug)]
pub struct Notification {
    pub kind: NotificationKind,
    pub ms_left: f64,
}

/// Rising "+N €$" text after a hustle.
#[derive(Clone, Debug)]
pub struct FloatingText {
    pub text: String,
    pub ms_left: f64,
    /// Column offset from the centre of the hustle button.
    pub col_offset: i16,
}

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub text: String,
    pub is_important: bool,
}

/// Full game state.
pub struct GameState {
    pub economy: Economy,
    /// Level of each skill, indexed by `SkillKind::index()`. Always >= 1.
    pub skill_levels: [u32; 5],
    /// One entry per `UPGRADE_DEFS` entry, same order.
    pub upgrades: Vec<Upgrade>,
    /// Ids of unlocked achievements. Only ever grows.
    pub unlocked: BTreeSet<String>,
    /// Wall-clock time passive income was last accrued (ms since epoch).
    pub last_update_ms: f64,

    // UI state (not persisted)
    pub tab: Tab,
    pub achievement_scroll: u16,
    pub notifications: Vec<Notification>,
    pub floating_texts: Vec<FloatingText>,
    pub log: Vec<LogEntry>,
    /// Remaining highlight time after an upgrade's affordability flipped.
    pub affordability_flash_ms: f64,
    /// Remaining highlight time of the hustle button after a click.
    pub click_flash_ms: f64,
    /// Counter used to spread floating texts horizontally.
    pub click_count: u64,
}

impl GameState {
    pub fn new(now_ms: f64) -> Self {
        Self {
            economy: Economy::default(),
            skill_levels: [1; 5],
            upgrades: UPGRADE_DEFS.iter().map(Upgrade::new).collect(),
            unlocked: BTreeSet::new(),
            last_update_ms: now_ms,
            tab: Tab::Upgrades,
            achievement_scroll: 0,
            notifications: Vec::new(),
            floating_texts: Vec::new(),
            log: Vec::new(),
            affordability_flash_ms: 0.0,
            click_flash_ms: 0.0,
            click_count: 0,
        }
    }

    pub fn skill_level(&self, kind: SkillKind) -> u32 {
        self.skill_levels[kind.index()]
    }

    pub fn upgrade(&self, id: &str) -> Option<&Upgrade> {
        self.upgrades.iter().find(|u| u.def.id == id)
    }

    pub fn add_log(&mut self, text: &str, is_important: bool) {
        self.log.push(LogEntry {
            text: text.to_string(),
            is_important,
        });
        if self.log.len() > 50 {
            self.log.remove(0);
        }
    }

    pub fn notify(&mut self, kind: NotificationKind, ms: f64) {
        self.notifications.push(Notification { kind, ms_left: ms });
        if self.notifications.len() > 5 {
            self.notifications.remove(0);
        }
    }
}
