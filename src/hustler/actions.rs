//! Semantic action IDs for Night City Hustler click targets.
//!
//! Registered during render and dispatched via `InputEvent::Click`.

// ── Core actions ────────────────────────────────────────────────
pub const HUSTLE: u16 = 0;

// ── Tab navigation ──────────────────────────────────────────────
pub const TAB_UPGRADES: u16 = 10;
pub const TAB_SKILLS: u16 = 11;
pub const TAB_ACHIEVEMENTS: u16 = 12;

// ── Upgrade purchase (base + catalog index) ─────────────────────
pub const BUY_UPGRADE_BASE: u16 = 100;

// ── Skill purchase (base + SkillKind::index) ────────────────────
pub const BUY_SKILL_BASE: u16 = 200;

// ── Achievement list scrolling ──────────────────────────────────
pub const SCROLL_UP: u16 = 300;
pub const SCROLL_DOWN: u16 = 301;
