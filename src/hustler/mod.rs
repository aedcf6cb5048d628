//! Night City Hustler: hustle for eddies, buy upgrades, level skills and
//! collect achievements.

pub mod achievements;
pub mod actions;
pub mod clock;
pub mod logic;
pub mod render;
pub mod save;
pub mod state;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::input::{ClickState, InputEvent};

use achievements::{Catalog, FaultLog};
use actions::*;
use clock::ProgressionClock;
use logic::format_number;
use save::SaveStore;
use state::{GameState, NotificationKind, SkillKind, Tab, UPGRADE_DEFS};

/// Toast lifetime for an unlocked achievement.
pub const ACHIEVEMENT_NOTIFICATION_MS: f64 = 3000.0;
/// Toast lifetime for "Game saved!".
pub const SAVE_NOTIFICATION_MS: f64 = 2000.0;
/// Upgrade panel highlight after an affordability change.
const AFFORDABILITY_FLASH_MS: f64 = 500.0;
/// More unlocks than this in one check are announced as one toast.
const MAX_INDIVIDUAL_TOASTS: usize = 3;

/// What just happened to the state. Passed to
/// [`HustlerGame::on_state_changed`] after every mutation.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    Clicked,
    Purchased,
    Ticked,
    /// Catalog indices of newly unlocked achievements.
    Unlocked(Vec<usize>),
}

pub struct HustlerGame<S: SaveStore> {
    pub state: GameState,
    pub catalog: Catalog,
    clock: ProgressionClock,
    faults: FaultLog,
    store: S,
    /// Wall-clock time of the last `tick` call, for aging toasts.
    last_frame_ms: f64,
}

impl<S: SaveStore> HustlerGame<S> {
    /// Start a session: load the saved game (if any), credit offline
    /// earnings, and run the initial achievement check.
    pub fn new(mut store: S, now_ms: f64) -> Self {
        let mut state = GameState::new(now_ms);

        if let Some(snap) = save::load_snapshot(&mut store) {
            save::apply_snapshot(&snap, &mut state);
            let earned = clock::offline_catch_up(&mut state, now_ms);
            state.add_log("Save data loaded", false);
            if earned > 0.0 {
                let msg = format!("Earned €$ {} while offline", format_number(earned));
                crate::console::log(&msg);
                state.add_log(&msg, true);
            }
        }

        let mut game = Self {
            state,
            catalog: Catalog::build(),
            clock: ProgressionClock::new(now_ms),
            faults: FaultLog::default(),
            store,
            last_frame_ms: now_ms,
        };
        logic::refresh_affordability(&mut game.state);
        game.evaluate_achievements(now_ms);
        game
    }

    // ── Commands ────────────────────────────────────────────────

    pub fn click(&mut self) {
        logic::click(&mut self.state);
        self.on_state_changed(StateChange::Clicked);
    }

    /// Buy an upgrade by id. Unaffordable or unknown ids are a silent no-op.
    pub fn purchase_upgrade(&mut self, id: &str) -> bool {
        let bought = logic::buy_upgrade(&mut self.state, id);
        if bought {
            self.on_state_changed(StateChange::Purchased);
        }
        bought
    }

    /// Level up a skill. Unaffordable is a silent no-op.
    pub fn purchase_skill(&mut self, kind: SkillKind) -> bool {
        let bought = logic::buy_skill(&mut self.state, kind);
        if bought {
            self.on_state_changed(StateChange::Purchased);
        }
        bought
    }

    /// Advance to `now_ms`. Call every frame; the clock decides what runs.
    pub fn tick(&mut self, now_ms: f64) {
        let frame_ms = now_ms - self.last_frame_ms;
        self.last_frame_ms = now_ms;
        logic::age_notifications(&mut self.state, frame_ms);

        let report = self.clock.advance(&mut self.state, now_ms);
        if !report.ticked {
            return;
        }
        self.on_state_changed(StateChange::Ticked);
        if report.evaluate {
            self.evaluate_achievements(now_ms);
        }
        if report.autosave {
            self.save(now_ms, true);
        }
    }

    /// Persist the current state. `announce` shows the "Game saved!" toast.
    ///
    /// Only announced saves restart the autosave period. Silent saves after
    /// purchases or unlocks leave it alone.
    pub fn save(&mut self, now_ms: f64, announce: bool) -> bool {
        let snap = save::snapshot(&self.state);
        let saved = save::store_snapshot(&mut self.store, &snap);
        if announce {
            self.clock.autosaved(now_ms);
        }
        if saved && announce {
            self.state
                .notify(NotificationKind::Saved, SAVE_NOTIFICATION_MS);
        }
        saved
    }

    fn evaluate_achievements(&mut self, now_ms: f64) {
        let newly = achievements::evaluate(&self.catalog, &mut self.state, &mut self.faults);
        self.clock.evaluated(now_ms);
        if !newly.is_empty() {
            self.on_state_changed(StateChange::Unlocked(newly));
        }
    }

    /// The single observation point after every state transition.
    /// Presentation side effects and event-driven saves hang off it.
    pub fn on_state_changed(&mut self, change: StateChange) {
        match change {
            StateChange::Clicked => {}
            StateChange::Ticked => {
                if logic::refresh_affordability(&mut self.state) {
                    self.state.affordability_flash_ms = AFFORDABILITY_FLASH_MS;
                }
            }
            StateChange::Purchased => {
                logic::refresh_affordability(&mut self.state);
                self.save(self.last_frame_ms, false);
            }
            StateChange::Unlocked(indices) => {
                self.announce_unlocks(&indices);
                self.save(self.last_frame_ms, false);
            }
        }
    }

    fn announce_unlocks(&mut self, indices: &[usize]) {
        if indices.len() > MAX_INDIVIDUAL_TOASTS {
            self.state.notify(
                NotificationKind::AchievementBurst {
                    count: indices.len(),
                },
                ACHIEVEMENT_NOTIFICATION_MS,
            );
            self.state
                .add_log(&format!("🏆 {} achievements unlocked", indices.len()), true);
            return;
        }
        for &idx in indices {
            if let Some(a) = self.catalog.get(idx) {
                let title = a.title.clone();
                self.state.add_log(&format!("🏆 {}", title), true);
                self.state.notify(
                    NotificationKind::AchievementUnlocked { title },
                    ACHIEVEMENT_NOTIFICATION_MS,
                );
            }
        }
    }

    // ── Input ───────────────────────────────────────────────────

    fn handle_key(&mut self, key: char) -> bool {
        match key {
            'h' | ' ' => {
                self.click();
                true
            }
            'u' => {
                self.state.tab = Tab::Upgrades;
                true
            }
            's' => {
                self.state.tab = Tab::Skills;
                true
            }
            'a' => {
                self.state.tab = Tab::Achievements;
                true
            }
            '1'..='9' => {
                let idx = (key as u8 - b'1') as usize;
                match self.state.tab {
                    Tab::Upgrades => match UPGRADE_DEFS.get(idx) {
                        Some(def) => {
                            self.purchase_upgrade(def.id);
                            true
                        }
                        None => false,
                    },
                    Tab::Skills => match SkillKind::from_index(idx) {
                        Some(kind) => {
                            self.purchase_skill(kind);
                            true
                        }
                        None => false,
                    },
                    Tab::Achievements => false,
                }
            }
            'j' if self.state.tab == Tab::Achievements => {
                self.scroll(1);
                true
            }
            'k' if self.state.tab == Tab::Achievements => {
                self.scroll(-1);
                true
            }
            _ => false,
        }
    }

    fn handle_click(&mut self, action_id: u16) -> bool {
        match action_id {
            HUSTLE => {
                self.click();
                true
            }
            TAB_UPGRADES => self.handle_key('u'),
            TAB_SKILLS => self.handle_key('s'),
            TAB_ACHIEVEMENTS => self.handle_key('a'),
            id if (BUY_UPGRADE_BASE..BUY_UPGRADE_BASE + UPGRADE_DEFS.len() as u16)
                .contains(&id) =>
            {
                let def = &UPGRADE_DEFS[(id - BUY_UPGRADE_BASE) as usize];
                self.purchase_upgrade(def.id);
                true
            }
            id if (BUY_SKILL_BASE..BUY_SKILL_BASE + SkillKind::all().len() as u16)
                .contains(&id) =>
            {
                match SkillKind::from_index((id - BUY_SKILL_BASE) as usize) {
                    Some(kind) => {
                        self.purchase_skill(kind);
                        true
                    }
                    None => false,
                }
            }
            SCROLL_UP => {
                self.scroll(-render::ACHIEVEMENT_PAGE);
                true
            }
            SCROLL_DOWN => {
                self.scroll(render::ACHIEVEMENT_PAGE);
                true
            }
            _ => false,
        }
    }

    fn scroll(&mut self, delta: i32) {
        let max = render::achievement_line_count(&self.catalog) as i32;
        let next = (self.state.achievement_scroll as i32 + delta).clamp(0, max.max(0));
        self.state.achievement_scroll = next as u16;
    }

    /// Handle an input event. Returns true if the event was consumed.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Key(c) => self.handle_key(*c),
            InputEvent::Click(id) => self.handle_click(*id),
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(&self.state, &self.catalog, f, area, click_state);
    }

    #[cfg(test)]
    fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use save::{MemoryStore, SaveSnapshot, STORAGE_KEY};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn stored_snapshot(game: &HustlerGame<MemoryStore>) -> Option<SaveSnapshot> {
        game.store()
            .read(STORAGE_KEY)
            .and_then(|json| save::decode(&json).ok())
    }

    #[test]
    fn new_game_without_save_starts_fresh() {
        let game = HustlerGame::new(MemoryStore::default(), 1_000.0);
        assert!(approx(game.state.economy.currency, 0.0));
        assert!(approx(game.state.economy.click_power, 1.0));
        // level-1 skill tiers unlock on the initial check
        assert!(game.state.unlocked.contains("body_1"));
    }

    #[test]
    fn hustle_key_and_click_target() {
        let mut game = HustlerGame::new(MemoryStore::default(), 0.0);
        assert!(game.handle_input(&InputEvent::Key('h')));
        assert!(game.handle_input(&InputEvent::Click(HUSTLE)));
        assert!(approx(game.state.economy.currency, 2.0));
    }

    #[test]
    fn number_keys_depend_on_tab() {
        let mut game = HustlerGame::new(MemoryStore::default(), 0.0);
        game.state.economy.currency = 1_000.0;

        game.handle_input(&InputEvent::Key('1')); // Upgrades tab: Street Cred
        assert_eq!(game.state.upgrades[0].purchase_count, 1);
        assert_eq!(game.state.skill_levels, [1; 5]);

        game.handle_input(&InputEvent::Key('s'));
        game.handle_input(&InputEvent::Key('1')); // Skills tab: Body
        assert_eq!(game.state.skill_level(SkillKind::Body), 2);
        assert_eq!(game.state.upgrades[0].purchase_count, 1);

        assert!(!game.handle_input(&InputEvent::Key('9')));
    }

    #[test]
    fn click_targets_buy_upgrades_and_skills() {
        let mut game = HustlerGame::new(MemoryStore::default(), 0.0);
        game.state.economy.currency = 1_000.0;
        assert!(game.handle_input(&InputEvent::Click(BUY_UPGRADE_BASE + 2)));
        assert_eq!(game.state.upgrades[2].purchase_count, 1);
        assert!(game.handle_input(&InputEvent::Click(BUY_SKILL_BASE + 4)));
        assert_eq!(game.state.skill_level(SkillKind::Cool), 2);
        assert!(!game.handle_input(&InputEvent::Click(BUY_SKILL_BASE + 5)));
    }

    #[test]
    fn purchase_saves_immediately() {
        let mut game = HustlerGame::new(MemoryStore::default(), 0.0);
        game.state.economy.currency = 10.0;
        assert!(game.purchase_upgrade("street_cred"));
        let snap = stored_snapshot(&game).unwrap();
        assert_eq!(snap.upgrades[0].purchase_count, 1);
        assert!(approx(snap.currency, 0.0));
    }

    #[test]
    fn failed_purchase_changes_nothing() {
        let mut game = HustlerGame::new(MemoryStore::default(), 0.0);
        let saved_before = stored_snapshot(&game);
        assert!(!game.purchase_skill(SkillKind::Intelligence));
        assert!(!game.purchase_upgrade("netrunner"));
        assert_eq!(stored_snapshot(&game), saved_before);
        assert_eq!(game.state.skill_levels, [1; 5]);
    }

    #[test]
    fn achievements_converge_within_a_second() {
        let mut game = HustlerGame::new(MemoryStore::default(), 0.0);
        game.state.economy.currency = 100.0;
        game.tick(100.0);
        assert!(!game.state.unlocked.contains("money_maker_1"));
        let mut t = 100.0;
        while t < 1_100.0 {
            t += 100.0;
            game.tick(t);
        }
        assert!(game.state.unlocked.contains("money_maker_1"));
        assert!(game
            .state
            .notifications
            .iter()
            .any(|n| n.kind == NotificationKind::AchievementUnlocked { title: "Money Maker 1".to_string() }));
    }

    #[test]
    fn many_unlocks_collapse_into_one_toast() {
        let mut game = HustlerGame::new(MemoryStore::default(), 0.0);
        game.state.notifications.clear();
        game.state.economy.currency = 1e6;
        game.tick(1_000.0);
        assert!(game
            .state
            .notifications
            .iter()
            .any(|n| matches!(n.kind, NotificationKind::AchievementBurst { .. })));
    }

    #[test]
    fn autosave_announces() {
        let mut game = HustlerGame::new(MemoryStore::default(), 0.0);
        game.state.economy.passive_income = 1.0;
        let mut t = 0.0;
        while t < 30_000.0 {
            t += 100.0;
            game.tick(t);
        }
        let snap = stored_snapshot(&game).unwrap();
        assert!(approx(snap.currency, 30.0));
        assert!(game
            .state
            .notifications
            .iter()
            .any(|n| n.kind == NotificationKind::Saved));
    }

    #[test]
    fn frequent_purchases_do_not_delay_autosave() {
        let mut game = HustlerGame::new(MemoryStore::default(), 0.0);
        game.state.economy.currency = 1e6;
        game.state.notifications.clear();
        let mut t = 0.0;
        while t < 30_000.0 {
            t += 100.0;
            game.tick(t);
            // a purchase every 5 seconds, each one saving silently
            if (t as u64) % 5_000 == 0 {
                assert!(game.purchase_upgrade("street_cred"));
            }
        }
        assert!(game
            .state
            .notifications
            .iter()
            .any(|n| n.kind == NotificationKind::Saved));
    }

    #[test]
    fn reload_credits_offline_time() {
        let mut game = HustlerGame::new(MemoryStore::default(), 1_000.0);
        game.state.economy.currency = 1_000.0;
        assert!(game.purchase_upgrade("netrunner")); // +5/s, saves
        let HustlerGame { store, .. } = game;

        // back after 60 seconds
        let reloaded = HustlerGame::new(store, 61_000.0);
        assert!(approx(reloaded.state.economy.currency, 900.0 + 300.0));
        assert!(approx(reloaded.state.last_update_ms, 61_000.0));
        assert!(reloaded.state.log.iter().any(|l| l.text.contains("while offline")));
    }

    #[test]
    fn reload_roundtrip_preserves_progress() {
        let mut game = HustlerGame::new(MemoryStore::default(), 5_000.0);
        game.state.economy.currency = 5_000.0;
        game.purchase_upgrade("street_cred");
        game.purchase_skill(SkillKind::Technical);
        game.save(5_000.0, false);
        let economy = game.state.economy.clone();
        let levels = game.state.skill_levels;
        let unlocked = game.state.unlocked.clone();
        let HustlerGame { store, .. } = game;

        // same instant: no offline income
        let reloaded = HustlerGame::new(store, 5_000.0);
        assert_eq!(reloaded.state.economy, economy);
        assert_eq!(reloaded.state.skill_levels, levels);
        assert_eq!(reloaded.state.upgrades[0].purchase_count, 1);
        assert!(unlocked.is_subset(&reloaded.state.unlocked));
    }

    #[test]
    fn scroll_is_clamped() {
        let mut game = HustlerGame::new(MemoryStore::default(), 0.0);
        game.handle_input(&InputEvent::Key('a'));
        game.handle_input(&InputEvent::Key('k'));
        assert_eq!(game.state.achievement_scroll, 0);
        game.handle_input(&InputEvent::Key('j'));
        assert_eq!(game.state.achievement_scroll, 1);
        for _ in 0..100 {
            game.handle_input(&InputEvent::Click(SCROLL_DOWN));
        }
        assert_eq!(
            game.state.achievement_scroll as usize,
            render::achievement_line_count(&game.catalog)
        );
    }
}
