//! Progression clock: passive accrual over wall-clock time.
//!
//! Live play and offline catch-up share one operation, `accrue_passive`, fed
//! with the wall-clock time since `GameState::last_update_ms`. The periodic
//! work around it (100ms ticks, throttled achievement checks, autosave) is
//! gated by [`Cadence`]s so the frame rate never decides how often it runs.

use super::logic::accrue_passive;
use super::state::GameState;
use crate::time::Cadence;

/// Live tick period.
pub const TICK_INTERVAL_MS: f64 = 100.0;
/// Minimum time between two achievement evaluations.
pub const ACHIEVEMENT_CHECK_INTERVAL_MS: f64 = 1000.0;
/// Autosave period.
pub const AUTOSAVE_INTERVAL_MS: f64 = 30_000.0;

/// Seconds from `from_ms` to `to_ms`, never negative.
pub fn elapsed_seconds(from_ms: f64, to_ms: f64) -> f64 {
    let elapsed = (to_ms - from_ms) / 1000.0;
    if elapsed.is_finite() && elapsed > 0.0 {
        elapsed
    } else {
        0.0
    }
}

/// Accrue passive income since the last update and move the update mark to
/// `now_ms`. Returns the currency earned.
pub fn live_tick(state: &mut GameState, now_ms: f64) -> f64 {
    let earned = accrue_passive(state, elapsed_seconds(state.last_update_ms, now_ms));
    state.last_update_ms = now_ms;
    earned
}

/// One lump accrual for the time spent away, applied right after a load.
///
/// If the saved timestamp is not in the past (clock skew, or loaded within
/// the same millisecond) nothing changes, including the timestamp.
pub fn offline_catch_up(state: &mut GameState, now_ms: f64) -> f64 {
    let elapsed = elapsed_seconds(state.last_update_ms, now_ms);
    if elapsed <= 0.0 {
        return 0.0;
    }
    let earned = accrue_passive(state, elapsed);
    state.last_update_ms = now_ms;
    earned
}

/// What a call to [`ProgressionClock::advance`] did and what is due.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// A live tick ran (at most one per `TICK_INTERVAL_MS`).
    pub ticked: bool,
    /// Currency accrued by that tick.
    pub accrued: f64,
    /// Wall-clock milliseconds covered by that tick.
    pub elapsed_ms: f64,
    /// Achievement evaluation is due.
    pub evaluate: bool,
    /// Autosave is due.
    pub autosave: bool,
}

pub struct ProgressionClock {
    tick: Cadence,
    evaluation: Cadence,
    autosave: Cadence,
}

impl ProgressionClock {
    pub fn new(now_ms: f64) -> Self {
        Self {
            tick: Cadence::new(TICK_INTERVAL_MS, now_ms),
            evaluation: Cadence::new(ACHIEVEMENT_CHECK_INTERVAL_MS, now_ms),
            autosave: Cadence::new(AUTOSAVE_INTERVAL_MS, now_ms),
        }
    }

    /// Call once per frame. Runs the live tick when its period has elapsed;
    /// evaluation and autosave are only reported due on a tick.
    pub fn advance(&mut self, state: &mut GameState, now_ms: f64) -> TickReport {
        if !self.tick.poll(now_ms) {
            return TickReport::default();
        }
        let elapsed_ms = (now_ms - state.last_update_ms).max(0.0);
        let accrued = live_tick(state, now_ms);
        TickReport {
            ticked: true,
            accrued,
            elapsed_ms,
            evaluate: self.evaluation.poll(now_ms),
            autosave: self.autosave.poll(now_ms),
        }
    }

    /// Restart the evaluation throttle after an out-of-band evaluation.
    pub fn evaluated(&mut self, now_ms: f64) {
        self.evaluation.reset(now_ms);
    }

    /// Restart the autosave period after an announced save.
    pub fn autosaved(&mut self, now_ms: f64) {
        self.autosave.reset(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn elapsed_seconds_clamps() {
        assert!(approx(elapsed_seconds(1000.0, 3500.0), 2.5));
        assert!(approx(elapsed_seconds(3500.0, 1000.0), 0.0));
        assert!(approx(elapsed_seconds(f64::NAN, 1000.0), 0.0));
    }

    #[test]
    fn live_tick_accrues_and_moves_mark() {
        let mut state = GameState::new(0.0);
        state.economy.passive_income = 2.0;
        let earned = live_tick(&mut state, 1500.0);
        assert!(approx(earned, 3.0));
        assert!(approx(state.economy.currency, 3.0));
        assert!(approx(state.last_update_ms, 1500.0));
    }

    #[test]
    fn live_tick_with_backwards_clock_earns_nothing() {
        let mut state = GameState::new(10_000.0);
        state.economy.passive_income = 2.0;
        assert!(approx(live_tick(&mut state, 4_000.0), 0.0));
        assert!(approx(state.economy.currency, 0.0));
        assert!(approx(state.last_update_ms, 4_000.0));
    }

    #[test]
    fn offline_catch_up_lump_sum() {
        let mut state = GameState::new(1_000_000.0);
        state.economy.passive_income = 7.5;
        // away for one hour
        let earned = offline_catch_up(&mut state, 1_000_000.0 + 3_600_000.0);
        assert!(approx(earned, 27_000.0));
        assert!(approx(state.economy.currency, 27_000.0));
        assert!(approx(state.last_update_ms, 4_600_000.0));
    }

    #[test]
    fn offline_catch_up_future_timestamp_is_ignored() {
        let mut state = GameState::new(5_000.0);
        state.economy.passive_income = 7.5;
        assert!(approx(offline_catch_up(&mut state, 1_000.0), 0.0));
        assert!(approx(state.economy.currency, 0.0));
        assert!(approx(state.last_update_ms, 5_000.0));
    }

    #[test]
    fn advance_ticks_at_100ms() {
        let mut state = GameState::new(0.0);
        state.economy.passive_income = 10.0;
        let mut clock = ProgressionClock::new(0.0);

        assert!(!clock.advance(&mut state, 50.0).ticked);
        let report = clock.advance(&mut state, 100.0);
        assert!(report.ticked);
        assert!(approx(report.accrued, 1.0));
        assert!(approx(report.elapsed_ms, 100.0));
        assert!(!report.evaluate);
        assert!(!report.autosave);
    }

    #[test]
    fn evaluation_throttled_to_once_per_second() {
        let mut state = GameState::new(0.0);
        let mut clock = ProgressionClock::new(0.0);
        let mut evaluations = 0;
        // 5 seconds of 60fps frames
        for frame in 1..=300 {
            let report = clock.advance(&mut state, frame as f64 * 16.667);
            if report.evaluate {
                evaluations += 1;
            }
        }
        assert!((4..=5).contains(&evaluations), "got {} evaluations", evaluations);
    }

    #[test]
    fn autosave_every_30_seconds() {
        let mut state = GameState::new(0.0);
        let mut clock = ProgressionClock::new(0.0);
        let mut saves = 0;
        let mut t = 0.0;
        while t <= 90_000.0 {
            if clock.advance(&mut state, t).autosave {
                saves += 1;
            }
            t += 100.0;
        }
        assert_eq!(saves, 3);
    }

    #[test]
    fn frame_rate_does_not_change_income() {
        let mut fast = GameState::new(0.0);
        let mut slow = GameState::new(0.0);
        fast.economy.passive_income = 3.0;
        slow.economy.passive_income = 3.0;
        let mut fast_clock = ProgressionClock::new(0.0);
        let mut slow_clock = ProgressionClock::new(0.0);
        for frame in 1..=600 {
            fast_clock.advance(&mut fast, frame as f64 * 16.667);
        }
        for frame in 1..=10 {
            slow_clock.advance(&mut slow, frame as f64 * 1000.02);
        }
        // Both cover ~10s; the tick that lands last catches up everything before it.
        assert!((fast.economy.currency - 30.0).abs() < 0.5);
        assert!((slow.economy.currency - 30.0).abs() < 0.5);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_offline_catch_up_is_rate_times_elapsed(
            rate in 0.0f64..1e4,
            t0 in 0.0f64..1e12,
            delta in -1e9f64..1e9,
        ) {
            let mut state = GameState::new(t0);
            state.economy.passive_income = rate;
            let t1 = t0 + delta;
            offline_catch_up(&mut state, t1);
            let expected = if t1 > t0 { rate * (t1 - t0) / 1000.0 } else { 0.0 };
            let tolerance = 1e-6 * expected.max(1.0);
            prop_assert!((state.economy.currency - expected).abs() <= tolerance,
                "expected {}, got {}", expected, state.economy.currency);
        }

        #[test]
        fn prop_live_tick_never_reduces_currency(
            start in 0.0f64..1e6,
            rate in 0.0f64..1e3,
            now in 0.0f64..1e12,
            last in 0.0f64..1e12,
        ) {
            let mut state = GameState::new(last);
            state.economy.currency = start;
            state.economy.passive_income = rate;
            live_tick(&mut state, now);
            prop_assert!(state.economy.currency >= start);
        }
    }
}
