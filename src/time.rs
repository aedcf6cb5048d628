//! Wall-clock source and fixed-period gates.
//!
//! `draw_web()` calls at ~60fps with variable delta. The game only needs to
//! act at a few fixed periods (100ms ticks, 1s achievement checks, 30s
//! autosave), so each of those is a [`Cadence`] polled with the current
//! wall-clock time. Keeping the clock outside the game logic makes every
//! period deterministic and testable with synthetic timestamps.

/// Milliseconds since the Unix epoch.
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Milliseconds since the Unix epoch.
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// A gate that opens at most once per `period_ms` of wall-clock time.
#[derive(Clone, Debug)]
pub struct Cadence {
    period_ms: f64,
    /// Timestamp of the last time the gate opened (or was reset).
    last_ms: f64,
}

impl Cadence {
    /// Create a gate whose first opening is one full period after `start_ms`.
    pub fn new(period_ms: f64, start_ms: f64) -> Self {
        Self {
            period_ms,
            last_ms: start_ms,
        }
    }

    /// Returns true (and restarts the period) if at least one period has
    /// elapsed since the gate last opened.
    ///
    /// Missed periods are not queued: a 10 second stall opens the gate once.
    /// If the clock jumps backwards the period restarts from `now_ms`.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        if now_ms < self.last_ms {
            self.last_ms = now_ms;
            return false;
        }
        if now_ms - self.last_ms >= self.period_ms {
            self.last_ms = now_ms;
            true
        } else {
            false
        }
    }

    /// Restart the period at `now_ms` without opening the gate.
    pub fn reset(&mut self, now_ms: f64) {
        self.last_ms = now_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_before_first_period() {
        let mut c = Cadence::new(100.0, 0.0);
        assert!(!c.poll(0.0));
        assert!(!c.poll(99.0));
    }

    #[test]
    fn opens_at_period() {
        let mut c = Cadence::new(100.0, 0.0);
        assert!(c.poll(100.0));
        // Restarted: next opening is at 200
        assert!(!c.poll(150.0));
        assert!(c.poll(200.0));
    }

    #[test]
    fn long_stall_opens_once() {
        let mut c = Cadence::new(100.0, 0.0);
        assert!(c.poll(10_000.0));
        assert!(!c.poll(10_050.0));
    }

    #[test]
    fn sub_period_frames_accumulate() {
        let mut c = Cadence::new(100.0, 0.0);
        let mut opened = 0;
        for frame in 1..=60 {
            if c.poll(frame as f64 * 16.667) {
                opened += 1;
            }
        }
        // ~1 second of 60fps frames at a 100ms period
        assert!((9..=10).contains(&opened), "expected ~10 openings, got {}", opened);
    }

    #[test]
    fn backwards_clock_restarts_period() {
        let mut c = Cadence::new(1000.0, 5000.0);
        assert!(!c.poll(1000.0)); // clock moved back 4s
        assert!(!c.poll(1500.0));
        assert!(c.poll(2000.0));
    }

    #[test]
    fn reset_delays_next_opening() {
        let mut c = Cadence::new(1000.0, 0.0);
        c.reset(900.0);
        assert!(!c.poll(1000.0));
        assert!(c.poll(1900.0));
    }

    #[test]
    fn now_ms_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(now_ms() > 1_577_836_800_000.0);
    }
}
