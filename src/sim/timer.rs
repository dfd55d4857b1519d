//! Owned countdown timers
//!
//! Deferred effects are plain countdowns held by the component that started
//! them, usually as `Option<Timer>`. Cancelling is dropping the handle, so a
//! destroyed entity can never be called back.

use serde::{Deserialize, Serialize};

/// A one-shot or repeating countdown in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    remaining: f32,
    duration: f32,
    repeating: bool,
}

impl Timer {
    pub fn once(duration: f32) -> Self {
        Self {
            remaining: duration,
            duration,
            repeating: false,
        }
    }

    pub fn repeating(interval: f32) -> Self {
        Self {
            remaining: interval,
            duration: interval,
            repeating: true,
        }
    }

    /// Advance by `dt` seconds and return how many times the timer fired
    ///
    /// A one-shot timer fires at most once and then stays finished.
    pub fn tick(&mut self, dt: f32) -> u32 {
        if self.is_finished() {
            return 0;
        }
        self.remaining -= dt;
        if self.remaining > 0.0 {
            return 0;
        }
        if !self.repeating || self.duration <= 0.0 {
            self.remaining = 0.0;
            return 1;
        }
        let mut fired = 0;
        while self.remaining <= 0.0 {
            self.remaining += self.duration;
            fired += 1;
        }
        fired
    }

    pub fn is_finished(&self) -> bool {
        !self.repeating && self.remaining <= 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining.max(0.0)
    }

    /// Fraction of the current period already elapsed (0..=1)
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (1.0 - self.remaining / self.duration).clamp(0.0, 1.0)
        }
    }
}

/// Tick an optional one-shot timer; returns true (and clears it) when it fires
pub fn tick_once(slot: &mut Option<Timer>, dt: f32) -> bool {
    let fired = slot.as_mut().is_some_and(|timer| timer.tick(dt) > 0);
    if fired {
        *slot = None;
    }
    fired
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_once_fires_a_single_time() {
        let mut timer = Timer::once(1.0);
        assert_eq!(timer.tick(0.5), 0);
        assert_eq!(timer.tick(0.6), 1);
        assert!(timer.is_finished());
        assert_eq!(timer.tick(5.0), 0);
    }

    #[test]
    fn test_repeating_catches_up() {
        let mut timer = Timer::repeating(1.0);
        assert_eq!(timer.tick(2.5), 2);
        assert!((timer.remaining() - 0.5).abs() < 1e-5);
        assert!(!timer.is_finished());
    }

    #[test]
    fn test_tick_once_clears_slot() {
        let mut slot = Some(Timer::once(0.1));
        assert!(!tick_once(&mut slot, 0.05));
        assert!(slot.is_some());
        assert!(tick_once(&mut slot, 0.05));
        assert!(slot.is_none());
        assert!(!tick_once(&mut slot, 1.0));
    }
}
