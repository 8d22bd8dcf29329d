//! Possession clock. Owns the shot clock and the quarter clock.
//!
//! RULE: both clocks only count down and saturate at zero. Nothing
//! outside this file subtracts from them directly.

use crate::types::Seconds;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PossessionClock {
    pub shot_clock:   Seconds,
    pub quarter_time: Seconds,
    /// Quarter time actually consumed by this possession.
    pub elapsed:      Seconds,
}

impl PossessionClock {
    pub fn new(shot_clock: Seconds, quarter_time: Seconds) -> Self {
        Self {
            shot_clock:   shot_clock.max(0.0),
            quarter_time: quarter_time.max(0.0),
            elapsed:      0.0,
        }
    }

    /// Run both clocks down by `seconds`. Returns the quarter time
    /// actually consumed, which is less than `seconds` at the buzzer.
    pub fn advance(&mut self, seconds: Seconds) -> Seconds {
        let seconds = seconds.max(0.0);
        let consumed = seconds.min(self.quarter_time);
        self.shot_clock = (self.shot_clock - seconds).max(0.0);
        self.quarter_time = (self.quarter_time - seconds).max(0.0);
        self.elapsed += consumed;
        consumed
    }

    /// Raise the shot clock to at least `floor`. Never lowers it.
    pub fn reset_shot_clock_to_at_least(&mut self, floor: Seconds) {
        if self.shot_clock < floor {
            self.shot_clock = floor;
        }
    }

    pub fn shot_clock_expired(&self) -> bool {
        self.shot_clock <= 0.0
    }

    pub fn quarter_expired(&self) -> bool {
        self.quarter_time <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_saturates_at_zero() {
        let mut clock = PossessionClock::new(24.0, 2.0);
        let consumed = clock.advance(5.0);
        assert_eq!(consumed, 2.0);
        assert_eq!(clock.shot_clock, 19.0);
        assert_eq!(clock.quarter_time, 0.0);
        assert!(clock.quarter_expired());
        assert_eq!(clock.elapsed, 2.0);
    }

    #[test]
    fn reset_only_raises() {
        let mut clock = PossessionClock::new(5.0, 600.0);
        clock.reset_shot_clock_to_at_least(14.0);
        assert_eq!(clock.shot_clock, 14.0);

        let mut clock = PossessionClock::new(20.0, 600.0);
        clock.reset_shot_clock_to_at_least(14.0);
        assert_eq!(clock.shot_clock, 20.0);
    }
}
