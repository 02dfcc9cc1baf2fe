//! Elapsed recording time

use std::fmt;

/// Whole seconds elapsed in the current session.
///
/// Advances only while recording and is reset to zero when a session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct RecordingTimer {
    elapsed_secs: u64,
}

impl RecordingTimer {
    pub const fn new() -> Self {
        Self { elapsed_secs: 0 }
    }

    /// Advance by one second and return the new count
    pub fn tick(&mut self) -> u64 {
        self.elapsed_secs = self.elapsed_secs.saturating_add(1);
        self.elapsed_secs
    }

    pub fn reset(&mut self) {
        self.elapsed_secs = 0;
    }

    pub const fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }
}

impl fmt::Display for RecordingTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_clock(self.elapsed_secs))
    }
}

/// Format seconds as `MM:SS`
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        assert_eq!(RecordingTimer::new().elapsed_secs(), 0);
    }

    #[test]
    fn tick_and_reset() {
        let mut timer = RecordingTimer::new();
        assert_eq!(timer.tick(), 1);
        assert_eq!(timer.tick(), 2);
        assert_eq!(timer.elapsed_secs(), 2);

        timer.reset();
        assert_eq!(timer.elapsed_secs(), 0);
    }

    #[test]
    fn format_clock_pads() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(5), "00:05");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(600), "10:00");
    }

    #[test]
    fn format_clock_past_hundred_minutes() {
        assert_eq!(format_clock(100 * 60 + 1), "100:01");
    }

    #[test]
    fn display_uses_clock() {
        let mut timer = RecordingTimer::new();
        for _ in 0..75 {
            timer.tick();
        }
        assert_eq!(timer.to_string(), "01:15");
    }
}
