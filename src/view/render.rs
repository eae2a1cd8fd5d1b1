//! Display model computed from the timer state

use serde::Serialize;

/// How much of the progress ring has been swept away
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Progress {
    /// Nothing elapsed yet, the ring is fully drawn
    Untouched,
    /// Partially elapsed; the first `degrees` of the ring are cleared
    Sweep { degrees: f64 },
    /// Countdown reached zero, the ring is gone
    Cleared,
}

/// Everything a surface needs to draw the timer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Display {
    pub readout: String,
    pub progress: Progress,
    pub cycle_badge: Option<String>,
}

impl Display {
    /// Render the timer; pure in its three inputs
    pub fn render(time_left: u32, total_duration: u32, completed_cycles: u64) -> Self {
        Self {
            readout: readout(time_left),
            progress: progress(time_left, total_duration),
            cycle_badge: cycle_badge(completed_cycles),
        }
    }
}

/// `M:SS` digital readout
pub fn readout(time_left: u32) -> String {
    format!("{}:{:02}", time_left / 60, time_left % 60)
}

pub fn progress(time_left: u32, total_duration: u32) -> Progress {
    if time_left == total_duration {
        Progress::Untouched
    } else if time_left == 0 {
        Progress::Cleared
    } else {
        let elapsed = f64::from(total_duration.saturating_sub(time_left));
        Progress::Sweep {
            degrees: elapsed / f64::from(total_duration) * 360.0,
        }
    }
}

pub fn cycle_badge(completed_cycles: u64) -> Option<String> {
    (completed_cycles > 0).then(|| format!("🔄 {}", completed_cycles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TOTAL_DURATION;

    #[test]
    fn readout_matches_minutes_and_padded_seconds() {
        for t in 0..=TOTAL_DURATION {
            let expected = format!("{}:{:02}", t / 60, t % 60);
            assert_eq!(readout(t), expected);
        }
        assert_eq!(readout(120), "2:00");
        assert_eq!(readout(65), "1:05");
        assert_eq!(readout(9), "0:09");
    }

    #[test]
    fn progress_special_cases_the_ends() {
        assert_eq!(progress(120, 120), Progress::Untouched);
        assert_eq!(progress(0, 120), Progress::Cleared);
    }

    #[test]
    fn progress_sweeps_with_elapsed_fraction() {
        assert_eq!(progress(60, 120), Progress::Sweep { degrees: 180.0 });
        assert_eq!(progress(90, 120), Progress::Sweep { degrees: 90.0 });
        match progress(1, 120) {
            Progress::Sweep { degrees } => assert!((degrees - 357.0).abs() < 1e-9),
            other => panic!("unexpected progress: {:?}", other),
        }
    }

    #[test]
    fn badge_hidden_until_first_cycle() {
        assert_eq!(cycle_badge(0), None);
        assert_eq!(cycle_badge(3).as_deref(), Some("🔄 3"));
    }

    #[test]
    fn display_combines_all_parts() {
        let display = Display::render(75, TOTAL_DURATION, 2);
        assert_eq!(display.readout, "1:15");
        assert_eq!(display.progress, Progress::Sweep { degrees: 135.0 });
        assert_eq!(display.cycle_badge.as_deref(), Some("🔄 2"));
    }
}
