use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Normalized view of one session's performance; every field is in `[0, 1]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CognitiveProfile {
    pub speed: f64,
    pub accuracy: f64,
    /// Higher means the second half of the session was slower.
    pub fatigue: f64,
    /// Higher means more consistent reaction times.
    pub attention_pattern: f64,
}

impl CognitiveProfile {
    /// Branches are evaluated in order; the bands overlap and `Balanced` catches the rest.
    pub fn template(&self) -> DayTemplate {
        if self.speed > 0.8 && self.accuracy > 0.7 {
            DayTemplate::PeakPerformance
        } else if self.speed < 0.4 || self.accuracy < 0.5 {
            DayTemplate::Recovery
        } else {
            DayTemplate::Balanced
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum DayTemplate {
    Recovery,
    Balanced,
    PeakPerformance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateParams {
    pub focus_block: Duration,
    pub break_duration: Duration,
    /// Task blocks between two breaks.
    pub break_frequency: u32,
}

impl DayTemplate {
    pub fn params(self) -> TemplateParams {
        match self {
            DayTemplate::Recovery => TemplateParams {
                focus_block: Duration::from_secs(15 * 60),
                break_duration: Duration::from_secs(10 * 60),
                break_frequency: 2,
            },
            DayTemplate::Balanced => TemplateParams {
                focus_block: Duration::from_secs(30 * 60),
                break_duration: Duration::from_secs(5 * 60),
                break_frequency: 3,
            },
            DayTemplate::PeakPerformance => TemplateParams {
                focus_block: Duration::from_secs(45 * 60),
                break_duration: Duration::from_secs(3 * 60),
                break_frequency: 4,
            },
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DayTemplate::Recovery => "Recovery Mode",
            DayTemplate::Balanced => "Balanced",
            DayTemplate::PeakPerformance => "Peak Performance",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(speed: f64, accuracy: f64) -> CognitiveProfile {
        CognitiveProfile {
            speed,
            accuracy,
            fatigue: 0.5,
            attention_pattern: 0.5,
        }
    }

    #[test]
    fn speed_just_below_peak_is_balanced() {
        assert_eq!(profile(0.775, 0.8).template(), DayTemplate::Balanced);
    }

    #[test]
    fn fast_and_accurate_is_peak() {
        assert_eq!(profile(0.81, 0.71).template(), DayTemplate::PeakPerformance);
    }

    #[test]
    fn slow_or_sloppy_is_recovery() {
        assert_eq!(profile(0.39, 0.9).template(), DayTemplate::Recovery);
        assert_eq!(profile(0.9, 0.49).template(), DayTemplate::Recovery);
    }

    #[test]
    fn gap_between_bands_falls_to_balanced() {
        assert_eq!(profile(0.9, 0.6).template(), DayTemplate::Balanced);
        assert_eq!(profile(0.4, 0.5).template(), DayTemplate::Balanced);
    }

    #[test]
    fn recovery_breaks_most_often() {
        let recovery = DayTemplate::Recovery.params();
        assert_eq!(recovery.focus_block, Duration::from_secs(900));
        assert_eq!(recovery.break_duration, Duration::from_secs(600));
        assert_eq!(recovery.break_frequency, 2);
        assert!(DayTemplate::PeakPerformance.params().break_frequency > recovery.break_frequency);
    }
}
