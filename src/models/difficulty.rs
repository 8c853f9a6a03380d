use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One of the three fixed test presets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

/// Numeric parameters of a preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyConfig {
    /// Probability that a spawned neuron is a signal.
    pub signal_ratio: f64,
    pub spawn_interval: Duration,
    /// Minimum vertical speed in points per motion tick.
    pub neuron_speed: f64,
    pub game_duration: Duration,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn config(self) -> DifficultyConfig {
        match self {
            Difficulty::Easy => DifficultyConfig {
                signal_ratio: 0.85,
                spawn_interval: Duration::from_millis(2000),
                neuron_speed: 4.0,
                game_duration: Duration::from_secs(90),
            },
            Difficulty::Medium => DifficultyConfig {
                signal_ratio: 0.70,
                spawn_interval: Duration::from_millis(1500),
                neuron_speed: 6.0,
                game_duration: Duration::from_secs(60),
            },
            Difficulty::Hard => DifficultyConfig {
                signal_ratio: 0.55,
                spawn_interval: Duration::from_millis(1000),
                neuron_speed: 8.0,
                game_duration: Duration::from_secs(45),
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}
