use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::NeuronKind;

/// Points added for tapping a signal.
pub const SIGNAL_REWARD: u32 = 10;
/// Points removed for tapping noise.
pub const NOISE_PENALTY: u32 = 5;

/// Reaction times outside `(0, MAX_REACTION_SECS)` are discarded.
pub const MAX_REACTION_SECS: f64 = 5.0;

/// Counters accumulated while a session runs. Frozen once the session finishes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetrics {
    /// Seconds, in tap order.
    pub reaction_times: Vec<f64>,
    pub correct_taps: u32,
    pub incorrect_taps: u32,
    pub total_signals: u32,
    pub total_noise: u32,
    pub error_count: u32,
    pub spawn_timestamps: Vec<DateTime<Utc>>,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_spawn(&mut self, kind: NeuronKind, at: DateTime<Utc>) {
        match kind {
            NeuronKind::Signal => self.total_signals += 1,
            NeuronKind::Noise => self.total_noise += 1,
        }
        self.spawn_timestamps.push(at);
    }

    /// Counts a correct tap and returns the reaction time if it was recorded.
    ///
    /// Reaction time is measured from the most recent spawn of any kind, not
    /// from the spawn of the tapped neuron.
    pub fn record_signal_hit(&mut self, tapped_at: DateTime<Utc>) -> Option<f64> {
        self.correct_taps += 1;

        let last_spawn = self.spawn_timestamps.last()?;
        let reaction = (tapped_at - *last_spawn).num_microseconds()? as f64 / 1_000_000.0;
        if reaction > 0.0 && reaction < MAX_REACTION_SECS {
            self.reaction_times.push(reaction);
            Some(reaction)
        } else {
            None
        }
    }

    pub fn record_noise_hit(&mut self) {
        self.incorrect_taps += 1;
        self.error_count += 1;
    }

    pub fn average_reaction_time(&self) -> f64 {
        mean(&self.reaction_times).unwrap_or(0.0)
    }

    /// Fraction of spawned signals that were tapped, `0` when none spawned.
    pub fn accuracy(&self) -> f64 {
        if self.total_signals == 0 {
            return 0.0;
        }
        self.correct_taps as f64 / self.total_signals as f64
    }

    pub fn accuracy_percentage(&self) -> f64 {
        self.accuracy() * 100.0
    }

    pub fn error_rate(&self) -> f64 {
        let total = self.correct_taps + self.incorrect_taps;
        if total == 0 {
            return 0.0;
        }
        self.incorrect_taps as f64 / total as f64 * 100.0
    }

    /// Score reconstructed from tap counts; ignores the floor applied during play.
    pub fn estimated_score(&self) -> i64 {
        let rewards = i64::from(self.correct_taps) * i64::from(SIGNAL_REWARD);
        let penalties = i64::from(self.incorrect_taps) * i64::from(NOISE_PENALTY);
        rewards - penalties
    }
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
