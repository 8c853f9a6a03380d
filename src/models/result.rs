use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metrics::SessionMetrics;

use super::{difficulty::Difficulty, profile::CognitiveProfile};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimeOfDay {
    Morning,
    Evening,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        if hour < 12 {
            TimeOfDay::Morning
        } else {
            TimeOfDay::Evening
        }
    }
}

/// Persisted record of one completed session. History is append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub id: Uuid,
    pub metrics: SessionMetrics,
    pub profile: CognitiveProfile,
    pub difficulty: Difficulty,
    pub score: u32,
    pub timestamp: DateTime<Utc>,
    pub time_of_day: TimeOfDay,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_test_date: Option<NaiveDate>,
}

impl Streak {
    /// Registers a completed test on `today`.
    pub fn record(&mut self, today: NaiveDate) {
        match self.last_test_date {
            Some(last) => {
                let days_since = (today - last).num_days();
                if days_since == 1 {
                    self.current_streak += 1;
                } else if days_since > 1 {
                    self.current_streak = 1;
                }
            }
            None => self.current_streak = 1,
        }

        self.last_test_date = Some(today);
        self.longest_streak = self.longest_streak.max(self.current_streak);
    }
}
