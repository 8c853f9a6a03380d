use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    achievements::AchievementBook,
    models::{DayPlan, Streak, TestResult},
    settings::UserSettings,
};

const ENABLE_LOGS: bool = true;

use crate::log_warn;

const TEST_HISTORY_KEY: &str = "testHistory";
const DAY_PLANS_KEY: &str = "dayPlans";
const CURRENT_PLAN_KEY: &str = "currentDayPlan";
const STREAK_KEY: &str = "streak";
const BEST_RESULTS_KEY: &str = "bestResults";
const ACHIEVEMENTS_KEY: &str = "achievements";

/// Every key `AppData` reads and writes.
pub fn blob_keys() -> [&'static str; 6] {
    [
        TEST_HISTORY_KEY,
        DAY_PLANS_KEY,
        CURRENT_PLAN_KEY,
        STREAK_KEY,
        BEST_RESULTS_KEY,
        ACHIEVEMENTS_KEY,
    ]
}

/// Everything the application keeps between launches.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    pub test_history: Vec<TestResult>,
    pub day_plans: Vec<DayPlan>,
    pub current_plan: Option<DayPlan>,
    pub streak: Streak,
    /// Mirror of the settings file; never written as a blob.
    pub settings: UserSettings,
    pub best_results: Vec<TestResult>,
    pub achievements: AchievementBook,
}

impl AppData {
    /// Serializes each field into its own JSON blob.
    pub fn to_blobs(&self) -> Result<Vec<(&'static str, String)>> {
        Ok(vec![
            (TEST_HISTORY_KEY, encode(TEST_HISTORY_KEY, &self.test_history)?),
            (DAY_PLANS_KEY, encode(DAY_PLANS_KEY, &self.day_plans)?),
            (CURRENT_PLAN_KEY, encode(CURRENT_PLAN_KEY, &self.current_plan)?),
            (STREAK_KEY, encode(STREAK_KEY, &self.streak)?),
            (BEST_RESULTS_KEY, encode(BEST_RESULTS_KEY, &self.best_results)?),
            (ACHIEVEMENTS_KEY, encode(ACHIEVEMENTS_KEY, &self.achievements)?),
        ])
    }

    /// Rebuilds the data from stored blobs. Missing or undecodable blobs
    /// leave the corresponding field at its default, as do the settings.
    pub fn from_blobs(blobs: &HashMap<String, String>) -> Self {
        Self {
            test_history: decode(blobs, TEST_HISTORY_KEY),
            day_plans: decode(blobs, DAY_PLANS_KEY),
            current_plan: decode(blobs, CURRENT_PLAN_KEY),
            streak: decode(blobs, STREAK_KEY),
            settings: UserSettings::default(),
            best_results: decode(blobs, BEST_RESULTS_KEY),
            achievements: decode(blobs, ACHIEVEMENTS_KEY),
        }
    }
}

fn encode<T: Serialize>(key: &str, value: &T) -> Result<String> {
    serde_json::to_string(value).with_context(|| format!("failed to encode {key}"))
}

fn decode<T: DeserializeOwned + Default>(blobs: &HashMap<String, String>, key: &str) -> T {
    let Some(raw) = blobs.get(key) else {
        return T::default();
    };

    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            log_warn!("Discarding unreadable '{key}' blob: {err}");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayTemplate, Difficulty};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn sample() -> AppData {
        let mut data = AppData::default();
        data.streak.record(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        let created_at = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
        data.current_plan = Some(DayPlan::new(DayTemplate::Balanced, Vec::new(), created_at));
        data
    }

    fn as_map(blobs: Vec<(&'static str, String)>) -> HashMap<String, String> {
        blobs
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    }

    #[test]
    fn blobs_cover_every_key() {
        let blobs = sample().to_blobs().expect("encode");
        let keys: Vec<_> = blobs.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, blob_keys().to_vec());
    }

    #[test]
    fn decoding_restores_encoded_data() {
        let data = sample();
        let restored = AppData::from_blobs(&as_map(data.to_blobs().expect("encode")));
        assert_eq!(restored, data);
    }

    #[test]
    fn empty_store_gives_defaults() {
        assert_eq!(AppData::from_blobs(&HashMap::new()), AppData::default());
    }

    #[test]
    fn corrupt_blob_only_resets_its_own_field() {
        let data = sample();
        let mut blobs = as_map(data.to_blobs().expect("encode"));
        blobs.insert(STREAK_KEY.to_string(), "not json".to_string());

        let restored = AppData::from_blobs(&blobs);
        assert_eq!(restored.streak, Streak::default());
        assert_eq!(restored.current_plan, data.current_plan);
    }

    #[test]
    fn settings_stay_out_of_the_blobs() {
        let mut data = sample();
        data.settings.difficulty = Difficulty::Hard;

        let blobs = as_map(data.to_blobs().expect("encode"));
        assert!(!blobs.contains_key("settings"));
        assert_eq!(AppData::from_blobs(&blobs).settings, UserSettings::default());
    }
}
