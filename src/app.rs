use std::collections::HashMap;

use anyhow::{anyhow, Result};
use chrono::{DateTime, TimeZone, Timelike, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    achievements::{Achievement, AchievementContext},
    analysis::{
        analyze_metrics, generate_day_plan, recommendations, update_best_results, weekly_form,
        AnalyzerConfig, CognitiveDataPoint, PlannerConfig,
    },
    game::FinishedSession,
    models::{DayPlan, FlowNode, NodeEdit, TestResult, TimeOfDay},
    reminders::{daily_test_reminders, plan_reminders, Reminder},
    settings::{SettingsStore, UserSettings},
    store::{blob_keys, AppData, KeyValueStore},
};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

/// What a completed session produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOutcome {
    pub result: TestResult,
    pub plan: DayPlan,
    pub unlocked: Vec<Achievement>,
}

/// Application data plus where it is saved. Settings go to the settings
/// file, everything else to the key/value store.
pub struct AppState<S> {
    store: S,
    settings: SettingsStore,
    data: AppData,
    analyzer: AnalyzerConfig,
    planner: PlannerConfig,
}

impl<S: KeyValueStore> AppState<S> {
    pub async fn load(store: S, settings: SettingsStore) -> Result<Self> {
        let mut blobs = HashMap::new();
        for key in blob_keys() {
            if let Some(value) = store.get(key).await? {
                blobs.insert(key.to_string(), value);
            }
        }

        let mut data = AppData::from_blobs(&blobs);
        data.settings = settings.get();
        log_info!(
            "Loaded {} test results and {} day plans",
            data.test_history.len(),
            data.day_plans.len()
        );

        Ok(Self {
            store,
            settings,
            data,
            analyzer: AnalyzerConfig::default(),
            planner: PlannerConfig::default(),
        })
    }

    pub fn data(&self) -> &AppData {
        &self.data
    }

    /// Turns a finished session into a test result and a plan for the local
    /// day of `now`, then saves everything.
    pub async fn complete_session<Tz: TimeZone>(
        &mut self,
        finished: &FinishedSession,
        now: DateTime<Tz>,
    ) -> SessionOutcome {
        let timestamp = now.with_timezone(&Utc);
        let today = now.date_naive();
        let profile = analyze_metrics(&finished.metrics, &self.analyzer);

        let result = TestResult {
            id: Uuid::new_v4(),
            metrics: finished.metrics.clone(),
            profile,
            difficulty: finished.difficulty,
            score: finished.score,
            timestamp,
            time_of_day: TimeOfDay::from_hour(now.hour()),
        };

        let data = &mut self.data;
        data.test_history.push(result.clone());
        data.streak.record(today);
        update_best_results(&mut data.best_results, &data.test_history);

        let morning_count = count_time_of_day(&data.test_history, TimeOfDay::Morning);
        let evening_count = count_time_of_day(&data.test_history, TimeOfDay::Evening);
        let unlocked = data.achievements.check(
            &AchievementContext {
                metrics: &result.metrics,
                difficulty: result.difficulty,
                test_count: data.test_history.len(),
                streak: data.streak.current_streak,
                morning_count,
                evening_count,
            },
            timestamp,
        );

        let plan = generate_day_plan(&profile, today, timestamp, &self.planner);
        data.day_plans.push(plan.clone());
        data.current_plan = Some(plan.clone());

        log_info!(
            "Session {} completed: template {:?}, {} nodes, {} achievements unlocked",
            finished.session_id,
            plan.template,
            plan.nodes.len(),
            unlocked.len()
        );

        self.save().await;

        SessionOutcome {
            result,
            plan,
            unlocked,
        }
    }

    /// Edits a node of the current plan and mirrors the change into the
    /// stored plan list.
    pub async fn edit_current_plan(&mut self, node_id: Uuid, edit: NodeEdit) -> Result<FlowNode> {
        let plan = self
            .data
            .current_plan
            .as_mut()
            .ok_or_else(|| anyhow!("no current day plan to edit"))?;
        let node = plan.edit_node(node_id, edit)?.clone();

        let plan_id = plan.id;
        let updated = plan.clone();
        if let Some(stored) = self.data.day_plans.iter_mut().find(|p| p.id == plan_id) {
            *stored = updated;
        }

        self.save().await;
        Ok(node)
    }

    /// Writes through to the settings file; the in-memory copy only changes
    /// once the file is written.
    pub fn update_settings(&mut self, settings: UserSettings) -> Result<()> {
        self.settings.update(settings.clone())?;
        self.data.settings = settings;
        Ok(())
    }

    pub fn weekly_form<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Vec<CognitiveDataPoint> {
        weekly_form(&self.data.test_history, now)
    }

    pub fn recommendations(&self) -> Vec<String> {
        recommendations(&self.data.test_history)
    }

    /// Reminders a notification collaborator should schedule, empty when
    /// notifications are switched off.
    pub fn reminders(&self) -> Vec<Reminder> {
        if !self.data.settings.notifications_enabled {
            return Vec::new();
        }

        let mut reminders = daily_test_reminders();
        if let Some(plan) = &self.data.current_plan {
            reminders.extend(plan_reminders(plan));
        }
        reminders
    }

    /// Best-effort write of every blob; failures are logged and in-memory
    /// data is left as is.
    pub async fn save(&self) {
        let blobs = match self.data.to_blobs() {
            Ok(blobs) => blobs,
            Err(err) => {
                log_error!("Failed to encode app data: {err:#}");
                return;
            }
        };

        for (key, value) in blobs {
            if let Err(err) = self.store.put(key, value).await {
                log_error!("Failed to save '{key}': {err:#}");
            }
        }
    }
}

fn count_time_of_day(history: &[TestResult], time_of_day: TimeOfDay) -> usize {
    history
        .iter()
        .filter(|result| result.time_of_day == time_of_day)
        .count()
}
