use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike, Utc};

use crate::models::{CognitiveProfile, DayPlan, FlowNode, TaskCategory};

use super::config::PlannerConfig;

/// Lays out a day of focus and rest blocks on `day` for the profile's template.
///
/// Output depends only on the inputs (apart from freshly generated ids), so
/// regenerating for the same profile and day yields the same structure.
pub fn generate_day_plan(
    profile: &CognitiveProfile,
    day: NaiveDate,
    created_at: DateTime<Utc>,
    config: &PlannerConfig,
) -> DayPlan {
    let template = profile.template();
    let params = template.params();
    let focus_secs = params.focus_block.as_secs();
    let break_secs = params.break_duration.as_secs();

    let start = NaiveTime::from_hms_opt(config.start_hour, 0, 0).unwrap_or(NaiveTime::MIN);
    let mut clock = day.and_time(start);
    let mut nodes = Vec::new();
    let mut task_index: usize = 0;
    let mut blocks_since_break: u32 = 0;

    while clock.date() == day && clock.hour() < config.end_hour {
        if blocks_since_break >= params.break_frequency {
            nodes.push(FlowNode::rest(break_secs, clock));
            clock += Duration::seconds(break_secs as i64);
            blocks_since_break = 0;
        } else {
            let category = TaskCategory::ROTATION[task_index % TaskCategory::ROTATION.len()];
            let title = format!("{} Block {}", category.display_name(), task_index + 1);
            nodes.push(FlowNode::task(title, focus_secs, clock, category));
            clock += Duration::seconds(focus_secs as i64);
            blocks_since_break += 1;
            task_index += 1;
        }
    }

    DayPlan::new(template, nodes, created_at)
}
