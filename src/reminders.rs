use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::{DayPlan, NodeKind};

/// When a reminder fires.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ReminderTrigger {
    At { at: NaiveDateTime },
    Daily { time: NaiveTime },
}

/// A notification request handed to the platform scheduler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub identifier: String,
    pub title: String,
    pub body: String,
    pub trigger: ReminderTrigger,
}

/// One reminder per plan node, at the node's start.
pub fn plan_reminders(plan: &DayPlan) -> Vec<Reminder> {
    plan.nodes
        .iter()
        .map(|node| {
            let (title, body) = match node.kind {
                NodeKind::Task => (
                    "Focus Block Starting".to_string(),
                    format!("Time to focus on: {}", node.title),
                ),
                NodeKind::Rest => (
                    "Break Time".to_string(),
                    "Time to take a break and recharge".to_string(),
                ),
            };
            Reminder {
                identifier: node.id.to_string(),
                title,
                body,
                trigger: ReminderTrigger::At {
                    at: node.start_time,
                },
            }
        })
        .collect()
}

/// Repeating morning and evening prompts to take the test.
pub fn daily_test_reminders() -> Vec<Reminder> {
    [("morningTest", 8), ("eveningTest", 20)]
        .into_iter()
        .filter_map(|(identifier, hour)| {
            Some(Reminder {
                identifier: identifier.to_string(),
                title: "Synapse Flow".to_string(),
                body: "Time for your daily cognitive test!".to_string(),
                trigger: ReminderTrigger::Daily {
                    time: NaiveTime::from_hms_opt(hour, 0, 0)?,
                },
            })
        })
        .collect()
}
