use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::DayTemplate;

const TASK_WEIGHT: f64 = 0.6;
const CONNECTIVITY_WEIGHT: f64 = 0.4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum TaskCategory {
    Work,
    Study,
    Creative,
    Exercise,
    Rest,
    Other,
}

impl TaskCategory {
    /// Categories the generator rotates through, in order.
    pub const ROTATION: [TaskCategory; 4] = [
        TaskCategory::Work,
        TaskCategory::Study,
        TaskCategory::Creative,
        TaskCategory::Exercise,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            TaskCategory::Work => "Work",
            TaskCategory::Study => "Study",
            TaskCategory::Creative => "Creative",
            TaskCategory::Exercise => "Exercise",
            TaskCategory::Rest => "Rest",
            TaskCategory::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Task,
    Rest,
}

/// One scheduled block of a day plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlowNode {
    pub id: Uuid,
    pub kind: NodeKind,
    pub title: String,
    pub duration_secs: u64,
    /// Local wall-clock start.
    pub start_time: NaiveDateTime,
    pub category: Option<TaskCategory>,
    pub connections: Vec<Uuid>,
}

impl FlowNode {
    pub fn task(
        title: String,
        duration_secs: u64,
        start_time: NaiveDateTime,
        category: TaskCategory,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: NodeKind::Task,
            title,
            duration_secs,
            start_time,
            category: Some(category),
            connections: Vec::new(),
        }
    }

    pub fn rest(duration_secs: u64, start_time: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: NodeKind::Rest,
            title: "Break".into(),
            duration_secs,
            start_time,
            category: None,
            connections: Vec::new(),
        }
    }

    pub fn is_task(&self) -> bool {
        self.kind == NodeKind::Task
    }
}

/// Partial update of a node; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeEdit {
    pub title: Option<String>,
    pub duration_secs: Option<u64>,
    pub category: Option<TaskCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    pub id: Uuid,
    pub nodes: Vec<FlowNode>,
    pub created_at: DateTime<Utc>,
    pub template: DayTemplate,
    /// Efficiency score in `[0, 100]`, kept in sync with `nodes`.
    pub conductivity: f64,
}

impl DayPlan {
    pub fn new(template: DayTemplate, nodes: Vec<FlowNode>, created_at: DateTime<Utc>) -> Self {
        let mut plan = Self {
            id: Uuid::new_v4(),
            nodes,
            created_at,
            template,
            conductivity: 0.0,
        };
        plan.relink();
        plan
    }

    /// Rebuilds the forward chain `node[i] -> node[i + 1]` and refreshes conductivity.
    pub fn relink(&mut self) {
        let ids: Vec<Uuid> = self.nodes.iter().map(|node| node.id).collect();
        for (index, node) in self.nodes.iter_mut().enumerate() {
            node.connections.clear();
            if let Some(next) = ids.get(index + 1) {
                node.connections.push(*next);
            }
        }
        self.recalculate_conductivity();
    }

    pub fn recalculate_conductivity(&mut self) {
        self.conductivity = conductivity(&self.nodes);
    }

    pub fn node(&self, node_id: Uuid) -> Option<&FlowNode> {
        self.nodes.iter().find(|node| node.id == node_id)
    }

    pub fn edit_node(&mut self, node_id: Uuid, edit: NodeEdit) -> Result<&FlowNode> {
        let index = self
            .nodes
            .iter()
            .position(|node| node.id == node_id)
            .ok_or_else(|| anyhow!("node {node_id} not found in plan {}", self.id))?;

        {
            let node = &mut self.nodes[index];
            if let Some(title) = edit.title {
                node.title = title;
            }
            if let Some(duration_secs) = edit.duration_secs {
                node.duration_secs = duration_secs;
            }
            if edit.category.is_some() {
                node.category = edit.category;
            }
        }

        self.recalculate_conductivity();
        Ok(&self.nodes[index])
    }

    pub fn task_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_task()).count()
    }
}

/// `(task_ratio * 0.6 + connectivity * 0.4) * 100` where connectivity is the
/// mean connection count halved. An empty plan scores 0.
pub fn conductivity(nodes: &[FlowNode]) -> f64 {
    if nodes.is_empty() {
        return 0.0;
    }

    let total = nodes.len() as f64;
    let tasks = nodes.iter().filter(|node| node.is_task()).count() as f64;
    let connections: usize = nodes.iter().map(|node| node.connections.len()).sum();

    let task_ratio = tasks / total;
    let connectivity = connections as f64 / (total * 2.0);

    ((task_ratio * TASK_WEIGHT + connectivity * CONNECTIVITY_WEIGHT) * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .expect("valid time")
    }

    fn four_tasks() -> DayPlan {
        let nodes = (0..4)
            .map(|i| {
                let title = format!("Work Block {}", i + 1);
                FlowNode::task(title, 1800, at(8 + i, 0), TaskCategory::Work)
            })
            .collect();
        DayPlan::new(DayTemplate::Balanced, nodes, Utc::now())
    }

    #[test]
    fn four_chained_tasks_score_75() {
        let plan = four_tasks();
        assert!((plan.conductivity - 75.0).abs() < 1e-9);
    }

    #[test]
    fn chain_links_each_node_to_the_next() {
        let plan = four_tasks();
        for pair in plan.nodes.windows(2) {
            assert_eq!(pair[0].connections, vec![pair[1].id]);
        }
        assert!(plan.nodes.last().map(|n| n.connections.is_empty()).unwrap_or(false));
    }

    #[test]
    fn empty_plan_has_zero_conductivity() {
        let plan = DayPlan::new(DayTemplate::Recovery, Vec::new(), Utc::now());
        assert_eq!(plan.conductivity, 0.0);
    }

    #[test]
    fn rest_nodes_lower_conductivity() {
        let mut plan = four_tasks();
        plan.nodes.push(FlowNode::rest(300, at(12, 0)));
        plan.relink();
        // 4/5 tasks, 4 connections over 10
        let expected = (0.8 * 0.6 + 0.4 * 0.4) * 100.0;
        assert!((plan.conductivity - expected).abs() < 1e-9);
    }

    #[test]
    fn edit_updates_node_and_recomputes() {
        let mut plan = four_tasks();
        let target = plan.nodes[1].id;
        plan.nodes[3].connections.push(target);
        let edited = plan
            .edit_node(
                target,
                NodeEdit {
                    title: Some("Deep Work".into()),
                    duration_secs: Some(2700),
                    category: Some(TaskCategory::Creative),
                },
            )
            .expect("node exists");
        assert_eq!(edited.title, "Deep Work");
        assert_eq!(edited.duration_secs, 2700);
        assert_eq!(edited.category, Some(TaskCategory::Creative));
        // 4 tasks, 4 connections over 8
        assert!((plan.conductivity - 80.0).abs() < 1e-9);
    }

    #[test]
    fn editing_unknown_node_fails() {
        let mut plan = four_tasks();
        assert!(plan.edit_node(Uuid::new_v4(), NodeEdit::default()).is_err());
    }
}
