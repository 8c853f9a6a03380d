pub mod difficulty;
pub mod neuron;
pub mod plan;
pub mod profile;
pub mod result;

pub use difficulty::{Difficulty, DifficultyConfig};
pub use neuron::{Neuron, NeuronKind, Point, Viewport};
pub use plan::{DayPlan, FlowNode, NodeEdit, NodeKind, TaskCategory};
pub use profile::{CognitiveProfile, DayTemplate, TemplateParams};
pub use result::{Streak, TestResult, TimeOfDay};
