pub mod config;
pub mod insights;
pub mod planner;
pub mod profile;

pub use config::{AnalyzerConfig, PlannerConfig};
pub use insights::{recommendations, update_best_results, weekly_form, CognitiveDataPoint};
pub use planner::generate_day_plan;
pub use profile::analyze_metrics;
