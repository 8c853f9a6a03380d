/// Tunables for turning session metrics into a profile.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Average reaction time mapped to speed 0.
    pub slowest_reaction_secs: f64,
    /// Floor for the first-half average when computing the fatigue ratio.
    pub min_fatigue_baseline_secs: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            slowest_reaction_secs: 2.0,
            min_fatigue_baseline_secs: 0.1,
        }
    }
}

/// Tunables for the day-plan generator.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub start_hour: u32,
    /// Generation stops once the clock's hour reaches this value.
    pub end_hour: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            start_hour: 8,
            end_hour: 22,
        }
    }
}
