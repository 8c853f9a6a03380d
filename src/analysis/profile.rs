use crate::{
    metrics::{mean, SessionMetrics},
    models::CognitiveProfile,
};

use super::config::AnalyzerConfig;

/// Maps finalized metrics onto a normalized [`CognitiveProfile`].
pub fn analyze_metrics(metrics: &SessionMetrics, config: &AnalyzerConfig) -> CognitiveProfile {
    CognitiveProfile {
        speed: score_speed(metrics.average_reaction_time(), config),
        accuracy: metrics.accuracy().clamp(0.0, 1.0),
        fatigue: score_fatigue(&metrics.reaction_times, config),
        attention_pattern: score_attention(&metrics.reaction_times),
    }
}

/// 0 s maps to 1, `slowest_reaction_secs` or more maps to 0.
fn score_speed(average_reaction_secs: f64, config: &AnalyzerConfig) -> f64 {
    (1.0 - average_reaction_secs / config.slowest_reaction_secs).clamp(0.0, 1.0)
}

/// Compares the leading and trailing halves of the reaction times.
/// With an odd count the middle sample belongs to neither half.
fn score_fatigue(reaction_times: &[f64], config: &AnalyzerConfig) -> f64 {
    if reaction_times.len() <= 2 {
        return 0.5;
    }

    let half = reaction_times.len() / 2;
    let (Some(first_avg), Some(second_avg)) = (
        mean(&reaction_times[..half]),
        mean(&reaction_times[reaction_times.len() - half..]),
    ) else {
        return 0.5;
    };

    let fatigue_ratio = (second_avg - first_avg) / first_avg.max(config.min_fatigue_baseline_secs);
    ((fatigue_ratio + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// One minus the coefficient of variation (population std-dev over mean).
fn score_attention(reaction_times: &[f64]) -> f64 {
    if reaction_times.len() <= 1 {
        return 0.5;
    }
    let Some(avg) = mean(reaction_times) else {
        return 0.5;
    };
    if avg <= 0.0 {
        return 0.5;
    }

    let variance = reaction_times
        .iter()
        .map(|value| (value - avg).powi(2))
        .sum::<f64>()
        / reaction_times.len() as f64;

    (1.0 - variance.sqrt() / avg).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DayTemplate;

    const EPSILON: f64 = 1e-9;

    fn metrics(reaction_times: Vec<f64>, correct_taps: u32, total_signals: u32) -> SessionMetrics {
        SessionMetrics {
            reaction_times,
            correct_taps,
            total_signals,
            ..SessionMetrics::default()
        }
    }

    fn analyze(m: &SessionMetrics) -> CognitiveProfile {
        analyze_metrics(m, &AnalyzerConfig::default())
    }

    #[test]
    fn boundary_example_lands_on_balanced() {
        let profile = analyze(&metrics(vec![0.4, 0.5, 0.45], 8, 10));
        assert!((profile.speed - 0.775).abs() < EPSILON);
        assert!((profile.accuracy - 0.8).abs() < EPSILON);
        assert_eq!(profile.template(), DayTemplate::Balanced);
    }

    #[test]
    fn empty_metrics_use_neutral_defaults() {
        let profile = analyze(&SessionMetrics::default());
        assert_eq!(profile.speed, 1.0);
        assert_eq!(profile.accuracy, 0.0);
        assert_eq!(profile.fatigue, 0.5);
        assert_eq!(profile.attention_pattern, 0.5);
        assert_eq!(profile.template(), DayTemplate::Recovery);
    }

    #[test]
    fn slow_reactions_floor_speed() {
        let profile = analyze(&metrics(vec![2.5, 3.0], 2, 2));
        assert_eq!(profile.speed, 0.0);
    }

    #[test]
    fn two_samples_are_too_few_for_fatigue() {
        let profile = analyze(&metrics(vec![0.2, 1.8], 2, 2));
        assert_eq!(profile.fatigue, 0.5);
        assert!(profile.attention_pattern < 0.5);
    }

    #[test]
    fn slower_second_half_means_fatigue() {
        let profile = analyze(&metrics(vec![0.4, 0.4, 0.6, 0.6], 4, 4));
        // ratio = (0.6 - 0.4) / 0.4 = 0.5
        assert!((profile.fatigue - 0.75).abs() < EPSILON);
    }

    #[test]
    fn odd_count_ignores_middle_sample() {
        let profile = analyze(&metrics(vec![0.5, 0.5, 3.0, 0.5, 0.5], 5, 5));
        assert!((profile.fatigue - 0.5).abs() < EPSILON);
    }

    #[test]
    fn faster_second_half_clamps_at_zero() {
        let profile = analyze(&metrics(vec![1.0, 1.0, 0.01, 0.01], 4, 4));
        assert!(profile.fatigue < 0.01);
        assert!(profile.fatigue >= 0.0);
    }

    #[test]
    fn identical_reactions_are_perfectly_consistent() {
        let profile = analyze(&metrics(vec![0.3, 0.3, 0.3], 3, 3));
        assert!((profile.attention_pattern - 1.0).abs() < EPSILON);
    }

    #[test]
    fn attention_uses_population_deviation() {
        // mean 0.5, population std-dev 0.1
        let profile = analyze(&metrics(vec![0.4, 0.6], 2, 2));
        assert!((profile.attention_pattern - 0.8).abs() < EPSILON);
    }
}
