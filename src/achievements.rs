use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{metrics::SessionMetrics, models::Difficulty};

const PERFECT_ACCURACY: f64 = 100.0;
const SPEED_MASTER_SECS: f64 = 0.5;
const MARATHON_TESTS: usize = 10;
const CONSISTENCY_DAYS: u32 = 7;
const TIME_OF_DAY_TESTS: usize = 5;
const HIGH_SCORE: i64 = 500;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum AchievementKind {
    PerfectRound,
    SpeedMaster,
    Marathon,
    Consistency,
    EarlyBird,
    NightOwl,
    HighScore,
    FocusMaster,
}

impl AchievementKind {
    pub const ALL: [AchievementKind; 8] = [
        AchievementKind::PerfectRound,
        AchievementKind::SpeedMaster,
        AchievementKind::Marathon,
        AchievementKind::Consistency,
        AchievementKind::EarlyBird,
        AchievementKind::NightOwl,
        AchievementKind::HighScore,
        AchievementKind::FocusMaster,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            AchievementKind::PerfectRound => "Perfect Round",
            AchievementKind::SpeedMaster => "Speed Master",
            AchievementKind::Marathon => "Marathon Runner",
            AchievementKind::Consistency => "Consistency King",
            AchievementKind::EarlyBird => "Early Bird",
            AchievementKind::NightOwl => "Night Owl",
            AchievementKind::HighScore => "High Scorer",
            AchievementKind::FocusMaster => "Focus Master",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AchievementKind::PerfectRound => "Achieve 100% accuracy in a test",
            AchievementKind::SpeedMaster => "Average reaction time under 0.5s",
            AchievementKind::Marathon => "Complete 10 tests",
            AchievementKind::Consistency => "Maintain a 7-day streak",
            AchievementKind::EarlyBird => "Complete 5 morning tests",
            AchievementKind::NightOwl => "Complete 5 evening tests",
            AchievementKind::HighScore => "Score over 500 points",
            AchievementKind::FocusMaster => "Complete test on Hard difficulty",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub kind: AchievementKind,
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl Achievement {
    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }
}

/// Everything the unlock rules look at after a test completes.
#[derive(Debug, Clone, Copy)]
pub struct AchievementContext<'a> {
    pub metrics: &'a SessionMetrics,
    pub difficulty: Difficulty,
    pub test_count: usize,
    pub streak: u32,
    pub morning_count: usize,
    pub evening_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AchievementBook {
    achievements: Vec<Achievement>,
}

impl Default for AchievementBook {
    fn default() -> Self {
        Self {
            achievements: AchievementKind::ALL
                .iter()
                .map(|kind| Achievement {
                    kind: *kind,
                    unlocked_at: None,
                })
                .collect(),
        }
    }
}

impl AchievementBook {
    pub fn all(&self) -> &[Achievement] {
        &self.achievements
    }

    pub fn unlocked(&self) -> impl Iterator<Item = &Achievement> {
        self.achievements.iter().filter(|a| a.is_unlocked())
    }

    pub fn is_unlocked(&self, kind: AchievementKind) -> bool {
        self.achievements
            .iter()
            .any(|a| a.kind == kind && a.is_unlocked())
    }

    /// Applies the unlock rules and returns only the achievements unlocked by this call.
    pub fn check(&mut self, ctx: &AchievementContext<'_>, now: DateTime<Utc>) -> Vec<Achievement> {
        let metrics = ctx.metrics;
        let average_reaction = metrics.average_reaction_time();

        let earned = [
            (
                AchievementKind::PerfectRound,
                metrics.total_signals > 0 && metrics.accuracy_percentage() >= PERFECT_ACCURACY,
            ),
            (
                AchievementKind::SpeedMaster,
                average_reaction > 0.0 && average_reaction < SPEED_MASTER_SECS,
            ),
            (AchievementKind::Marathon, ctx.test_count >= MARATHON_TESTS),
            (AchievementKind::Consistency, ctx.streak >= CONSISTENCY_DAYS),
            (AchievementKind::EarlyBird, ctx.morning_count >= TIME_OF_DAY_TESTS),
            (AchievementKind::NightOwl, ctx.evening_count >= TIME_OF_DAY_TESTS),
            (AchievementKind::HighScore, metrics.estimated_score() >= HIGH_SCORE),
            (AchievementKind::FocusMaster, ctx.difficulty == Difficulty::Hard),
        ];

        let mut newly_unlocked = Vec::new();
        for (kind, condition) in earned {
            if condition {
                if let Some(achievement) = self.unlock(kind, now) {
                    newly_unlocked.push(achievement);
                }
            }
        }
        newly_unlocked
    }

    fn unlock(&mut self, kind: AchievementKind, now: DateTime<Utc>) -> Option<Achievement> {
        if let Some(existing) = self.achievements.iter_mut().find(|a| a.kind == kind) {
            if existing.is_unlocked() {
                return None;
            }
            existing.unlocked_at = Some(now);
            return Some(existing.clone());
        }

        // Older saved books may predate a kind.
        let achievement = Achievement {
            kind,
            unlocked_at: Some(now),
        };
        self.achievements.push(achievement.clone());
        Some(achievement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(metrics: &SessionMetrics) -> AchievementContext<'_> {
        AchievementContext {
            metrics,
            difficulty: Difficulty::Medium,
            test_count: 1,
            streak: 1,
            morning_count: 1,
            evening_count: 0,
        }
    }

    #[test]
    fn fresh_book_is_locked() {
        let book = AchievementBook::default();
        assert_eq!(book.all().len(), 8);
        assert_eq!(book.unlocked().count(), 0);
    }

    #[test]
    fn perfect_fast_round_unlocks_two() {
        let metrics = SessionMetrics {
            reaction_times: vec![0.3, 0.4],
            correct_taps: 2,
            total_signals: 2,
            ..SessionMetrics::default()
        };
        let mut book = AchievementBook::default();
        let unlocked = book.check(&context(&metrics), Utc::now());
        let kinds: Vec<_> = unlocked.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AchievementKind::PerfectRound, AchievementKind::SpeedMaster]);
    }

    #[test]
    fn unlocks_only_once() {
        let metrics = SessionMetrics::default();
        let mut book = AchievementBook::default();
        let mut ctx = context(&metrics);
        ctx.difficulty = Difficulty::Hard;

        assert_eq!(book.check(&ctx, Utc::now()).len(), 1);
        assert!(book.check(&ctx, Utc::now()).is_empty());
        assert!(book.is_unlocked(AchievementKind::FocusMaster));
    }

    #[test]
    fn high_score_threshold_is_500() {
        let mut metrics = SessionMetrics {
            correct_taps: 50,
            incorrect_taps: 2,
            ..SessionMetrics::default()
        };
        let mut book = AchievementBook::default();
        assert!(book.check(&context(&metrics), Utc::now()).is_empty());

        metrics.correct_taps = 51;
        metrics.incorrect_taps = 2;
        let unlocked = book.check(&context(&metrics), Utc::now());
        assert_eq!(unlocked.len(), 1);
        assert_eq!(unlocked[0].kind, AchievementKind::HighScore);
    }

    #[test]
    fn history_counters_unlock_their_badges() {
        let metrics = SessionMetrics::default();
        let mut book = AchievementBook::default();
        let ctx = AchievementContext {
            metrics: &metrics,
            difficulty: Difficulty::Easy,
            test_count: 10,
            streak: 7,
            morning_count: 5,
            evening_count: 5,
        };
        let unlocked = book.check(&ctx, Utc::now());
        assert_eq!(unlocked.len(), 4);
    }
}
