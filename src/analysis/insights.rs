use chrono::{DateTime, Days, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::models::{TestResult, TimeOfDay};

const MAX_BEST_RESULTS: usize = 10;
const WEEK_DAYS: u64 = 7;
const SPEED_GAP_PERCENT: f64 = 15.0;
const LOW_ACCURACY: f64 = 0.6;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CognitiveDataPoint {
    pub date: NaiveDate,
    pub morning_speed: f64,
    pub evening_speed: f64,
}

/// Merges the most accurate and the fastest result of `history` into `best`.
pub fn update_best_results(best: &mut Vec<TestResult>, history: &[TestResult]) {
    let most_accurate = history.iter().max_by(|a, b| {
        a.metrics
            .accuracy_percentage()
            .total_cmp(&b.metrics.accuracy_percentage())
    });

    let fastest = history
        .iter()
        .filter(|result| result.metrics.average_reaction_time() > 0.0)
        .min_by(|a, b| {
            a.metrics
                .average_reaction_time()
                .total_cmp(&b.metrics.average_reaction_time())
        });

    for candidate in [most_accurate, fastest].into_iter().flatten() {
        if !best.iter().any(|result| result.id == candidate.id) {
            best.push(candidate.clone());
        }
    }

    best.truncate(MAX_BEST_RESULTS);
}

/// Morning/evening speed for each of the last seven days, oldest first.
pub fn weekly_form<Tz: TimeZone>(
    history: &[TestResult],
    now: &DateTime<Tz>,
) -> Vec<CognitiveDataPoint> {
    let tz = now.timezone();
    let today = now.date_naive();

    let speed_on = |date: NaiveDate, time_of_day: TimeOfDay| {
        history
            .iter()
            .find(|result| {
                result.time_of_day == time_of_day
                    && result.timestamp.with_timezone(&tz).date_naive() == date
            })
            .map(|result| result.profile.speed)
            .unwrap_or(0.0)
    };

    (0..WEEK_DAYS)
        .rev()
        .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
        .map(|date| CognitiveDataPoint {
            date,
            morning_speed: speed_on(date, TimeOfDay::Morning),
            evening_speed: speed_on(date, TimeOfDay::Evening),
        })
        .collect()
}

pub fn recommendations(history: &[TestResult]) -> Vec<String> {
    let average_speed = |time_of_day: TimeOfDay| {
        let speeds: Vec<f64> = history
            .iter()
            .filter(|result| result.time_of_day == time_of_day)
            .map(|result| result.profile.speed)
            .collect();
        crate::metrics::mean(&speeds)
    };

    let (Some(morning), Some(evening)) = (
        average_speed(TimeOfDay::Morning),
        average_speed(TimeOfDay::Evening),
    ) else {
        return vec!["Complete more tests to get personalized recommendations".into()];
    };

    let mut tips = Vec::new();

    if morning > 0.0 {
        let difference = (morning - evening) / morning * 100.0;
        if difference > SPEED_GAP_PERCENT {
            tips.push(format!(
                "Your reaction speed in the morning is {}% higher than in the evening. Schedule complex tasks before 12:00 PM.",
                difference as i64
            ));
        } else if difference < -SPEED_GAP_PERCENT {
            tips.push(format!(
                "Your reaction speed in the evening is {}% higher than in the morning. Consider scheduling important tasks in the afternoon.",
                difference.abs() as i64
            ));
        }
    }

    let accuracies: Vec<f64> = history.iter().map(|result| result.profile.accuracy).collect();
    if crate::metrics::mean(&accuracies).is_some_and(|accuracy| accuracy < LOW_ACCURACY) {
        tips.push(
            "Your accuracy is below optimal. Consider taking more breaks between focus sessions."
                .into(),
        );
    }

    tips
}
