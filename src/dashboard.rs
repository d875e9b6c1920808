//! Dashboard view-model: the snapshot and engine output flattened into the
//! JSON shape the home screen draws (radar, last seven days, level progress,
//! recommendations).

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde_json::{json, Value};

use crate::training_engine::{
    models::{local_day, Ability, TrainingRecord},
    store::UserData,
};

/// Axes drawn on the radar chart. Creativity is tracked but not plotted.
pub const RADAR_AXES: [Ability; 6] = [
    Ability::Attention,
    Ability::Memory,
    Ability::Reaction,
    Ability::Logic,
    Ability::Coordination,
    Ability::Inhibition,
];

/// How many recommendations the dashboard lists.
pub const TOP_RECOMMENDATIONS: usize = 3;

/// One entry per radar axis, each out of 100.
fn radar(data: &UserData) -> Value {
    let points: Vec<Value> = RADAR_AXES
        .iter()
        .map(|a| {
            json!({
                "ability": a.to_string(),
                "value": data.ability_scores.get(*a),
                "fullMark": 100
            })
        })
        .collect();
    Value::Array(points)
}

fn day_bucket(day: NaiveDate, records: &[&TrainingRecord]) -> Value {
    let sessions = records.len();
    let avg_score = if sessions == 0 {
        0
    } else {
        let total: u32 = records.iter().map(|r| r.score).sum();
        (total as f64 / sessions as f64).round() as u32
    };
    let seconds: u32 = records.iter().map(|r| r.duration).sum();
    json!({
        "date": day.to_string(),
        "weekday": day.format("%a").to_string(),
        "sessions": sessions,
        "avgScore": avg_score,
        "duration": (seconds as f64 / 60.0).round() as u32
    })
}

/// Seven buckets, oldest first, ending on `now`'s local day.
fn weekly(data: &UserData, now: DateTime<Utc>) -> Value {
    let today = local_day(now);
    let buckets: Vec<Value> = (0..7)
        .rev()
        .map(|back| {
            let day = today - Duration::days(back);
            let records: Vec<&TrainingRecord> = data
                .training_history
                .iter()
                .filter(|r| local_day(r.timestamp) == day)
                .collect();
            day_bucket(day, &records)
        })
        .collect();
    Value::Array(buckets)
}

/// Totals over the weekly buckets; the average skips days without sessions.
fn weekly_summary(buckets: &Value) -> Value {
    let days = buckets.as_array().map(Vec::as_slice).unwrap_or(&[]);
    let field = |d: &Value, key: &str| d.get(key).and_then(Value::as_u64).unwrap_or(0);
    let sessions: u64 = days.iter().map(|d| field(d, "sessions")).sum();
    let minutes: u64 = days.iter().map(|d| field(d, "duration")).sum();
    let scored: Vec<u64> = days.iter().map(|d| field(d, "avgScore")).filter(|s| *s > 0).collect();
    let average = (scored.iter().sum::<u64>() as f64 / scored.len().max(1) as f64).round() as u64;
    json!({ "sessions": sessions, "minutes": minutes, "avgScore": average })
}

/// Dashboard view-model for `data` as of `now`.
pub fn dashboard_at(data: &UserData, now: DateTime<Utc>) -> Value {
    let engine = data.engine_at(now);
    let recommendations: Vec<_> = engine
        .training_recommendations()
        .into_iter()
        .take(TOP_RECOMMENDATIONS)
        .collect();
    let weekly = weekly(data, now);
    let summary = weekly_summary(&weekly);

    json!({
        "stats": {
            "totalSessions": data.total_sessions,
            "totalMinutes": data.total_training_time / 60,
            "currentStreak": data.current_streak,
            "longestStreak": data.longest_streak,
            "level": data.level,
            "experience": data.experience
        },
        "levelProgress": data.level_progress().round(),
        "daily": {
            "goal": data.daily_goal,
            "progress": data.daily_progress
        },
        "radar": radar(data),
        "weekly": weekly,
        "weeklySummary": summary,
        "abilities": engine.analyze_abilities(),
        "recommendations": recommendations,
        "dailyPlan": engine.daily_plan()
    })
}

pub fn dashboard(data: &UserData) -> Value {
    dashboard_at(data, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training_engine::models::{RecordDraft, TrainingType};

    fn add(data: &mut UserData, score: u32, duration: u32, at: DateTime<Utc>) {
        let draft = RecordDraft {
            training_type: TrainingType::Logic,
            score,
            accuracy: 90.0,
            duration,
            difficulty: 1,
        };
        data.add_training_record(draft, at, 500);
    }

    #[test]
    fn empty_profile_shape() {
        let data = UserData::default();
        let view = dashboard_at(&data, Utc::now());
        assert_eq!(view["radar"].as_array().unwrap().len(), 6);
        assert_eq!(view["radar"][0]["value"], 50.0);
        assert_eq!(view["weekly"].as_array().unwrap().len(), 7);
        assert_eq!(view["weeklySummary"]["sessions"], 0);
        assert_eq!(view["weeklySummary"]["avgScore"], 0);
        assert_eq!(view["recommendations"].as_array().unwrap().len(), 3);
        assert_eq!(view["dailyPlan"]["supplementaryTrainings"].as_array().unwrap().len(), 2);
        assert_eq!(view["abilities"].as_array().unwrap().len(), 7);
        assert_eq!(view["levelProgress"], 0.0);
    }

    #[test]
    fn weekly_buckets_group_by_day() {
        let now = Utc::now();
        let mut data = UserData::default();
        add(&mut data, 80, 120, now);
        add(&mut data, 60, 60, now);
        add(&mut data, 90, 300, now - Duration::days(2));
        add(&mut data, 10, 60, now - Duration::days(9));

        let view = dashboard_at(&data, now);
        let today = &view["weekly"][6];
        assert_eq!(today["date"], local_day(now).to_string());
        assert_eq!(today["sessions"], 2);
        assert_eq!(today["avgScore"], 70);
        assert_eq!(today["duration"], 3);
        assert_eq!(view["weekly"][4]["avgScore"], 90);
        assert_eq!(view["weeklySummary"]["sessions"], 3);
        assert_eq!(view["weeklySummary"]["minutes"], 8);
        assert_eq!(view["weeklySummary"]["avgScore"], 80);
        assert_eq!(view["stats"]["totalSessions"], 4);
    }
}
