use axum::Json;
use axum::extract::State;
use chrono::{Datelike, Days, NaiveDate, Utc};
use serde::Serialize;

use crate::engine;
use crate::error::FlowError;
use crate::router::FlowState;

#[derive(Serialize)]
pub struct DashboardStats {
    pub today: TodaySection,
    pub overview: OverviewSection,
    /// Last 7 days of total check-in counts, oldest first.
    pub heatmap: Vec<HeatmapCell>,
}

#[derive(Serialize)]
pub struct TodaySection {
    pub tasks_count: i64,
    pub completed_habits: i64,
    pub total_habits: i64,
}

#[derive(Serialize)]
pub struct OverviewSection {
    pub active_goals: i64,
    pub active_habits: i64,
    pub week_tasks_total: i64,
    pub week_tasks_completed: i64,
}

#[derive(Serialize)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    pub count: i64,
}

pub async fn stats(State(state): State<FlowState>) -> Result<Json<DashboardStats>, FlowError> {
    let owner = state.owner_id();
    let today = Utc::now().date_naive();

    let habits = state.habits.list(owner, Some(true)).await?;
    let total_habits = habits.len() as i64;
    let mut completed_habits = 0;
    for habit in &habits {
        let count = state
            .habits
            .get_log(habit.id, today)
            .await?
            .map(|log| log.count)
            .unwrap_or(0);
        if engine::day_met(habit, today, count) {
            completed_habits += 1;
        }
    }

    let tasks_count = state.tasks.count_open_today(owner, today).await?;

    let week_start = today - Days::new(today.weekday().num_days_from_monday() as u64);
    let week_start_utc = week_start
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| FlowError::InvalidInput("invalid week start".into()))?;

    let overview = OverviewSection {
        active_goals: state.goals.count_active(owner).await?,
        active_habits: total_habits,
        week_tasks_total: state
            .tasks
            .count_scheduled_between(owner, week_start, today)
            .await?,
        week_tasks_completed: state
            .tasks
            .count_completed_since(owner, week_start_utc)
            .await?,
    };

    let mut heatmap = Vec::with_capacity(7);
    for offset in (0..7).rev() {
        let date = today - Days::new(offset);
        let count = state.habits.total_count_on(owner, date).await?;
        heatmap.push(HeatmapCell { date, count });
    }

    Ok(Json(DashboardStats {
        today: TodaySection {
            tasks_count,
            completed_habits,
            total_habits,
        },
        overview,
        heatmap,
    }))
}
