use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::db::habits::HabitDraft;
use crate::db::models::{Habit, HabitLog};
use crate::engine;
use crate::error::FlowError;
use crate::router::FlowState;

/// Habit plus its derived weekly quota, the shape list views want.
#[derive(Serialize)]
pub struct HabitOut {
    #[serde(flatten)]
    habit: Habit,
    weekly_total: i64,
}

impl HabitOut {
    fn from(habit: Habit) -> Self {
        let weekly_total = engine::weekly_target_total(&habit);
        Self { habit, weekly_total }
    }
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub is_active: Option<bool>,
}

pub async fn list(
    State(state): State<FlowState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<HabitOut>>, FlowError> {
    let habits = state.habits.list(state.owner_id(), query.is_active).await?;
    Ok(Json(habits.into_iter().map(HabitOut::from).collect()))
}

pub async fn create(
    State(state): State<FlowState>,
    Json(draft): Json<HabitDraft>,
) -> Result<(StatusCode, Json<HabitOut>), FlowError> {
    let habit = state.habits.create(state.owner_id(), &draft).await?;
    Ok((StatusCode::CREATED, Json(HabitOut::from(habit))))
}

pub async fn detail(
    State(state): State<FlowState>,
    Path(id): Path<i64>,
) -> Result<Json<HabitOut>, FlowError> {
    let habit = state.habits.get(state.owner_id(), id).await?;
    Ok(Json(HabitOut::from(habit)))
}

pub async fn update(
    State(state): State<FlowState>,
    Path(id): Path<i64>,
    Json(draft): Json<HabitDraft>,
) -> Result<Json<HabitOut>, FlowError> {
    let habit = state.habits.update(state.owner_id(), id, &draft).await?;
    Ok(Json(HabitOut::from(habit)))
}

pub async fn delete(
    State(state): State<FlowState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, FlowError> {
    state.habits.delete(state.owner_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn archive(
    State(state): State<FlowState>,
    Path(id): Path<i64>,
) -> Result<Json<HabitOut>, FlowError> {
    let habit = state.habits.archive(state.owner_id(), id).await?;
    Ok(Json(HabitOut::from(habit)))
}

#[derive(Deserialize)]
pub struct WeekQuery {
    pub year: Option<i32>,
    pub week: Option<u32>,
}

#[derive(Serialize)]
pub struct HabitWeekOut {
    #[serde(flatten)]
    habit: HabitOut,
    #[serde(flatten)]
    week: engine::WeekView,
}

#[derive(Serialize)]
pub struct WeekResponse {
    pub year: i32,
    pub week: u32,
    pub week_dates: [NaiveDate; 7],
    pub habits: Vec<HabitWeekOut>,
}

/// Weekly board: every active habit joined against one ISO week of check-ins.
/// Defaults to the current week.
pub async fn week(
    State(state): State<FlowState>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<WeekResponse>, FlowError> {
    let today = Utc::now().date_naive();
    let iso = today.iso_week();
    let year = query.year.unwrap_or_else(|| iso.year());
    let week = query.week.unwrap_or_else(|| iso.week());

    let week_start = engine::iso_week_start(year, week)?;
    let week_dates = engine::week_dates(week_start);
    let week_end = week_dates[6];

    let habits = state.habits.list(state.owner_id(), Some(true)).await?;
    let mut out = Vec::with_capacity(habits.len());
    for habit in habits {
        let counts = state
            .habits
            .counts_between(habit.id, week_start, week_end)
            .await?;
        let week = engine::week_view(&habit, week_start, &counts);
        out.push(HabitWeekOut {
            habit: HabitOut::from(habit),
            week,
        });
    }

    Ok(Json(WeekResponse {
        year,
        week,
        week_dates,
        habits: out,
    }))
}

#[derive(Deserialize)]
pub struct ToggleBody {
    pub habit_id: i64,
    pub date: NaiveDate,
    pub count: Option<i64>,
}

/// Flip (or explicitly set) one day's check-in.
pub async fn toggle(
    State(state): State<FlowState>,
    Json(body): Json<ToggleBody>,
) -> Result<Json<Value>, FlowError> {
    let habit = state.habits.get(state.owner_id(), body.habit_id).await?;
    let count = state
        .habits
        .toggle_check_in(&habit, body.date, body.count)
        .await?;
    Ok(Json(json!({"success": true, "count": count})))
}

#[derive(Deserialize, Default)]
pub struct CheckBody {
    pub note: Option<String>,
}

/// Cumulative check-in for today: each call bumps the count by one.
pub async fn check(
    State(state): State<FlowState>,
    Path(id): Path<i64>,
    body: Option<Json<CheckBody>>,
) -> Result<Json<HabitLog>, FlowError> {
    let habit = state.habits.get(state.owner_id(), id).await?;
    let note = body.as_ref().and_then(|Json(b)| b.note.as_deref());
    let log = state
        .habits
        .increment_check_in(&habit, Utc::now().date_naive(), note)
        .await?;
    Ok(Json(log))
}

#[derive(Deserialize)]
pub struct StatsQuery {
    pub days: Option<u64>,
}

#[derive(Serialize)]
pub struct HabitStatsResponse {
    pub habit: HabitOut,
    pub total_checkins: i64,
    pub current_streak: u32,
    pub recent_logs: Vec<HabitLog>,
}

pub async fn stats(
    State(state): State<FlowState>,
    Path(id): Path<i64>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<HabitStatsResponse>, FlowError> {
    let habit = state.habits.get(state.owner_id(), id).await?;
    let today = Utc::now().date_naive();
    let days = query.days.unwrap_or(30);
    let window_start = today
        .checked_sub_days(Days::new(days))
        .ok_or_else(|| FlowError::InvalidInput(format!("days out of range: {days}")))?;

    let counts = state.habits.counts_all(habit.id).await?;
    let current_streak = engine::current_streak(&habit, today, &counts);

    // Sum of all tallies in the window, not a day count.
    let total_checkins = counts
        .iter()
        .filter(|(date, _)| **date >= window_start && **date <= today)
        .map(|(_, count)| *count)
        .sum();

    let mut recent_logs = state
        .habits
        .list_logs_between(habit.id, window_start, today)
        .await?;
    recent_logs.truncate(7);

    Ok(Json(HabitStatsResponse {
        habit: HabitOut::from(habit),
        total_checkins,
        current_streak,
        recent_logs,
    }))
}

#[derive(Serialize)]
pub struct TodayStatus {
    #[serde(flatten)]
    pub habit: HabitOut,
    pub today_count: i64,
    pub is_completed_today: bool,
}

/// Today's checklist: each active habit with its count so far and whether
/// the daily requirement is already met.
pub async fn today_status(
    State(state): State<FlowState>,
) -> Result<Json<Vec<TodayStatus>>, FlowError> {
    let today = Utc::now().date_naive();
    let habits = state.habits.list(state.owner_id(), Some(true)).await?;

    let mut out = Vec::with_capacity(habits.len());
    for habit in habits {
        let today_count = state
            .habits
            .get_log(habit.id, today)
            .await?
            .map(|log| log.count)
            .unwrap_or(0);
        let is_completed_today = engine::day_met(&habit, today, today_count);
        out.push(TodayStatus {
            habit: HabitOut::from(habit),
            today_count,
            is_completed_today,
        });
    }
    Ok(Json(out))
}
