use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::{Task, TaskPriority, TaskStatus, TaskType};
use crate::db::tasks::{NewTask, TaskPatch, TaskView};
use crate::engine;
use crate::error::FlowError;
use crate::router::FlowState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub view: Option<String>,
}

pub async fn list(
    State(state): State<FlowState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Task>>, FlowError> {
    let view = match query.view.as_deref() {
        Some(v) => TaskView::parse(v)?,
        None => TaskView::All,
    };
    let tasks = state
        .tasks
        .list(state.owner_id(), view, Utc::now().date_naive())
        .await?;
    Ok(Json(tasks))
}

#[derive(Deserialize)]
pub struct CreateTaskBody {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_task_type")]
    pub task_type: TaskType,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub scheduled_date: Option<NaiveDate>,
    /// Shorthand like "today" or "this_week"; resolved to a concrete date.
    #[serde(default)]
    pub scheduled_type: Option<String>,
    #[serde(default)]
    pub estimated_pomodoros: Option<i64>,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub is_inbox: Option<bool>,
}

fn default_task_type() -> TaskType {
    TaskType::Task
}

/// Resolve a scheduling shorthand against today's date. A shorthand, when
/// present, overrides any explicit date.
fn resolve_scheduled(
    shorthand: Option<&str>,
    explicit: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<Option<NaiveDate>, FlowError> {
    let Some(shorthand) = shorthand else {
        return Ok(explicit);
    };
    let date = match shorthand {
        "today" => today,
        "tomorrow" => today + Days::new(1),
        "week" => today + Days::new(7),
        "month" => today + Days::new(30),
        "year" => today + Days::new(365),
        other => {
            return Err(FlowError::InvalidInput(format!(
                "unknown scheduled_type: {other:?}"
            )));
        }
    };
    Ok(Some(date))
}

pub async fn create(
    State(state): State<FlowState>,
    Json(body): Json<CreateTaskBody>,
) -> Result<(StatusCode, Json<Task>), FlowError> {
    if body.title.trim().is_empty() {
        return Err(FlowError::InvalidInput("title must not be empty".into()));
    }
    let today = Utc::now().date_naive();
    let scheduled_date =
        resolve_scheduled(body.scheduled_type.as_deref(), body.scheduled_date, today)?;

    // A task lands in the inbox unless it is scheduled or explicitly placed.
    let is_inbox = body
        .is_inbox
        .unwrap_or(scheduled_date.is_none() && body.due_date.is_none());

    let new_task = NewTask {
        title: body.title,
        description: body.description,
        task_type: body.task_type,
        priority: body.priority.map(TaskPriority::from_number).unwrap_or(TaskPriority::Medium),
        due_date: body.due_date,
        scheduled_date,
        scheduled_type: body.scheduled_type,
        estimated_pomodoros: body.estimated_pomodoros,
        project_id: body.project_id,
        is_inbox,
    };
    let task = state.tasks.create(state.owner_id(), &new_task).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn detail(
    State(state): State<FlowState>,
    Path(id): Path<i64>,
) -> Result<Json<Task>, FlowError> {
    let task = state.tasks.get(state.owner_id(), id).await?;
    Ok(Json(task))
}

#[derive(Deserialize, Default)]
pub struct UpdateTaskBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<i64>,
    pub due_date: Option<NaiveDate>,
    pub scheduled_date: Option<NaiveDate>,
    pub estimated_pomodoros: Option<i64>,
    pub actual_pomodoros: Option<i64>,
    pub project_id: Option<i64>,
}

pub async fn update(
    State(state): State<FlowState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTaskBody>,
) -> Result<Json<Task>, FlowError> {
    let patch = TaskPatch {
        title: body.title,
        description: body.description,
        status: body.status,
        priority: body.priority.map(TaskPriority::from_number),
        due_date: body.due_date,
        scheduled_date: body.scheduled_date,
        estimated_pomodoros: body.estimated_pomodoros,
        actual_pomodoros: body.actual_pomodoros,
        project_id: body.project_id,
    };
    let task = state.tasks.update(state.owner_id(), id, &patch).await?;

    if let Some(project_id) = task.project_id {
        state.projects.recompute_progress(project_id).await?;
    }
    Ok(Json(task))
}

pub async fn delete(
    State(state): State<FlowState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, FlowError> {
    let task = state.tasks.get(state.owner_id(), id).await?;
    state.tasks.delete(state.owner_id(), id).await?;
    if let Some(project_id) = task.project_id {
        state.projects.recompute_progress(project_id).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize, Default)]
pub struct CompleteBody {
    pub actual_pomodoros: Option<i64>,
}

/// Toggle a task's completion; the owning project's progress follows.
pub async fn complete(
    State(state): State<FlowState>,
    Path(id): Path<i64>,
    body: Option<Json<CompleteBody>>,
) -> Result<Json<Task>, FlowError> {
    let actual = body.and_then(|Json(b)| b.actual_pomodoros);
    let task = state.tasks.toggle_complete(state.owner_id(), id, actual).await?;

    if let Some(project_id) = task.project_id {
        state.projects.recompute_progress(project_id).await?;
    }
    Ok(Json(task))
}

#[derive(Deserialize)]
pub struct WeekCalendarQuery {
    pub year: Option<i32>,
    pub week: Option<u32>,
}

#[derive(Serialize)]
pub struct WeekCalendarDay {
    pub date: NaiveDate,
    /// Monday-first weekday index, 0..=6.
    pub weekday: u32,
    pub tasks: Vec<Task>,
}

#[derive(Serialize)]
pub struct WeekCalendarResponse {
    pub year: i32,
    pub week: u32,
    pub days: Vec<WeekCalendarDay>,
}

/// Open tasks bucketed by scheduled date across one ISO week.
pub async fn week_calendar(
    State(state): State<FlowState>,
    Query(query): Query<WeekCalendarQuery>,
) -> Result<Json<WeekCalendarResponse>, FlowError> {
    let today = Utc::now().date_naive();
    let iso = today.iso_week();
    let year = query.year.unwrap_or_else(|| iso.year());
    let week = query.week.unwrap_or_else(|| iso.week());
    let week_start = engine::iso_week_start(year, week)?;

    let mut days = Vec::with_capacity(7);
    for date in engine::week_dates(week_start) {
        let tasks = state.tasks.scheduled_on(state.owner_id(), date).await?;
        days.push(WeekCalendarDay {
            date,
            weekday: date.weekday().num_days_from_monday(),
            tasks,
        });
    }

    Ok(Json(WeekCalendarResponse { year, week, days }))
}

#[derive(Serialize)]
pub struct TaskStatsResponse {
    pub week_completed: i64,
    pub project_stats: Vec<ProjectStat>,
    pub priority_stats: Vec<PriorityStat>,
}

#[derive(Serialize)]
pub struct ProjectStat {
    pub project_id: Option<i64>,
    pub completed: i64,
}

#[derive(Serialize)]
pub struct PriorityStat {
    pub priority: i64,
    pub completed: i64,
}

pub async fn stats(
    State(state): State<FlowState>,
) -> Result<Json<TaskStatsResponse>, FlowError> {
    let today = Utc::now().date_naive();
    let week_start = today - Days::new(today.weekday().num_days_from_monday() as u64);
    let week_start_utc = week_start
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| FlowError::InvalidInput("invalid week start".into()))?;

    let stats = state.tasks.stats(state.owner_id(), week_start_utc).await?;
    Ok(Json(TaskStatsResponse {
        week_completed: stats.week_completed,
        project_stats: stats
            .project_stats
            .into_iter()
            .map(|(project_id, completed)| ProjectStat {
                project_id,
                completed,
            })
            .collect(),
        priority_stats: stats
            .priority_stats
            .into_iter()
            .map(|(priority, completed)| PriorityStat {
                priority: priority.as_number(),
                completed,
            })
            .collect(),
    }))
}
