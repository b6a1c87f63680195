use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;

use crate::db::models::{Project, ProjectGoal, Task};
use crate::db::projects::{MilestoneDraft, MilestonePatch, ProjectDraft, ProjectPatch};
use crate::error::FlowError;
use crate::router::FlowState;

/// Project plus its task tallies for list views.
#[derive(Serialize)]
pub struct ProjectOut {
    #[serde(flatten)]
    pub project: Project,
    pub total_tasks: i64,
    pub completed_tasks: i64,
}

#[derive(Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: ProjectOut,
    pub goals: Vec<ProjectGoal>,
    pub tasks: Vec<Task>,
}

pub async fn list(State(state): State<FlowState>) -> Result<Json<Vec<ProjectOut>>, FlowError> {
    let projects = state.projects.list(state.owner_id()).await?;
    let mut out = Vec::with_capacity(projects.len());
    for project in projects {
        let (total_tasks, completed_tasks) = state.tasks.counts_for_project(project.id).await?;
        out.push(ProjectOut {
            project,
            total_tasks,
            completed_tasks,
        });
    }
    Ok(Json(out))
}

pub async fn create(
    State(state): State<FlowState>,
    Json(draft): Json<ProjectDraft>,
) -> Result<(StatusCode, Json<Project>), FlowError> {
    if draft.name.trim().is_empty() {
        return Err(FlowError::InvalidInput("name must not be empty".into()));
    }
    let project = state.projects.create(state.owner_id(), &draft).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn detail(
    State(state): State<FlowState>,
    Path(id): Path<i64>,
) -> Result<Json<ProjectDetail>, FlowError> {
    let project = state.projects.get(state.owner_id(), id).await?;
    let (total_tasks, completed_tasks) = state.tasks.counts_for_project(project.id).await?;
    let goals = state.projects.list_milestones(project.id).await?;
    let tasks = state.tasks.list_for_project(project.id).await?;
    Ok(Json(ProjectDetail {
        project: ProjectOut {
            project,
            total_tasks,
            completed_tasks,
        },
        goals,
        tasks,
    }))
}

pub async fn update(
    State(state): State<FlowState>,
    Path(id): Path<i64>,
    Json(patch): Json<ProjectPatch>,
) -> Result<Json<Project>, FlowError> {
    let project = state.projects.update(state.owner_id(), id, &patch).await?;
    Ok(Json(project))
}

pub async fn delete(
    State(state): State<FlowState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, FlowError> {
    state.projects.delete(state.owner_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ----- milestones -----

pub async fn list_milestones(
    State(state): State<FlowState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ProjectGoal>>, FlowError> {
    // 404 for a project that isn't ours before listing its milestones.
    state.projects.get(state.owner_id(), id).await?;
    let milestones = state.projects.list_milestones(id).await?;
    Ok(Json(milestones))
}

pub async fn create_milestone(
    State(state): State<FlowState>,
    Path(id): Path<i64>,
    Json(draft): Json<MilestoneDraft>,
) -> Result<(StatusCode, Json<ProjectGoal>), FlowError> {
    if draft.title.trim().is_empty() {
        return Err(FlowError::InvalidInput("title must not be empty".into()));
    }
    state.projects.get(state.owner_id(), id).await?;
    let milestone = state
        .projects
        .create_milestone(state.owner_id(), id, &draft)
        .await?;
    state.projects.recompute_progress(id).await?;
    Ok((StatusCode::CREATED, Json(milestone)))
}

pub async fn update_milestone(
    State(state): State<FlowState>,
    Path((id, goal_id)): Path<(i64, i64)>,
    Json(patch): Json<MilestonePatch>,
) -> Result<Json<ProjectGoal>, FlowError> {
    state.projects.get(state.owner_id(), id).await?;
    let milestone = state.projects.update_milestone(id, goal_id, &patch).await?;
    state.projects.recompute_progress(id).await?;
    Ok(Json(milestone))
}

pub async fn toggle_milestone(
    State(state): State<FlowState>,
    Path((id, goal_id)): Path<(i64, i64)>,
) -> Result<Json<ProjectGoal>, FlowError> {
    state.projects.get(state.owner_id(), id).await?;
    let milestone = state.projects.toggle_milestone(id, goal_id).await?;
    state.projects.recompute_progress(id).await?;
    Ok(Json(milestone))
}

pub async fn delete_milestone(
    State(state): State<FlowState>,
    Path((id, goal_id)): Path<(i64, i64)>,
) -> Result<StatusCode, FlowError> {
    state.projects.get(state.owner_id(), id).await?;
    state.projects.delete_milestone(id, goal_id).await?;
    state.projects.recompute_progress(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
