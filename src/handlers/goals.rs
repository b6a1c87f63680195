use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::db::goals::{GoalDraft, GoalPatch, KeyResultDraft, KeyResultPatch};
use crate::db::models::{Goal, GoalPeriod, KeyResult};
use crate::error::FlowError;
use crate::router::FlowState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub period: Option<GoalPeriod>,
    pub year: Option<i64>,
}

pub async fn list(
    State(state): State<FlowState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Goal>>, FlowError> {
    let goals = state
        .goals
        .list(state.owner_id(), query.period, query.year)
        .await?;
    Ok(Json(goals))
}

pub async fn create(
    State(state): State<FlowState>,
    Json(draft): Json<GoalDraft>,
) -> Result<(StatusCode, Json<Goal>), FlowError> {
    if draft.title.trim().is_empty() {
        return Err(FlowError::InvalidInput("title must not be empty".into()));
    }
    let goal = state.goals.create(state.owner_id(), &draft).await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

pub async fn detail(
    State(state): State<FlowState>,
    Path(id): Path<i64>,
) -> Result<Json<Goal>, FlowError> {
    let goal = state.goals.get(state.owner_id(), id).await?;
    Ok(Json(goal))
}

pub async fn update(
    State(state): State<FlowState>,
    Path(id): Path<i64>,
    Json(patch): Json<GoalPatch>,
) -> Result<Json<Goal>, FlowError> {
    let goal = state.goals.update(state.owner_id(), id, &patch).await?;
    Ok(Json(goal))
}

pub async fn delete(
    State(state): State<FlowState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, FlowError> {
    state.goals.delete(state.owner_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_key_result(
    State(state): State<FlowState>,
    Path(id): Path<i64>,
    Json(draft): Json<KeyResultDraft>,
) -> Result<(StatusCode, Json<KeyResult>), FlowError> {
    // Ownership check before touching the child table.
    state.goals.get(state.owner_id(), id).await?;
    let kr = state.goals.add_key_result(id, &draft).await?;
    Ok((StatusCode::CREATED, Json(kr)))
}

pub async fn update_key_result(
    State(state): State<FlowState>,
    Path((id, kr_id)): Path<(i64, i64)>,
    Json(patch): Json<KeyResultPatch>,
) -> Result<Json<KeyResult>, FlowError> {
    state.goals.get(state.owner_id(), id).await?;
    let kr = state.goals.update_key_result(id, kr_id, &patch).await?;
    Ok(Json(kr))
}

pub async fn delete_key_result(
    State(state): State<FlowState>,
    Path((id, kr_id)): Path<(i64, i64)>,
) -> Result<StatusCode, FlowError> {
    state.goals.get(state.owner_id(), id).await?;
    state.goals.delete_key_result(id, kr_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
