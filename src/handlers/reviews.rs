use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::db::models::{Review, ReviewPeriod};
use crate::db::reviews::{ReviewDraft, ReviewPatch};
use crate::error::FlowError;
use crate::router::FlowState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub period: Option<ReviewPeriod>,
    pub year: Option<i64>,
}

pub async fn list(
    State(state): State<FlowState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Review>>, FlowError> {
    let reviews = state
        .reviews
        .list(state.owner_id(), query.period, query.year)
        .await?;
    Ok(Json(reviews))
}

pub async fn create(
    State(state): State<FlowState>,
    Json(draft): Json<ReviewDraft>,
) -> Result<(StatusCode, Json<Review>), FlowError> {
    let review = state.reviews.create(state.owner_id(), &draft).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn detail(
    State(state): State<FlowState>,
    Path(id): Path<i64>,
) -> Result<Json<Review>, FlowError> {
    let review = state.reviews.get(state.owner_id(), id).await?;
    Ok(Json(review))
}

pub async fn update(
    State(state): State<FlowState>,
    Path(id): Path<i64>,
    Json(patch): Json<ReviewPatch>,
) -> Result<Json<Review>, FlowError> {
    let review = state.reviews.update(state.owner_id(), id, &patch).await?;
    Ok(Json(review))
}

pub async fn delete(
    State(state): State<FlowState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, FlowError> {
    state.reviews.delete(state.owner_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Today's daily review, or `{"exists": false}` when none is written yet.
pub async fn today(State(state): State<FlowState>) -> Result<Json<Value>, FlowError> {
    let today = Utc::now().date_naive();
    match state.reviews.find_daily(state.owner_id(), today).await? {
        Some(review) => Ok(Json(json!({"exists": true, "review": review}))),
        None => Ok(Json(json!({"exists": false, "review": null}))),
    }
}
