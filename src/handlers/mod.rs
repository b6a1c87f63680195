pub mod dashboard;
pub mod goals;
pub mod habits;
pub mod projects;
pub mod reviews;
pub mod tasks;

use axum::Json;
use serde_json::{Value, json};

pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")}))
}
