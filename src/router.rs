use std::sync::Arc;

use axum::Router;
use axum::middleware::from_extractor_with_state;
use axum::routing::{get, post};

use crate::db::SqlitePool;
use crate::db::goals::GoalStore;
use crate::db::habits::HabitStore;
use crate::db::projects::ProjectStore;
use crate::db::reviews::ReviewStore;
use crate::db::tasks::TaskStore;
use crate::db::users::UserStore;
use crate::handlers;
use crate::middleware::RequireKeyAuth;

/// Shared application state: one store per domain over a single pool, the
/// bootstrapped owner account, and the API key requests must present.
#[derive(Clone)]
pub struct FlowState {
    pub habits: HabitStore,
    pub tasks: TaskStore,
    pub projects: ProjectStore,
    pub goals: GoalStore,
    pub reviews: ReviewStore,
    pub users: UserStore,
    owner_id: i64,
    api_key: Arc<str>,
}

impl FlowState {
    pub fn new(pool: SqlitePool, owner_id: i64, api_key: String) -> Self {
        Self {
            habits: HabitStore::new(pool.clone()),
            tasks: TaskStore::new(pool.clone()),
            projects: ProjectStore::new(pool.clone()),
            goals: GoalStore::new(pool.clone()),
            reviews: ReviewStore::new(pool.clone()),
            users: UserStore::new(pool),
            owner_id,
            api_key: api_key.into(),
        }
    }

    pub fn owner_id(&self) -> i64 {
        self.owner_id
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

pub fn flow_router(state: FlowState) -> Router {
    let api = Router::new()
        // habits
        .route(
            "/habits",
            get(handlers::habits::list).post(handlers::habits::create),
        )
        .route("/habits/week", get(handlers::habits::week))
        .route("/habits/toggle", post(handlers::habits::toggle))
        .route("/habits/today/check", get(handlers::habits::today_status))
        .route(
            "/habits/{id}",
            get(handlers::habits::detail)
                .put(handlers::habits::update)
                .delete(handlers::habits::delete),
        )
        .route("/habits/{id}/archive", post(handlers::habits::archive))
        .route("/habits/{id}/check", post(handlers::habits::check))
        .route("/habits/{id}/stats", get(handlers::habits::stats))
        // tasks
        .route(
            "/tasks",
            get(handlers::tasks::list).post(handlers::tasks::create),
        )
        .route("/tasks/week-calendar", get(handlers::tasks::week_calendar))
        .route("/tasks/stats", get(handlers::tasks::stats))
        .route(
            "/tasks/{id}",
            get(handlers::tasks::detail)
                .put(handlers::tasks::update)
                .delete(handlers::tasks::delete),
        )
        .route("/tasks/{id}/complete", post(handlers::tasks::complete))
        // projects
        .route(
            "/projects",
            get(handlers::projects::list).post(handlers::projects::create),
        )
        .route(
            "/projects/{id}",
            get(handlers::projects::detail)
                .put(handlers::projects::update)
                .delete(handlers::projects::delete),
        )
        .route(
            "/projects/{id}/goals",
            get(handlers::projects::list_milestones).post(handlers::projects::create_milestone),
        )
        .route(
            "/projects/{id}/goals/{goal_id}",
            axum::routing::put(handlers::projects::update_milestone)
                .delete(handlers::projects::delete_milestone),
        )
        .route(
            "/projects/{id}/goals/{goal_id}/toggle",
            post(handlers::projects::toggle_milestone),
        )
        // goals (OKR)
        .route(
            "/goals",
            get(handlers::goals::list).post(handlers::goals::create),
        )
        .route(
            "/goals/{id}",
            get(handlers::goals::detail)
                .put(handlers::goals::update)
                .delete(handlers::goals::delete),
        )
        .route(
            "/goals/{id}/key-results",
            post(handlers::goals::add_key_result),
        )
        .route(
            "/goals/{id}/key-results/{kr_id}",
            axum::routing::put(handlers::goals::update_key_result)
                .delete(handlers::goals::delete_key_result),
        )
        // reviews
        .route(
            "/reviews",
            get(handlers::reviews::list).post(handlers::reviews::create),
        )
        .route("/reviews/today/daily", get(handlers::reviews::today))
        .route(
            "/reviews/{id}",
            get(handlers::reviews::detail)
                .put(handlers::reviews::update)
                .delete(handlers::reviews::delete),
        )
        // dashboard
        .route("/dashboard/stats", get(handlers::dashboard::stats))
        .route_layer(from_extractor_with_state::<RequireKeyAuth, FlowState>(
            state.clone(),
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .with_state(state)
}
