use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{Value, json};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

const TEST_KEY: &str = "test-key";

struct TestApp {
    app: Router,
    db_path: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.db_path);
    }
}

async fn spawn_app(tag: &str) -> TestApp {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut db_path = std::env::temp_dir();
    db_path.push(format!(
        "lifeflow-{tag}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));

    let database_url = format!("sqlite:{}", db_path.display());
    let pool = lifeflow::db::spawn(&database_url)
        .await
        .expect("failed to open test database");
    let owner_id = lifeflow::bootstrap::run(&pool)
        .await
        .expect("bootstrap failed");

    let state = lifeflow::FlowState::new(pool, owner_id, TEST_KEY.to_string());
    TestApp {
        app: lifeflow::flow_router(state),
        db_path,
    }
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-api-key", TEST_KEY);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let resp = app
        .clone()
        .oneshot(builder.body(body).expect("failed to build request"))
        .await
        .expect("request failed");

    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body was not JSON")
    };
    (status, value)
}

#[tokio::test]
async fn requests_without_key_are_unauthorized() {
    let test = spawn_app("auth").await;

    let resp = test
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/habits")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Health stays open.
    let resp = test
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn bootstrap_seeds_starter_habits() {
    let test = spawn_app("seed").await;

    let (status, body) = send(&test.app, "GET", "/api/habits", None).await;
    assert_eq!(status, StatusCode::OK);
    let habits = body.as_array().expect("habit list");
    assert_eq!(habits.len(), 8);
    assert!(habits.iter().any(|h| h["frequency_type"] == "flexible"));
}

#[tokio::test]
async fn habit_toggle_flips_between_one_and_zero() {
    let test = spawn_app("toggle").await;

    let (status, habit) = send(
        &test.app,
        "POST",
        "/api/habits",
        Some(json!({"name": "stretch", "frequency_type": "daily"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let habit_id = habit["id"].as_i64().expect("habit id");

    let toggle = json!({"habit_id": habit_id, "date": "2024-06-03"});
    let (status, body) = send(&test.app, "POST", "/api/habits/toggle", Some(toggle.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (_, body) = send(&test.app, "POST", "/api/habits/toggle", Some(toggle)).await;
    assert_eq!(body["count"], 0);

    // Explicit counts set the day outright and repeat idempotently.
    for _ in 0..2 {
        let (_, body) = send(
            &test.app,
            "POST",
            "/api/habits/toggle",
            Some(json!({"habit_id": habit_id, "date": "2024-06-03", "count": 3})),
        )
        .await;
        assert_eq!(body["count"], 3);
    }

    // Negative counts are rejected.
    let (status, _) = send(
        &test.app,
        "POST",
        "/api/habits/toggle",
        Some(json!({"habit_id": habit_id, "date": "2024-06-03", "count": -1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_habit_returns_404() {
    let test = spawn_app("missing").await;

    let (status, body) = send(&test.app, "GET", "/api/habits/9999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn invalid_custom_schedule_is_rejected() {
    let test = spawn_app("badmask").await;

    let (status, body) = send(
        &test.app,
        "POST",
        "/api/habits",
        Some(json!({
            "name": "gym",
            "frequency_type": "custom",
            "custom_schedule": [1, 0, 1]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_CONFIGURATION");
}

#[tokio::test]
async fn week_view_reports_rate_for_custom_schedule() {
    let test = spawn_app("week").await;

    // Mon/Wed/Fri habit, checked Monday and Friday of ISO week 23, 2024.
    let (_, habit) = send(
        &test.app,
        "POST",
        "/api/habits",
        Some(json!({
            "name": "run",
            "frequency_type": "custom",
            "custom_schedule": [1, 0, 1, 0, 1, 0, 0]
        })),
    )
    .await;
    let habit_id = habit["id"].as_i64().expect("habit id");

    for date in ["2024-06-03", "2024-06-07"] {
        let (status, _) = send(
            &test.app,
            "POST",
            "/api/habits/toggle",
            Some(json!({"habit_id": habit_id, "date": date})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&test.app, "GET", "/api/habits/week?year=2024&week=23", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["week_dates"][0], "2024-06-03");

    let entry = body["habits"]
        .as_array()
        .expect("habit week list")
        .iter()
        .find(|h| h["id"].as_i64() == Some(habit_id))
        .expect("created habit in week view");
    // 2 of 3 scheduled days checked.
    assert_eq!(entry["weekly_rate"], 67);
    assert_eq!(entry["total_actual"], 2);
    assert_eq!(entry["is_perfect"], false);
}

#[tokio::test]
async fn habit_stats_walks_streak_back_from_today() {
    let test = spawn_app("streak").await;

    let (_, habit) = send(
        &test.app,
        "POST",
        "/api/habits",
        Some(json!({"name": "read", "frequency_type": "daily"})),
    )
    .await;
    let habit_id = habit["id"].as_i64().expect("habit id");

    let today = chrono::Utc::now().date_naive();
    for offset in 0..3u64 {
        let date = today - chrono::Days::new(offset);
        send(
            &test.app,
            "POST",
            "/api/habits/toggle",
            Some(json!({"habit_id": habit_id, "date": date.to_string()})),
        )
        .await;
    }

    let (status, body) = send(
        &test.app,
        "GET",
        &format!("/api/habits/{habit_id}/stats"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_streak"], 3);
    assert_eq!(body["total_checkins"], 3);
}

#[tokio::test]
async fn cumulative_check_increments_count() {
    let test = spawn_app("check").await;

    let (_, habit) = send(
        &test.app,
        "POST",
        "/api/habits",
        Some(json!({"name": "water", "frequency_type": "daily", "times_per_day": 3})),
    )
    .await;
    let habit_id = habit["id"].as_i64().expect("habit id");

    let uri = format!("/api/habits/{habit_id}/check");
    let (status, log) = send(&test.app, "POST", &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(log["count"], 1);

    let (_, log) = send(&test.app, "POST", &uri, Some(json!({"note": "second"}))).await;
    assert_eq!(log["count"], 2);
    assert_eq!(log["note"], "second");

    // Two of three per day is not yet complete.
    let (_, body) = send(&test.app, "GET", "/api/habits/today/check", None).await;
    let status_entry = body
        .as_array()
        .expect("today list")
        .iter()
        .find(|h| h["id"].as_i64() == Some(habit_id))
        .expect("habit in today list");
    assert_eq!(status_entry["today_count"], 2);
    assert_eq!(status_entry["is_completed_today"], false);

    // Stats sum the per-day tallies, not the number of checked days.
    let (_, stats) = send(
        &test.app,
        "GET",
        &format!("/api/habits/{habit_id}/stats"),
        None,
    )
    .await;
    assert_eq!(stats["total_checkins"], 2);
    assert_eq!(stats["recent_logs"].as_array().expect("recent logs").len(), 1);
}

#[tokio::test]
async fn task_lifecycle_and_inbox_rules() {
    let test = spawn_app("tasks").await;

    // No dates at all lands in the inbox.
    let (status, task) = send(
        &test.app,
        "POST",
        "/api/tasks",
        Some(json!({"title": "sort desk"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["is_inbox"], true);
    assert_eq!(task["status"], "pending");
    assert_eq!(task["priority"], 2);

    // Scheduling shorthand resolves to a date and skips the inbox.
    let (_, scheduled) = send(
        &test.app,
        "POST",
        "/api/tasks",
        Some(json!({"title": "write report", "scheduled_type": "today", "priority": 4})),
    )
    .await;
    assert_eq!(scheduled["is_inbox"], false);
    assert_eq!(scheduled["priority"], 4);

    // The week/month/year shorthands land relative to today.
    let today = chrono::Utc::now().date_naive();
    let (status, next_week) = send(
        &test.app,
        "POST",
        "/api/tasks",
        Some(json!({"title": "plan sprint", "scheduled_type": "week"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        next_week["scheduled_date"],
        (today + chrono::Days::new(7)).to_string()
    );

    // A shorthand overrides an explicit date.
    let (_, overridden) = send(
        &test.app,
        "POST",
        "/api/tasks",
        Some(json!({
            "title": "follow up",
            "scheduled_date": "2030-01-01",
            "scheduled_type": "today"
        })),
    )
    .await;
    assert_eq!(overridden["scheduled_date"], today.to_string());
    let scheduled_id = scheduled["id"].as_i64().expect("task id");

    let (_, body) = send(&test.app, "GET", "/api/tasks?view=today", None).await;
    let today_ids: Vec<i64> = body
        .as_array()
        .expect("task list")
        .iter()
        .filter_map(|t| t["id"].as_i64())
        .collect();
    assert!(today_ids.contains(&scheduled_id));

    // Complete, then un-complete.
    let complete_uri = format!("/api/tasks/{scheduled_id}/complete");
    let (_, done) = send(&test.app, "POST", &complete_uri, Some(json!({}))).await;
    assert_eq!(done["status"], "completed");
    assert!(done["completed_at"].is_string());

    let (_, reopened) = send(&test.app, "POST", &complete_uri, Some(json!({}))).await;
    assert_eq!(reopened["status"], "pending");
    assert!(reopened["completed_at"].is_null());

    let (status, _) = send(
        &test.app,
        "DELETE",
        &format!("/api/tasks/{scheduled_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn project_progress_follows_milestones() {
    let test = spawn_app("projects").await;

    let (status, project) = send(
        &test.app,
        "POST",
        "/api/projects",
        Some(json!({"name": "site redesign"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let project_id = project["id"].as_i64().expect("project id");

    let goals_uri = format!("/api/projects/{project_id}/goals");
    let (_, first) = send(&test.app, "POST", &goals_uri, Some(json!({"title": "wireframes"}))).await;
    let (_, _second) = send(&test.app, "POST", &goals_uri, Some(json!({"title": "launch"}))).await;
    let first_id = first["id"].as_i64().expect("milestone id");

    let (_, toggled) = send(
        &test.app,
        "POST",
        &format!("/api/projects/{project_id}/goals/{first_id}/toggle"),
        None,
    )
    .await;
    assert_eq!(toggled["is_completed"], true);

    let (_, detail) = send(&test.app, "GET", &format!("/api/projects/{project_id}"), None).await;
    assert_eq!(detail["progress"], 50.0);
    assert_eq!(detail["goals"].as_array().expect("milestones").len(), 2);
}

#[tokio::test]
async fn goal_key_result_completion_follows_values() {
    let test = spawn_app("goals").await;

    let (status, goal) = send(
        &test.app,
        "POST",
        "/api/goals",
        Some(json!({
            "title": "read more",
            "period": "year",
            "year": 2026,
            "key_results": [{"title": "books finished", "target_value": 12.0}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let goal_id = goal["id"].as_i64().expect("goal id");
    let kr = &goal["key_results"][0];
    assert_eq!(kr["is_completed"], false);
    let kr_id = kr["id"].as_i64().expect("key result id");

    let (_, updated) = send(
        &test.app,
        "PUT",
        &format!("/api/goals/{goal_id}/key-results/{kr_id}"),
        Some(json!({"current_value": 12.0})),
    )
    .await;
    assert_eq!(updated["is_completed"], true);
}

#[tokio::test]
async fn daily_review_roundtrip() {
    let test = spawn_app("reviews").await;

    let (_, body) = send(&test.app, "GET", "/api/reviews/today/daily", None).await;
    assert_eq!(body["exists"], false);

    let today = chrono::Utc::now().date_naive();
    let (status, review) = send(
        &test.app,
        "POST",
        "/api/reviews",
        Some(json!({
            "period": "daily",
            "year": 2026,
            "date": today.to_string(),
            "highlights": "shipped the release",
            "mood": 8
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(review["mood"], 8);

    let (_, body) = send(&test.app, "GET", "/api/reviews/today/daily", None).await;
    assert_eq!(body["exists"], true);
    assert_eq!(body["review"]["highlights"], "shipped the release");

    // Mood is a 1-10 scale.
    let (status, _) = send(
        &test.app,
        "POST",
        "/api/reviews",
        Some(json!({"period": "daily", "year": 2026, "mood": 11})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dashboard_reports_today_and_heatmap() {
    let test = spawn_app("dashboard").await;

    // One task scheduled today, one unscheduled inbox task.
    send(
        &test.app,
        "POST",
        "/api/tasks",
        Some(json!({"title": "review notes", "scheduled_type": "today"})),
    )
    .await;
    send(
        &test.app,
        "POST",
        "/api/tasks",
        Some(json!({"title": "someday maybe"})),
    )
    .await;

    let (status, body) = send(&test.app, "GET", "/api/dashboard/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["today"]["total_habits"], 8);
    assert_eq!(body["overview"]["active_habits"], 8);
    // Week totals follow scheduled dates, so the inbox task stays out.
    assert_eq!(body["overview"]["week_tasks_total"], 1);
    assert_eq!(body["today"]["tasks_count"], 1);
    assert_eq!(body["heatmap"].as_array().expect("heatmap").len(), 7);
}
