use crate::db::models::{Goal, GoalPeriod, GoalStatus, KeyResult};
use crate::db::sqlite::SqlitePool;
use crate::db::{bool_from, bool_to, decode_datetime};
use crate::error::FlowError;
use chrono::Utc;
use serde::Deserialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

const GOAL_COLUMNS: &str = "id, user_id, title, description, period, year, quarter, \
     month, area, status, progress, project_id, created_at";

const KEY_RESULT_COLUMNS: &str =
    "id, goal_id, title, target_value, current_value, unit, is_completed, created_at";

#[derive(Debug, Clone, Deserialize)]
pub struct GoalDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub period: GoalPeriod,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub quarter: Option<i64>,
    #[serde(default)]
    pub month: Option<i64>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub key_results: Vec<KeyResultDraft>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeyResultDraft {
    pub title: String,
    pub target_value: f64,
    #[serde(default)]
    pub current_value: f64,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoalPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub period: Option<GoalPeriod>,
    pub year: Option<i64>,
    pub quarter: Option<i64>,
    pub month: Option<i64>,
    pub area: Option<String>,
    pub status: Option<GoalStatus>,
    pub progress: Option<f64>,
    pub project_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyResultPatch {
    pub title: Option<String>,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    pub unit: Option<String>,
}

#[derive(Clone)]
pub struct GoalStore {
    pool: SqlitePool,
}

impl GoalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: i64, draft: &GoalDraft) -> Result<Goal, FlowError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO goals (
                user_id, title, description, period, year, quarter, month,
                area, status, progress, project_id, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'active', 0.0, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.period.as_str())
        .bind(draft.year)
        .bind(draft.quarter)
        .bind(draft.month)
        .bind(&draft.area)
        .bind(draft.project_id)
        .bind(&now)
        .execute(&mut *tx)
        .await?;
        let goal_id = result.last_insert_rowid();

        for kr in &draft.key_results {
            sqlx::query(
                "INSERT INTO key_results (goal_id, title, target_value, current_value, \
                 unit, is_completed, created_at) VALUES (?, ?, ?, ?, ?, 0, ?)",
            )
            .bind(goal_id)
            .bind(&kr.title)
            .bind(kr.target_value)
            .bind(kr.current_value)
            .bind(&kr.unit)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        self.get(user_id, goal_id).await
    }

    pub async fn get(&self, user_id: i64, id: i64) -> Result<Goal, FlowError> {
        let row = sqlx::query(&format!(
            "SELECT {GOAL_COLUMNS} FROM goals WHERE id = ? AND user_id = ?"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(FlowError::not_found_for("goal"))?;

        let mut goal = Self::row_to_goal(row)?;
        goal.key_results = self.list_key_results(goal.id).await?;
        Ok(goal)
    }

    pub async fn list(
        &self,
        user_id: i64,
        period: Option<GoalPeriod>,
        year: Option<i64>,
    ) -> Result<Vec<Goal>, FlowError> {
        let mut sql = format!("SELECT {GOAL_COLUMNS} FROM goals WHERE user_id = ?");
        if period.is_some() {
            sql.push_str(" AND period = ?");
        }
        if year.is_some() {
            sql.push_str(" AND year = ?");
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = sqlx::query(&sql).bind(user_id);
        if let Some(p) = period {
            query = query.bind(p.as_str());
        }
        if let Some(y) = year {
            query = query.bind(y);
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut goals = Vec::with_capacity(rows.len());
        for row in rows {
            let mut goal = Self::row_to_goal(row)?;
            goal.key_results = self.list_key_results(goal.id).await?;
            goals.push(goal);
        }
        Ok(goals)
    }

    pub async fn update(
        &self,
        user_id: i64,
        id: i64,
        patch: &GoalPatch,
    ) -> Result<Goal, FlowError> {
        let current = self.get(user_id, id).await?;

        sqlx::query(
            r#"
            UPDATE goals SET
                title = ?, description = ?, period = ?, year = ?, quarter = ?,
                month = ?, area = ?, status = ?, progress = ?, project_id = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(patch.title.as_ref().unwrap_or(&current.title))
        .bind(patch.description.as_ref().or(current.description.as_ref()))
        .bind(patch.period.unwrap_or(current.period).as_str())
        .bind(patch.year.or(current.year))
        .bind(patch.quarter.or(current.quarter))
        .bind(patch.month.or(current.month))
        .bind(patch.area.as_ref().or(current.area.as_ref()))
        .bind(patch.status.unwrap_or(current.status).as_str())
        .bind(patch.progress.unwrap_or(current.progress))
        .bind(patch.project_id.or(current.project_id))
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        self.get(user_id, id).await
    }

    pub async fn delete(&self, user_id: i64, id: i64) -> Result<(), FlowError> {
        let result = sqlx::query("DELETE FROM goals WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(FlowError::NotFound("goal"));
        }
        Ok(())
    }

    pub async fn count_active(&self, user_id: i64) -> Result<i64, FlowError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM goals WHERE user_id = ? AND status = 'active'")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    // ----- key results -----

    pub async fn list_key_results(&self, goal_id: i64) -> Result<Vec<KeyResult>, FlowError> {
        let rows = sqlx::query(&format!(
            "SELECT {KEY_RESULT_COLUMNS} FROM key_results WHERE goal_id = ? ORDER BY id"
        ))
        .bind(goal_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_key_result).collect()
    }

    pub async fn add_key_result(
        &self,
        goal_id: i64,
        draft: &KeyResultDraft,
    ) -> Result<KeyResult, FlowError> {
        let result = sqlx::query(
            "INSERT INTO key_results (goal_id, title, target_value, current_value, \
             unit, is_completed, created_at) VALUES (?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(goal_id)
        .bind(&draft.title)
        .bind(draft.target_value)
        .bind(draft.current_value)
        .bind(&draft.unit)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        self.get_key_result(goal_id, result.last_insert_rowid())
            .await
    }

    pub async fn get_key_result(&self, goal_id: i64, id: i64) -> Result<KeyResult, FlowError> {
        let row = sqlx::query(&format!(
            "SELECT {KEY_RESULT_COLUMNS} FROM key_results WHERE id = ? AND goal_id = ?"
        ))
        .bind(id)
        .bind(goal_id)
        .fetch_one(&self.pool)
        .await
        .map_err(FlowError::not_found_for("key result"))?;
        Self::row_to_key_result(row)
    }

    /// Updating `current_value` past the target flips completion automatically.
    pub async fn update_key_result(
        &self,
        goal_id: i64,
        id: i64,
        patch: &KeyResultPatch,
    ) -> Result<KeyResult, FlowError> {
        let current = self.get_key_result(goal_id, id).await?;

        let target_value = patch.target_value.unwrap_or(current.target_value);
        let current_value = patch.current_value.unwrap_or(current.current_value);
        let is_completed = current_value >= target_value && target_value > 0.0;

        sqlx::query(
            "UPDATE key_results SET title = ?, target_value = ?, current_value = ?, \
             unit = ?, is_completed = ? WHERE id = ? AND goal_id = ?",
        )
        .bind(patch.title.as_ref().unwrap_or(&current.title))
        .bind(target_value)
        .bind(current_value)
        .bind(patch.unit.as_ref().or(current.unit.as_ref()))
        .bind(bool_to(is_completed))
        .bind(id)
        .bind(goal_id)
        .execute(&self.pool)
        .await?;

        self.get_key_result(goal_id, id).await
    }

    pub async fn delete_key_result(&self, goal_id: i64, id: i64) -> Result<(), FlowError> {
        let result = sqlx::query("DELETE FROM key_results WHERE id = ? AND goal_id = ?")
            .bind(id)
            .bind(goal_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(FlowError::NotFound("key result"));
        }
        Ok(())
    }

    fn row_to_goal(row: SqliteRow) -> Result<Goal, FlowError> {
        let period: String = row.try_get("period")?;
        let status: String = row.try_get("status")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Goal {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            period: GoalPeriod::parse(&period)?,
            year: row.try_get("year")?,
            quarter: row.try_get("quarter")?,
            month: row.try_get("month")?,
            area: row.try_get("area")?,
            status: GoalStatus::parse(&status)?,
            progress: row.try_get("progress")?,
            project_id: row.try_get("project_id")?,
            created_at: decode_datetime(&created_at)?,
            key_results: Vec::new(),
        })
    }

    fn row_to_key_result(row: SqliteRow) -> Result<KeyResult, FlowError> {
        let created_at: String = row.try_get("created_at")?;

        Ok(KeyResult {
            id: row.try_get("id")?,
            goal_id: row.try_get("goal_id")?,
            title: row.try_get("title")?,
            target_value: row.try_get("target_value")?,
            current_value: row.try_get("current_value")?,
            unit: row.try_get("unit")?,
            is_completed: bool_from(row.try_get("is_completed")?),
            created_at: decode_datetime(&created_at)?,
        })
    }
}
