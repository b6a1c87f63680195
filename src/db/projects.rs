use crate::db::models::{Project, ProjectGoal, ProjectStatus};
use crate::db::sqlite::SqlitePool;
use crate::db::{bool_from, bool_to, decode_date, decode_datetime};
use crate::error::FlowError;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

const PROJECT_COLUMNS: &str = "id, user_id, name, description, status, start_date, \
     target_date, completed_date, progress, outline, created_at";

const MILESTONE_COLUMNS: &str =
    "id, project_id, user_id, title, description, is_completed, completed_at, sort_order, created_at";

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub outline: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<NaiveDate>,
    pub target_date: Option<NaiveDate>,
    pub outline: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MilestoneDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MilestonePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
    pub sort_order: Option<i64>,
}

#[derive(Clone)]
pub struct ProjectStore {
    pool: SqlitePool,
}

impl ProjectStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: i64, draft: &ProjectDraft) -> Result<Project, FlowError> {
        let result = sqlx::query(
            r#"
            INSERT INTO projects (
                user_id, name, description, status, start_date, target_date,
                progress, outline, created_at
            ) VALUES (?, ?, ?, 'active', ?, ?, 0.0, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.start_date.map(|d| d.to_string()))
        .bind(draft.target_date.map(|d| d.to_string()))
        .bind(&draft.outline)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        self.get(user_id, result.last_insert_rowid()).await
    }

    pub async fn get(&self, user_id: i64, id: i64) -> Result<Project, FlowError> {
        let row = sqlx::query(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ? AND user_id = ?"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(FlowError::not_found_for("project"))?;
        Self::row_to_project(row)
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<Project>, FlowError> {
        let rows = sqlx::query(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE user_id = ? ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_project).collect()
    }

    pub async fn update(
        &self,
        user_id: i64,
        id: i64,
        patch: &ProjectPatch,
    ) -> Result<Project, FlowError> {
        let current = self.get(user_id, id).await?;

        let status = patch.status.unwrap_or(current.status);
        // Moving into completed stamps the completion date once.
        let completed_date = match (status, current.completed_date) {
            (ProjectStatus::Completed, None) => Some(Utc::now().date_naive()),
            (_, existing) => existing,
        };

        sqlx::query(
            r#"
            UPDATE projects SET
                name = ?, description = ?, status = ?, start_date = ?,
                target_date = ?, completed_date = ?, outline = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(patch.name.as_ref().unwrap_or(&current.name))
        .bind(patch.description.as_ref().or(current.description.as_ref()))
        .bind(status.as_str())
        .bind(patch.start_date.or(current.start_date).map(|d| d.to_string()))
        .bind(
            patch
                .target_date
                .or(current.target_date)
                .map(|d| d.to_string()),
        )
        .bind(completed_date.map(|d| d.to_string()))
        .bind(patch.outline.as_ref().or(current.outline.as_ref()))
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        self.get(user_id, id).await
    }

    /// Remove a project. Its tasks are detached (kept, project unset) while
    /// milestones go with it via FK cascade.
    pub async fn delete(&self, user_id: i64, id: i64) -> Result<(), FlowError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE tasks SET project_id = NULL WHERE project_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM projects WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(FlowError::NotFound("project"));
        }

        tx.commit().await?;
        Ok(())
    }

    // ----- milestones -----

    pub async fn list_milestones(&self, project_id: i64) -> Result<Vec<ProjectGoal>, FlowError> {
        let rows = sqlx::query(&format!(
            "SELECT {MILESTONE_COLUMNS} FROM project_goals \
             WHERE project_id = ? ORDER BY sort_order, created_at"
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_milestone).collect()
    }

    pub async fn create_milestone(
        &self,
        user_id: i64,
        project_id: i64,
        draft: &MilestoneDraft,
    ) -> Result<ProjectGoal, FlowError> {
        let result = sqlx::query(
            r#"
            INSERT INTO project_goals (
                project_id, user_id, title, description, is_completed,
                sort_order, created_at
            ) VALUES (?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.sort_order)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        self.get_milestone(project_id, result.last_insert_rowid())
            .await
    }

    pub async fn get_milestone(
        &self,
        project_id: i64,
        id: i64,
    ) -> Result<ProjectGoal, FlowError> {
        let row = sqlx::query(&format!(
            "SELECT {MILESTONE_COLUMNS} FROM project_goals WHERE id = ? AND project_id = ?"
        ))
        .bind(id)
        .bind(project_id)
        .fetch_one(&self.pool)
        .await
        .map_err(FlowError::not_found_for("milestone"))?;
        Self::row_to_milestone(row)
    }

    pub async fn update_milestone(
        &self,
        project_id: i64,
        id: i64,
        patch: &MilestonePatch,
    ) -> Result<ProjectGoal, FlowError> {
        let current = self.get_milestone(project_id, id).await?;

        let is_completed = patch.is_completed.unwrap_or(current.is_completed);
        let completed_at = match (patch.is_completed, current.is_completed) {
            (Some(true), false) => Some(Utc::now()),
            (Some(false), _) => None,
            _ => current.completed_at,
        };

        sqlx::query(
            "UPDATE project_goals SET title = ?, description = ?, is_completed = ?, \
             completed_at = ?, sort_order = ? WHERE id = ? AND project_id = ?",
        )
        .bind(patch.title.as_ref().unwrap_or(&current.title))
        .bind(patch.description.as_ref().or(current.description.as_ref()))
        .bind(bool_to(is_completed))
        .bind(completed_at.map(|t| t.to_rfc3339()))
        .bind(patch.sort_order.unwrap_or(current.sort_order))
        .bind(id)
        .bind(project_id)
        .execute(&self.pool)
        .await?;

        self.get_milestone(project_id, id).await
    }

    pub async fn toggle_milestone(
        &self,
        project_id: i64,
        id: i64,
    ) -> Result<ProjectGoal, FlowError> {
        let current = self.get_milestone(project_id, id).await?;
        let now_completed = !current.is_completed;

        sqlx::query(
            "UPDATE project_goals SET is_completed = ?, completed_at = ? \
             WHERE id = ? AND project_id = ?",
        )
        .bind(bool_to(now_completed))
        .bind(now_completed.then(|| Utc::now().to_rfc3339()))
        .bind(id)
        .bind(project_id)
        .execute(&self.pool)
        .await?;

        self.get_milestone(project_id, id).await
    }

    pub async fn delete_milestone(&self, project_id: i64, id: i64) -> Result<(), FlowError> {
        let result = sqlx::query("DELETE FROM project_goals WHERE id = ? AND project_id = ?")
            .bind(id)
            .bind(project_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(FlowError::NotFound("milestone"));
        }
        Ok(())
    }

    /// Recompute a project's progress: the share of completed milestones, or
    /// of completed tasks when the project has no milestones yet.
    pub async fn recompute_progress(&self, project_id: i64) -> Result<f64, FlowError> {
        let (milestone_total, milestone_done): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(is_completed), 0) \
             FROM project_goals WHERE project_id = ?",
        )
        .bind(project_id)
        .fetch_one(&self.pool)
        .await?;

        let progress = if milestone_total > 0 {
            milestone_done as f64 / milestone_total as f64 * 100.0
        } else {
            let (task_total, task_done): (i64, i64) = sqlx::query_as(
                "SELECT COUNT(*), COALESCE(SUM(status = 'completed'), 0) \
                 FROM tasks WHERE project_id = ?",
            )
            .bind(project_id)
            .fetch_one(&self.pool)
            .await?;
            if task_total > 0 {
                (task_done as f64 / task_total as f64 * 1000.0).round() / 10.0
            } else {
                0.0
            }
        };

        sqlx::query("UPDATE projects SET progress = ? WHERE id = ?")
            .bind(progress)
            .bind(project_id)
            .execute(&self.pool)
            .await?;
        Ok(progress)
    }

    fn row_to_project(row: SqliteRow) -> Result<Project, FlowError> {
        let status: String = row.try_get("status")?;
        let start_date: Option<String> = row.try_get("start_date")?;
        let target_date: Option<String> = row.try_get("target_date")?;
        let completed_date: Option<String> = row.try_get("completed_date")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Project {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            status: ProjectStatus::parse(&status)?,
            start_date: start_date.as_deref().map(decode_date).transpose()?,
            target_date: target_date.as_deref().map(decode_date).transpose()?,
            completed_date: completed_date.as_deref().map(decode_date).transpose()?,
            progress: row.try_get("progress")?,
            outline: row.try_get("outline")?,
            created_at: decode_datetime(&created_at)?,
        })
    }

    fn row_to_milestone(row: SqliteRow) -> Result<ProjectGoal, FlowError> {
        let completed_at: Option<String> = row.try_get("completed_at")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(ProjectGoal {
            id: row.try_get("id")?,
            project_id: row.try_get("project_id")?,
            user_id: row.try_get("user_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            is_completed: bool_from(row.try_get("is_completed")?),
            completed_at: completed_at.as_deref().map(decode_datetime).transpose()?,
            sort_order: row.try_get("sort_order")?,
            created_at: decode_datetime(&created_at)?,
        })
    }
}
