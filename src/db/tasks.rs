use crate::db::models::{Task, TaskPriority, TaskStatus, TaskType};
use crate::db::sqlite::SqlitePool;
use crate::db::{bool_from, bool_to, decode_date, decode_datetime};
use crate::error::FlowError;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

const TASK_SELECT: &str = "SELECT t.id, t.user_id, t.project_id, t.title, t.description, \
     t.task_type, t.status, t.priority, t.due_date, t.scheduled_date, t.scheduled_type, \
     t.completed_at, t.estimated_pomodoros, t.actual_pomodoros, t.is_inbox, t.created_at, \
     p.name AS project_name \
     FROM tasks t LEFT JOIN projects p ON p.id = t.project_id";

/// List filters, mirroring the task board's saved views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskView {
    All,
    Inbox,
    Today,
    Week,
    Overdue,
    Todo,
    Completed,
}

impl TaskView {
    pub fn parse(s: &str) -> Result<Self, FlowError> {
        match s {
            "all" => Ok(Self::All),
            "inbox" => Ok(Self::Inbox),
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "overdue" => Ok(Self::Overdue),
            "todo" => Ok(Self::Todo),
            "completed" => Ok(Self::Completed),
            other => Err(FlowError::InvalidInput(format!("unknown view: {other:?}"))),
        }
    }
}

/// Fully-resolved new task, ready for insertion. Shorthand like
/// `scheduled_type = "tomorrow"` is resolved by the handler before this.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub task_type: TaskType,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_type: Option<String>,
    pub estimated_pomodoros: Option<i64>,
    pub project_id: Option<i64>,
    pub is_inbox: bool,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    pub scheduled_date: Option<NaiveDate>,
    pub estimated_pomodoros: Option<i64>,
    pub actual_pomodoros: Option<i64>,
    pub project_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct TaskStats {
    pub week_completed: i64,
    pub project_stats: Vec<(Option<i64>, i64)>,
    pub priority_stats: Vec<(TaskPriority, i64)>,
}

#[derive(Clone)]
pub struct TaskStore {
    pool: SqlitePool,
}

impl TaskStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: i64, task: &NewTask) -> Result<Task, FlowError> {
        let result = sqlx::query(
            r#"
            INSERT INTO tasks (
                user_id, project_id, title, description, task_type, status,
                priority, due_date, scheduled_date, scheduled_type,
                estimated_pomodoros, is_inbox, created_at
            ) VALUES (?, ?, ?, ?, ?, 'pending', ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(task.project_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.task_type.as_str())
        .bind(task.priority.as_str())
        .bind(task.due_date.map(|d| d.to_string()))
        .bind(task.scheduled_date.map(|d| d.to_string()))
        .bind(&task.scheduled_type)
        .bind(task.estimated_pomodoros)
        .bind(bool_to(task.is_inbox))
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        self.get(user_id, result.last_insert_rowid()).await
    }

    pub async fn get(&self, user_id: i64, id: i64) -> Result<Task, FlowError> {
        let row = sqlx::query(&format!("{TASK_SELECT} WHERE t.id = ? AND t.user_id = ?"))
            .bind(id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(FlowError::not_found_for("task"))?;
        Self::row_to_task(row)
    }

    pub async fn list(
        &self,
        user_id: i64,
        view: TaskView,
        today: NaiveDate,
    ) -> Result<Vec<Task>, FlowError> {
        let week_start = today - chrono::Days::new(today.weekday().num_days_from_monday() as u64);
        let week_end = week_start + chrono::Days::new(6);

        let (condition, date_binds): (&str, Vec<String>) = match view {
            TaskView::All => ("", vec![]),
            TaskView::Inbox => (" AND t.is_inbox = 1 AND t.status != 'completed'", vec![]),
            TaskView::Today => (
                " AND t.status != 'completed' AND t.is_inbox = 0 \
                 AND (t.scheduled_date = ? OR t.due_date = ? \
                      OR (t.due_date IS NOT NULL AND t.due_date < ?))",
                vec![today.to_string(), today.to_string(), today.to_string()],
            ),
            TaskView::Week => (
                " AND t.status != 'completed' AND t.is_inbox = 0 \
                 AND ((t.due_date >= ? AND t.due_date <= ?) \
                      OR (t.scheduled_date >= ? AND t.scheduled_date <= ?))",
                vec![
                    week_start.to_string(),
                    week_end.to_string(),
                    week_start.to_string(),
                    week_end.to_string(),
                ],
            ),
            TaskView::Overdue => (
                " AND t.status != 'completed' AND t.due_date IS NOT NULL AND t.due_date < ?",
                vec![today.to_string()],
            ),
            TaskView::Todo => (" AND t.status != 'completed' AND t.is_inbox = 0", vec![]),
            TaskView::Completed => (" AND t.status = 'completed'", vec![]),
        };

        let sql = format!("{TASK_SELECT} WHERE t.user_id = ?{condition} ORDER BY t.created_at DESC");
        let mut query = sqlx::query(&sql).bind(user_id);
        for bind in date_binds {
            query = query.bind(bind);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_task).collect()
    }

    /// Open tasks scheduled on exactly one date (week-calendar bucket).
    pub async fn scheduled_on(&self, user_id: i64, date: NaiveDate) -> Result<Vec<Task>, FlowError> {
        let rows = sqlx::query(&format!(
            "{TASK_SELECT} WHERE t.user_id = ? AND t.status != 'completed' \
             AND t.is_inbox = 0 AND t.scheduled_date = ? ORDER BY t.created_at"
        ))
        .bind(user_id)
        .bind(date.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_task).collect()
    }

    pub async fn update(
        &self,
        user_id: i64,
        id: i64,
        patch: &TaskPatch,
    ) -> Result<Task, FlowError> {
        let current = self.get(user_id, id).await?;

        let status = patch.status.unwrap_or(current.status);
        // Completion timestamps track status transitions.
        let completed_at = match (current.status, status) {
            (TaskStatus::Completed, TaskStatus::Completed) => current.completed_at,
            (_, TaskStatus::Completed) => Some(Utc::now()),
            _ => None,
        };

        sqlx::query(
            r#"
            UPDATE tasks SET
                title = ?, description = ?, status = ?, priority = ?,
                due_date = ?, scheduled_date = ?, completed_at = ?,
                estimated_pomodoros = ?, actual_pomodoros = ?, project_id = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(patch.title.as_ref().unwrap_or(&current.title))
        .bind(patch.description.as_ref().or(current.description.as_ref()))
        .bind(status.as_str())
        .bind(patch.priority.unwrap_or(current.priority).as_str())
        .bind(patch.due_date.or(current.due_date).map(|d| d.to_string()))
        .bind(
            patch
                .scheduled_date
                .or(current.scheduled_date)
                .map(|d| d.to_string()),
        )
        .bind(completed_at.map(|t| t.to_rfc3339()))
        .bind(patch.estimated_pomodoros.or(current.estimated_pomodoros))
        .bind(patch.actual_pomodoros.or(current.actual_pomodoros))
        .bind(patch.project_id.or(current.project_id))
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        self.get(user_id, id).await
    }

    /// Toggle completion: done tasks revert to pending (clearing the pomodoro
    /// tally), open tasks complete with an optional actual-pomodoro count.
    pub async fn toggle_complete(
        &self,
        user_id: i64,
        id: i64,
        actual_pomodoros: Option<i64>,
    ) -> Result<Task, FlowError> {
        let current = self.get(user_id, id).await?;

        if current.status == TaskStatus::Completed {
            sqlx::query(
                "UPDATE tasks SET status = 'pending', completed_at = NULL, \
                 actual_pomodoros = NULL WHERE id = ? AND user_id = ?",
            )
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        } else {
            sqlx::query(
                "UPDATE tasks SET status = 'completed', completed_at = ?, \
                 actual_pomodoros = COALESCE(?, actual_pomodoros) \
                 WHERE id = ? AND user_id = ?",
            )
            .bind(Utc::now().to_rfc3339())
            .bind(actual_pomodoros)
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        }

        self.get(user_id, id).await
    }

    pub async fn delete(&self, user_id: i64, id: i64) -> Result<(), FlowError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(FlowError::NotFound("task"));
        }
        Ok(())
    }

    // ----- aggregate queries -----

    /// Open, non-inbox tasks relevant today: scheduled today, due today, or
    /// already overdue.
    pub async fn count_open_today(&self, user_id: i64, today: NaiveDate) -> Result<i64, FlowError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM tasks WHERE user_id = ? \
             AND status != 'completed' AND is_inbox = 0 \
             AND (scheduled_date = ? OR due_date = ? \
                  OR (due_date IS NOT NULL AND due_date < ?))",
        )
        .bind(user_id)
        .bind(today.to_string())
        .bind(today.to_string())
        .bind(today.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Tasks scheduled anywhere in [from, to], regardless of status.
    pub async fn count_scheduled_between(
        &self,
        user_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<i64, FlowError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM tasks WHERE user_id = ? \
             AND scheduled_date >= ? AND scheduled_date <= ?",
        )
        .bind(user_id)
        .bind(from.to_string())
        .bind(to.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn count_completed_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<i64, FlowError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM tasks WHERE user_id = ? \
             AND status = 'completed' AND completed_at >= ?",
        )
        .bind(user_id)
        .bind(since.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn stats(&self, user_id: i64, week_start: DateTime<Utc>) -> Result<TaskStats, FlowError> {
        let week_completed = self.count_completed_since(user_id, week_start).await?;

        let project_stats: Vec<(Option<i64>, i64)> = sqlx::query_as(
            "SELECT project_id, COUNT(id) FROM tasks \
             WHERE user_id = ? AND status = 'completed' GROUP BY project_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let priority_rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT priority, COUNT(id) FROM tasks \
             WHERE user_id = ? AND status = 'completed' GROUP BY priority",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        let priority_stats = priority_rows
            .into_iter()
            .map(|(p, count)| Ok((TaskPriority::parse(&p)?, count)))
            .collect::<Result<_, FlowError>>()?;

        Ok(TaskStats {
            week_completed,
            project_stats,
            priority_stats,
        })
    }

    /// (total, completed) counts for one project.
    pub async fn counts_for_project(&self, project_id: i64) -> Result<(i64, i64), FlowError> {
        let (total, completed): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(status = 'completed'), 0) \
             FROM tasks WHERE project_id = ?",
        )
        .bind(project_id)
        .fetch_one(&self.pool)
        .await?;
        Ok((total, completed))
    }

    /// Tasks listed under a project, for the project detail view.
    pub async fn list_for_project(&self, project_id: i64) -> Result<Vec<Task>, FlowError> {
        let rows = sqlx::query(&format!(
            "{TASK_SELECT} WHERE t.project_id = ? ORDER BY t.created_at"
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_task).collect()
    }

    fn row_to_task(row: SqliteRow) -> Result<Task, FlowError> {
        let task_type: String = row.try_get("task_type")?;
        let status: String = row.try_get("status")?;
        let priority: String = row.try_get("priority")?;
        let due_date: Option<String> = row.try_get("due_date")?;
        let scheduled_date: Option<String> = row.try_get("scheduled_date")?;
        let completed_at: Option<String> = row.try_get("completed_at")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Task {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            project_id: row.try_get("project_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            task_type: TaskType::parse(&task_type)?,
            status: TaskStatus::parse(&status)?,
            priority: TaskPriority::parse(&priority)?,
            due_date: due_date.as_deref().map(decode_date).transpose()?,
            scheduled_date: scheduled_date.as_deref().map(decode_date).transpose()?,
            scheduled_type: row.try_get("scheduled_type")?,
            completed_at: completed_at.as_deref().map(decode_datetime).transpose()?,
            estimated_pomodoros: row.try_get("estimated_pomodoros")?,
            actual_pomodoros: row.try_get("actual_pomodoros")?,
            is_inbox: bool_from(row.try_get("is_inbox")?),
            project_name: row.try_get("project_name")?,
            created_at: decode_datetime(&created_at)?,
        })
    }
}
