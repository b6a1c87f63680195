use crate::db::models::{FrequencyType, Habit, HabitLog};
use crate::db::sqlite::SqlitePool;
use crate::db::{bool_from, bool_to, decode_date, decode_datetime};
use crate::error::FlowError;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::collections::HashMap;

const HABIT_COLUMNS: &str = "id, user_id, name, description, icon, color, frequency_type, \
     weekly_target, times_per_day, custom_schedule, allow_overflow, \
     is_active, is_archived, archived_at, sort_order, created_at";

const LOG_COLUMNS: &str = "id, habit_id, user_id, date, count, note, created_at";

/// Write-side habit fields, shared by create and update.
#[derive(Debug, Clone, Deserialize)]
pub struct HabitDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_icon")]
    pub icon: Option<String>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_frequency")]
    pub frequency_type: FrequencyType,
    #[serde(default = "default_weekly_target")]
    pub weekly_target: i64,
    #[serde(default = "default_times_per_day")]
    pub times_per_day: i64,
    #[serde(default)]
    pub custom_schedule: Option<Vec<i64>>,
    #[serde(default)]
    pub allow_overflow: bool,
    #[serde(default)]
    pub sort_order: i64,
}

fn default_icon() -> Option<String> {
    Some("✅".to_string())
}

fn default_color() -> String {
    "#3B82F6".to_string()
}

fn default_frequency() -> FrequencyType {
    FrequencyType::Daily
}

fn default_weekly_target() -> i64 {
    7
}

fn default_times_per_day() -> i64 {
    1
}

impl HabitDraft {
    pub fn validate(&self) -> Result<(), FlowError> {
        if self.name.trim().is_empty() {
            return Err(FlowError::InvalidInput("name must not be empty".into()));
        }
        if self.times_per_day < 1 {
            return Err(FlowError::InvalidInput(
                "times_per_day must be at least 1".into(),
            ));
        }
        if self.weekly_target < 0 {
            return Err(FlowError::InvalidInput(
                "weekly_target must not be negative".into(),
            ));
        }
        if let Some(mask) = &self.custom_schedule {
            if mask.len() != 7 {
                return Err(FlowError::InvalidConfiguration(format!(
                    "custom_schedule must have exactly 7 entries, got {}",
                    mask.len()
                )));
            }
            if mask.iter().any(|&slot| slot < 0) {
                return Err(FlowError::InvalidConfiguration(
                    "custom_schedule entries must be 0 or positive".into(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct HabitStore {
    pool: SqlitePool,
}

impl HabitStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: i64, draft: &HabitDraft) -> Result<Habit, FlowError> {
        draft.validate()?;
        let mask_json = draft
            .custom_schedule
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let result = sqlx::query(
            r#"
            INSERT INTO habits (
                user_id, name, description, icon, color, frequency_type,
                weekly_target, times_per_day, custom_schedule, allow_overflow,
                is_active, is_archived, sort_order, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, 0, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(&draft.icon)
        .bind(&draft.color)
        .bind(draft.frequency_type.as_str())
        .bind(draft.weekly_target)
        .bind(draft.times_per_day)
        .bind(mask_json)
        .bind(bool_to(draft.allow_overflow))
        .bind(draft.sort_order)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        self.get(user_id, result.last_insert_rowid()).await
    }

    pub async fn update(
        &self,
        user_id: i64,
        id: i64,
        draft: &HabitDraft,
    ) -> Result<Habit, FlowError> {
        draft.validate()?;
        let mask_json = draft
            .custom_schedule
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let result = sqlx::query(
            r#"
            UPDATE habits SET
                name = ?,
                description = ?,
                icon = ?,
                color = ?,
                frequency_type = ?,
                weekly_target = ?,
                times_per_day = ?,
                custom_schedule = ?,
                allow_overflow = ?,
                sort_order = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(&draft.icon)
        .bind(&draft.color)
        .bind(draft.frequency_type.as_str())
        .bind(draft.weekly_target)
        .bind(draft.times_per_day)
        .bind(mask_json)
        .bind(bool_to(draft.allow_overflow))
        .bind(draft.sort_order)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(FlowError::NotFound("habit"));
        }
        self.get(user_id, id).await
    }

    pub async fn get(&self, user_id: i64, id: i64) -> Result<Habit, FlowError> {
        let row = sqlx::query(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits WHERE id = ? AND user_id = ?"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(FlowError::not_found_for("habit"))?;
        Self::row_to_habit(row)
    }

    /// Non-archived habits ordered by sort_order, optionally filtered by
    /// active state.
    pub async fn list(
        &self,
        user_id: i64,
        is_active: Option<bool>,
    ) -> Result<Vec<Habit>, FlowError> {
        let rows = match is_active {
            Some(active) => {
                sqlx::query(&format!(
                    "SELECT {HABIT_COLUMNS} FROM habits \
                     WHERE user_id = ? AND is_archived = 0 AND is_active = ? \
                     ORDER BY sort_order, id"
                ))
                .bind(user_id)
                .bind(bool_to(active))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {HABIT_COLUMNS} FROM habits \
                     WHERE user_id = ? AND is_archived = 0 \
                     ORDER BY sort_order, id"
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows.into_iter().map(Self::row_to_habit).collect()
    }

    pub async fn count_active(&self, user_id: i64) -> Result<i64, FlowError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM habits \
             WHERE user_id = ? AND is_active = 1 AND is_archived = 0",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Total habits ever created for a user, archived included.
    pub async fn count_all(&self, user_id: i64) -> Result<i64, FlowError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM habits WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn archive(&self, user_id: i64, id: i64) -> Result<Habit, FlowError> {
        let result = sqlx::query(
            "UPDATE habits SET is_archived = 1, is_active = 0, archived_at = ? \
             WHERE id = ? AND user_id = ?",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(FlowError::NotFound("habit"));
        }

        let row = sqlx::query(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits WHERE id = ? AND user_id = ?"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Self::row_to_habit(row)
    }

    /// Hard delete; check-ins go with it (FK cascade).
    pub async fn delete(&self, user_id: i64, id: i64) -> Result<(), FlowError> {
        let result = sqlx::query("DELETE FROM habits WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(FlowError::NotFound("habit"));
        }
        Ok(())
    }

    // ----- check-in ledger -----

    /// Toggle semantics: an explicit count sets the row outright (0 undoes a
    /// check-in); without one, an existing positive count flips to 0 and
    /// anything else becomes 1. Returns the resulting count.
    pub async fn toggle_check_in(
        &self,
        habit: &Habit,
        date: NaiveDate,
        explicit_count: Option<i64>,
    ) -> Result<i64, FlowError> {
        if let Some(count) = explicit_count
            && count < 0
        {
            return Err(FlowError::InvalidInput(
                "count must not be negative".into(),
            ));
        }

        let existing: Option<(i64,)> =
            sqlx::query_as("SELECT count FROM habit_logs WHERE habit_id = ? AND date = ?")
                .bind(habit.id)
                .bind(date.to_string())
                .fetch_optional(&self.pool)
                .await?;

        let new_count = match explicit_count {
            Some(count) => count,
            None => match existing {
                Some((count,)) if count > 0 => 0,
                _ => 1,
            },
        };

        sqlx::query(
            r#"
            INSERT INTO habit_logs (habit_id, user_id, date, count, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(habit_id, date) DO UPDATE SET count = excluded.count
            "#,
        )
        .bind(habit.id)
        .bind(habit.user_id)
        .bind(date.to_string())
        .bind(new_count)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(new_count)
    }

    /// Cumulative tally: bumps an existing day's count by one, or creates the
    /// row with count 1. A note, when given, replaces the stored one.
    pub async fn increment_check_in(
        &self,
        habit: &Habit,
        date: NaiveDate,
        note: Option<&str>,
    ) -> Result<HabitLog, FlowError> {
        sqlx::query(
            r#"
            INSERT INTO habit_logs (habit_id, user_id, date, count, note, created_at)
            VALUES (?, ?, ?, 1, ?, ?)
            ON CONFLICT(habit_id, date) DO UPDATE SET
                count = habit_logs.count + 1,
                note = COALESCE(excluded.note, habit_logs.note)
            "#,
        )
        .bind(habit.id)
        .bind(habit.user_id)
        .bind(date.to_string())
        .bind(note)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query(&format!(
            "SELECT {LOG_COLUMNS} FROM habit_logs WHERE habit_id = ? AND date = ?"
        ))
        .bind(habit.id)
        .bind(date.to_string())
        .fetch_one(&self.pool)
        .await?;
        Self::row_to_log(row)
    }

    pub async fn get_log(
        &self,
        habit_id: i64,
        date: NaiveDate,
    ) -> Result<Option<HabitLog>, FlowError> {
        let row = sqlx::query(&format!(
            "SELECT {LOG_COLUMNS} FROM habit_logs WHERE habit_id = ? AND date = ?"
        ))
        .bind(habit_id)
        .bind(date.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_log).transpose()
    }

    /// Logs within [from, to], newest first.
    pub async fn list_logs_between(
        &self,
        habit_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<HabitLog>, FlowError> {
        let rows = sqlx::query(&format!(
            "SELECT {LOG_COLUMNS} FROM habit_logs \
             WHERE habit_id = ? AND date >= ? AND date <= ? \
             ORDER BY date DESC"
        ))
        .bind(habit_id)
        .bind(from.to_string())
        .bind(to.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_log).collect()
    }

    /// Per-date counts within [from, to].
    pub async fn counts_between(
        &self,
        habit_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<HashMap<NaiveDate, i64>, FlowError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT date, count FROM habit_logs \
             WHERE habit_id = ? AND date >= ? AND date <= ?",
        )
        .bind(habit_id)
        .bind(from.to_string())
        .bind(to.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(date, count)| Ok((decode_date(&date)?, count)))
            .collect()
    }

    /// Every per-date count for a habit; the streak walk is bounded only by
    /// the earliest record.
    pub async fn counts_all(&self, habit_id: i64) -> Result<HashMap<NaiveDate, i64>, FlowError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT date, count FROM habit_logs WHERE habit_id = ?")
                .bind(habit_id)
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter()
            .map(|(date, count)| Ok((decode_date(&date)?, count)))
            .collect()
    }

    /// Sum of all check-in counts for one user on one date (heatmap cell).
    pub async fn total_count_on(&self, user_id: i64, date: NaiveDate) -> Result<i64, FlowError> {
        let (total,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(count), 0) FROM habit_logs WHERE user_id = ? AND date = ?",
        )
        .bind(user_id)
        .bind(date.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    fn row_to_habit(row: SqliteRow) -> Result<Habit, FlowError> {
        let frequency: String = row.try_get("frequency_type")?;
        let mask_json: Option<String> = row.try_get("custom_schedule")?;
        let custom_schedule: Option<Vec<i64>> = match mask_json {
            Some(s) => Some(serde_json::from_str(&s).map_err(|e| sqlx::Error::Decode(Box::new(e)))?),
            None => None,
        };
        let archived_at: Option<String> = row.try_get("archived_at")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Habit {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            icon: row.try_get("icon")?,
            color: row.try_get("color")?,
            frequency_type: FrequencyType::parse(&frequency)?,
            weekly_target: row.try_get("weekly_target")?,
            times_per_day: row.try_get("times_per_day")?,
            custom_schedule,
            allow_overflow: bool_from(row.try_get("allow_overflow")?),
            is_active: bool_from(row.try_get("is_active")?),
            is_archived: bool_from(row.try_get("is_archived")?),
            archived_at: archived_at.as_deref().map(decode_datetime).transpose()?,
            sort_order: row.try_get("sort_order")?,
            created_at: decode_datetime(&created_at)?,
        })
    }

    fn row_to_log(row: SqliteRow) -> Result<HabitLog, FlowError> {
        let date: String = row.try_get("date")?;
        let created_at: String = row.try_get("created_at")?;
        Ok(HabitLog {
            id: row.try_get("id")?,
            habit_id: row.try_get("habit_id")?,
            user_id: row.try_get("user_id")?,
            date: decode_date(&date)?,
            count: row.try_get("count")?,
            note: row.try_get("note")?,
            created_at: decode_datetime(&created_at)?,
        })
    }
}
