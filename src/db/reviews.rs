use crate::db::models::{Review, ReviewPeriod};
use crate::db::sqlite::SqlitePool;
use crate::db::{decode_date, decode_datetime};
use crate::error::FlowError;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

const REVIEW_COLUMNS: &str = "id, user_id, period, year, quarter, month, week, date, \
     highlights, challenges, learnings, next_steps, gratitude, mood, created_at";

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewDraft {
    pub period: ReviewPeriod,
    pub year: i64,
    #[serde(default)]
    pub quarter: Option<i64>,
    #[serde(default)]
    pub month: Option<i64>,
    #[serde(default)]
    pub week: Option<i64>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub highlights: Option<String>,
    #[serde(default)]
    pub challenges: Option<String>,
    #[serde(default)]
    pub learnings: Option<String>,
    #[serde(default)]
    pub next_steps: Option<String>,
    #[serde(default)]
    pub gratitude: Option<String>,
    #[serde(default)]
    pub mood: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewPatch {
    pub highlights: Option<String>,
    pub challenges: Option<String>,
    pub learnings: Option<String>,
    pub next_steps: Option<String>,
    pub gratitude: Option<String>,
    pub mood: Option<i64>,
}

#[derive(Clone)]
pub struct ReviewStore {
    pool: SqlitePool,
}

impl ReviewStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: i64, draft: &ReviewDraft) -> Result<Review, FlowError> {
        if let Some(mood) = draft.mood
            && !(1..=10).contains(&mood)
        {
            return Err(FlowError::InvalidInput(
                "mood must be between 1 and 10".to_string(),
            ));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO reviews (
                user_id, period, year, quarter, month, week, date,
                highlights, challenges, learnings, next_steps, gratitude,
                mood, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(draft.period.as_str())
        .bind(draft.year)
        .bind(draft.quarter)
        .bind(draft.month)
        .bind(draft.week)
        .bind(draft.date.map(|d| d.to_string()))
        .bind(&draft.highlights)
        .bind(&draft.challenges)
        .bind(&draft.learnings)
        .bind(&draft.next_steps)
        .bind(&draft.gratitude)
        .bind(draft.mood)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        self.get(user_id, result.last_insert_rowid()).await
    }

    pub async fn get(&self, user_id: i64, id: i64) -> Result<Review, FlowError> {
        let row = sqlx::query(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ? AND user_id = ?"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(FlowError::not_found_for("review"))?;
        Self::row_to_review(row)
    }

    pub async fn list(
        &self,
        user_id: i64,
        period: Option<ReviewPeriod>,
        year: Option<i64>,
    ) -> Result<Vec<Review>, FlowError> {
        let mut sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE user_id = ?");
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
        rows.into_iter().map(Self::row_to_review).collect()
    }

    pub async fn update(
        &self,
        user_id: i64,
        id: i64,
        patch: &ReviewPatch,
    ) -> Result<Review, FlowError> {
        if let Some(mood) = patch.mood
            && !(1..=10).contains(&mood)
        {
            return Err(FlowError::InvalidInput(
                "mood must be between 1 and 10".to_string(),
            ));
        }

        let current = self.get(user_id, id).await?;

        sqlx::query(
            "UPDATE reviews SET highlights = ?, challenges = ?, learnings = ?, \
             next_steps = ?, gratitude = ?, mood = ? WHERE id = ? AND user_id = ?",
        )
        .bind(patch.highlights.as_ref().or(current.highlights.as_ref()))
        .bind(patch.challenges.as_ref().or(current.challenges.as_ref()))
        .bind(patch.learnings.as_ref().or(current.learnings.as_ref()))
        .bind(patch.next_steps.as_ref().or(current.next_steps.as_ref()))
        .bind(patch.gratitude.as_ref().or(current.gratitude.as_ref()))
        .bind(patch.mood.or(current.mood))
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        self.get(user_id, id).await
    }

    pub async fn delete(&self, user_id: i64, id: i64) -> Result<(), FlowError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(FlowError::NotFound("review"));
        }
        Ok(())
    }

    /// The daily review for a given date, if already written.
    pub async fn find_daily(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<Option<Review>, FlowError> {
        let row = sqlx::query(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews \
             WHERE user_id = ? AND period = 'daily' AND date = ?"
        ))
        .bind(user_id)
        .bind(date.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_review).transpose()
    }

    fn row_to_review(row: SqliteRow) -> Result<Review, FlowError> {
        let period: String = row.try_get("period")?;
        let date: Option<String> = row.try_get("date")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Review {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            period: ReviewPeriod::parse(&period)?,
            year: row.try_get("year")?,
            quarter: row.try_get("quarter")?,
            month: row.try_get("month")?,
            week: row.try_get("week")?,
            date: date.as_deref().map(decode_date).transpose()?,
            highlights: row.try_get("highlights")?,
            challenges: row.try_get("challenges")?,
            learnings: row.try_get("learnings")?,
            next_steps: row.try_get("next_steps")?,
            gratitude: row.try_get("gratitude")?,
            mood: row.try_get("mood")?,
            created_at: decode_datetime(&created_at)?,
        })
    }
}
