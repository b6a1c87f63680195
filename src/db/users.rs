use crate::db::models::User;
use crate::db::sqlite::SqlitePool;
use crate::db::{bool_from, decode_datetime};
use crate::error::FlowError;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

const USER_COLUMNS: &str = "id, username, email, is_active, created_at";

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, FlowError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_user).transpose()
    }

    pub async fn create(&self, username: &str, email: Option<&str>) -> Result<User, FlowError> {
        let result = sqlx::query(
            "INSERT INTO users (username, email, is_active, created_at) VALUES (?, ?, 1, ?)",
        )
        .bind(username)
        .bind(email)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(result.last_insert_rowid())
            .fetch_one(&self.pool)
            .await?;
        Self::row_to_user(row)
    }

    fn row_to_user(row: SqliteRow) -> Result<User, FlowError> {
        let created_at: String = row.try_get("created_at")?;
        Ok(User {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            is_active: bool_from(row.try_get("is_active")?),
            created_at: decode_datetime(&created_at)?,
        })
    }
}
