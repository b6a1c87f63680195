use crate::db::schema::SQLITE_INIT;
use crate::error::FlowError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

pub type SqlitePool = Pool<Sqlite>;

/// Open the database (creating the file if missing) and initialize the schema.
/// Foreign keys are enabled so habit deletion cascades to its check-ins.
pub async fn spawn(database_url: &str) -> Result<SqlitePool, FlowError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    init_schema(&pool).await?;
    Ok(pool)
}

/// Execute the bundled DDL.
/// (SQLite supports multi-statement scripts but sqlx::query doesn't, so the
/// script is executed statement by statement.)
pub async fn init_schema(pool: &SqlitePool) -> Result<(), FlowError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
