//! Database module: models, schema, and per-domain stores.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows plus enum <-> text conversions
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: pool construction and schema init
//! - one store per domain (`habits`, `tasks`, `projects`, `goals`, `reviews`,
//!   `users`), each a thin Clone-able wrapper over the shared pool

pub mod goals;
pub mod habits;
pub mod models;
pub mod projects;
pub mod reviews;
pub mod schema;
pub mod sqlite;
pub mod tasks;
pub mod users;

pub use schema::SQLITE_INIT;
pub use sqlite::{SqlitePool, spawn};

use chrono::{DateTime, NaiveDate, Utc};

/// Dates and timestamps are stored as ISO-8601 TEXT; decode failures surface
/// as sqlx decode errors like any other column-type mismatch.
pub(crate) fn decode_datetime(s: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

pub(crate) fn decode_date(s: &str) -> Result<NaiveDate, sqlx::Error> {
    s.parse::<NaiveDate>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

pub(crate) fn bool_from(i: i64) -> bool {
    i != 0
}

pub(crate) fn bool_to(b: bool) -> i64 {
    if b { 1 } else { 0 }
}
