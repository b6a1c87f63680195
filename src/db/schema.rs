//! SQL DDL for initializing the tracker storage.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema.
/// - enums stored as lowercase TEXT
/// - dates as ISO-8601 TEXT (`YYYY-MM-DD`), timestamps as RFC3339 TEXT
/// - booleans as INTEGER 0/1
/// - `habit_logs` holds exactly one row per (habit_id, date); the UNIQUE
///   constraint backs the upsert in the check-in ledger
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    email TEXT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS habits (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    name TEXT NOT NULL,
    description TEXT NULL,
    icon TEXT NULL,
    color TEXT NOT NULL DEFAULT '#3B82F6',
    frequency_type TEXT NOT NULL DEFAULT 'daily',
    weekly_target INTEGER NOT NULL DEFAULT 7,
    times_per_day INTEGER NOT NULL DEFAULT 1,
    custom_schedule TEXT NULL, -- JSON array of 7 ints, Monday-first
    allow_overflow INTEGER NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1,
    is_archived INTEGER NOT NULL DEFAULT 0,
    archived_at TEXT NULL,
    sort_order INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS habit_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    habit_id INTEGER NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id),
    date TEXT NOT NULL,
    count INTEGER NOT NULL DEFAULT 1,
    note TEXT NULL,
    created_at TEXT NOT NULL,
    UNIQUE(habit_id, date)
);

CREATE INDEX IF NOT EXISTS idx_habit_logs_user_date ON habit_logs(user_id, date);

CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    name TEXT NOT NULL,
    description TEXT NULL,
    status TEXT NOT NULL DEFAULT 'active',
    start_date TEXT NULL,
    target_date TEXT NULL,
    completed_date TEXT NULL,
    progress REAL NOT NULL DEFAULT 0.0,
    outline TEXT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS project_goals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id),
    title TEXT NOT NULL,
    description TEXT NULL,
    is_completed INTEGER NOT NULL DEFAULT 0,
    completed_at TEXT NULL,
    sort_order INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    project_id INTEGER NULL REFERENCES projects(id),
    title TEXT NOT NULL,
    description TEXT NULL,
    task_type TEXT NOT NULL DEFAULT 'task',
    status TEXT NOT NULL DEFAULT 'pending',
    priority TEXT NOT NULL DEFAULT 'medium',
    due_date TEXT NULL,
    scheduled_date TEXT NULL,
    scheduled_type TEXT NULL,
    completed_at TEXT NULL,
    estimated_pomodoros INTEGER NULL,
    actual_pomodoros INTEGER NULL,
    is_inbox INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_user_status ON tasks(user_id, status);

CREATE TABLE IF NOT EXISTS goals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    title TEXT NOT NULL,
    description TEXT NULL,
    period TEXT NOT NULL DEFAULT 'month',
    year INTEGER NULL,
    quarter INTEGER NULL,
    month INTEGER NULL,
    area TEXT NULL,
    status TEXT NOT NULL DEFAULT 'active',
    progress REAL NOT NULL DEFAULT 0.0,
    project_id INTEGER NULL REFERENCES projects(id),
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS key_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    goal_id INTEGER NOT NULL REFERENCES goals(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    target_value REAL NOT NULL DEFAULT 100.0,
    current_value REAL NOT NULL DEFAULT 0.0,
    unit TEXT NULL,
    is_completed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS reviews (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    period TEXT NOT NULL,
    year INTEGER NOT NULL,
    quarter INTEGER NULL,
    month INTEGER NULL,
    week INTEGER NULL,
    date TEXT NULL,
    highlights TEXT NULL,
    challenges TEXT NULL,
    learnings TEXT NULL,
    next_steps TEXT NULL,
    gratitude TEXT NULL,
    mood INTEGER NULL,
    created_at TEXT NOT NULL
);
"#;
