use rusqlite::Connection;

use crate::DbError;

pub fn run(conn: &Connection) -> Result<(), DbError> {
    // Idempotent CREATE TABLE IF NOT EXISTS schema. Habit date sets are
    // stored as JSON arrays of YYYY-MM-DD strings, mirroring the
    // document shape the API exposes.
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id            TEXT PRIMARY KEY,
            email         TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sessions (
            id           TEXT PRIMARY KEY,
            user_id      TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            token_hash   TEXT NOT NULL UNIQUE,
            created_at   TEXT NOT NULL,
            last_used_at TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);

        CREATE TABLE IF NOT EXISTS habits (
            id             TEXT PRIMARY KEY,
            owner_id       TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name           TEXT NOT NULL,
            frequency      TEXT NOT NULL DEFAULT 'Daily'
                               CHECK(frequency IN ('Daily', 'Weekly', 'Custom')),
            custom_days    TEXT NOT NULL DEFAULT '[]',
            start_date     TEXT NOT NULL,
            success_dates  TEXT NOT NULL DEFAULT '[]',
            failure_dates  TEXT NOT NULL DEFAULT '[]',
            current_streak INTEGER NOT NULL DEFAULT 0,
            highest_streak INTEGER NOT NULL DEFAULT 0,
            created_at     TEXT NOT NULL,
            updated_at     TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_habits_owner ON habits(owner_id);

        CREATE TABLE IF NOT EXISTS tasks (
            id                   TEXT PRIMARY KEY,
            owner_id             TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            text                 TEXT NOT NULL,
            category             TEXT NOT NULL DEFAULT '',
            priority             TEXT NOT NULL DEFAULT 'Medium'
                                     CHECK(priority IN ('High', 'Medium', 'Low')),
            deadline             TEXT NOT NULL,
            completed            INTEGER NOT NULL DEFAULT 0,
            total_worked_minutes INTEGER NOT NULL DEFAULT 0,
            created_at           TEXT NOT NULL,
            updated_at           TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_tasks_owner ON tasks(owner_id);
        CREATE INDEX IF NOT EXISTS idx_tasks_owner_deadline
            ON tasks(owner_id, deadline);

        CREATE TABLE IF NOT EXISTS focus_sessions (
            owner_id   TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
            count      INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL
        );
        ",
    )
    .map_err(|e| DbError::Internal(e.to_string()))?;
    Ok(())
}
