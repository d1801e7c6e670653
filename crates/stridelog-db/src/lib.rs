pub mod sqlite;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use stridelog_core::account::{Credential, Session, User};
use stridelog_core::focus::FocusTally;
use stridelog_core::habit::{CreateHabit, Habit, UpdateHabit};
use stridelog_core::streak::StreakSummary;
use stridelog_core::task::{CreateTask, Task, TaskFilter, UpdateTask};

pub use sqlite::SqliteDatabase;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, Default)]
pub struct DbConfig {
    /// Path to the SQLite file; defaults to `data_dir()/stridelog.db`.
    pub sqlite_path: Option<String>,
}

/// Storage backend for the tracker's collections (`habits`, `tasks`,
/// `focus_sessions`) plus accounts and sessions.
///
/// Every collection is partitioned by `owner_id`: list queries filter on
/// it and gets/updates/deletes must not touch another owner's documents
/// (they report `NotFound` instead).
#[async_trait]
pub trait Database: Send + Sync {
    // -- Habits --
    async fn create_habit(&self, owner_id: &str, input: &CreateHabit) -> Result<Habit, DbError>;
    async fn get_habit(&self, owner_id: &str, id: &str) -> Result<Habit, DbError>;
    async fn list_habits(&self, owner_id: &str) -> Result<Vec<Habit>, DbError>;
    async fn update_habit(
        &self,
        owner_id: &str,
        id: &str,
        update: &UpdateHabit,
    ) -> Result<Habit, DbError>;
    /// Replace both date sets and the streak summary in one update, so the
    /// stored fields always reflect a single mark-action snapshot.
    async fn set_habit_marks(
        &self,
        owner_id: &str,
        id: &str,
        success_dates: &[NaiveDate],
        failure_dates: &[NaiveDate],
        streaks: StreakSummary,
    ) -> Result<Habit, DbError>;
    async fn delete_habit(&self, owner_id: &str, id: &str) -> Result<(), DbError>;

    // -- Tasks --
    async fn create_task(&self, owner_id: &str, input: &CreateTask) -> Result<Task, DbError>;
    async fn get_task(&self, owner_id: &str, id: &str) -> Result<Task, DbError>;
    async fn list_tasks(&self, owner_id: &str, filter: &TaskFilter) -> Result<Vec<Task>, DbError>;
    async fn update_task(
        &self,
        owner_id: &str,
        id: &str,
        update: &UpdateTask,
    ) -> Result<Task, DbError>;
    async fn delete_task(&self, owner_id: &str, id: &str) -> Result<(), DbError>;
    async fn add_worked_minutes(
        &self,
        owner_id: &str,
        id: &str,
        minutes: i64,
    ) -> Result<Task, DbError>;

    // -- Focus sessions --
    async fn get_focus_tally(&self, owner_id: &str) -> Result<FocusTally, DbError>;
    async fn increment_focus_tally(&self, owner_id: &str) -> Result<FocusTally, DbError>;

    // -- Accounts & sessions --
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, DbError>;
    async fn get_user(&self, id: &str) -> Result<User, DbError>;
    async fn find_credential_by_email(&self, email: &str) -> Result<Option<Credential>, DbError>;
    async fn insert_session(&self, user_id: &str, token_hash: &str) -> Result<Session, DbError>;
    async fn find_session_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<Session>, DbError>;
    async fn touch_session(&self, id: &str) -> Result<(), DbError>;
    async fn delete_session_by_token_hash(&self, token_hash: &str) -> Result<(), DbError>;
}

pub fn data_dir() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local/share")
    } else {
        PathBuf::from(".")
    };
    base.join("stridelog")
}
