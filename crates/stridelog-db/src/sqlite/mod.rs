pub(crate) mod migrations;
pub mod queries;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::Connection;

use stridelog_core::account::{Credential, Session, User};
use stridelog_core::focus::FocusTally;
use stridelog_core::habit::{CreateHabit, Habit, UpdateHabit};
use stridelog_core::streak::StreakSummary;
use stridelog_core::task::{CreateTask, Task, TaskFilter, UpdateTask};

use crate::{Database, DbConfig, DbError};

/// Extension trait that converts `rusqlite::Result<T>` into
/// `Result<T, DbError>`; `.to_db()?` is the shortest spelling inside the
/// query modules.
pub(crate) trait SqliteResultExt<T> {
    fn to_db(self) -> Result<T, DbError>;
}

impl<T> SqliteResultExt<T> for rusqlite::Result<T> {
    fn to_db(self) -> Result<T, DbError> {
        self.map_err(map_sqlite_err)
    }
}

pub(crate) fn map_sqlite_err(e: rusqlite::Error) -> DbError {
    DbError::Internal(e.to_string())
}

#[derive(Clone)]
pub struct SqliteDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDatabase {
    pub fn open(config: &DbConfig) -> Result<Self, DbError> {
        let path = config
            .sqlite_path
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| crate::data_dir().join("stridelog.db"));
        std::fs::create_dir_all(path.parent().unwrap_or(Path::new(".")))?;
        Self::open_path(&path)
    }

    pub fn open_path(path: &Path) -> Result<Self, DbError> {
        tracing::debug!(path = %path.display(), "opening sqlite database");
        let conn = Connection::open(path).map_err(map_sqlite_err)?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=5000;",
        )
        .map_err(map_sqlite_err)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory().map_err(map_sqlite_err)?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(map_sqlite_err)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    pub fn open_default() -> Result<Self, DbError> {
        Self::open(&DbConfig::default())
    }

    pub(crate) fn with_conn<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| DbError::Internal("lock poisoned".into()))?;
        f(&conn)
    }

    fn run_migrations(&self) -> Result<(), DbError> {
        self.with_conn(|conn| migrations::run(conn))
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    // -- Habits --
    async fn create_habit(&self, owner_id: &str, input: &CreateHabit) -> Result<Habit, DbError> {
        let db = self.clone();
        let owner_id = owner_id.to_string();
        let input = input.clone();
        tokio::task::spawn_blocking(move || db.create_habit_sync(&owner_id, &input))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn get_habit(&self, owner_id: &str, id: &str) -> Result<Habit, DbError> {
        let db = self.clone();
        let owner_id = owner_id.to_string();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || db.get_habit_sync(&owner_id, &id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn list_habits(&self, owner_id: &str) -> Result<Vec<Habit>, DbError> {
        let db = self.clone();
        let owner_id = owner_id.to_string();
        tokio::task::spawn_blocking(move || db.list_habits_sync(&owner_id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn update_habit(
        &self,
        owner_id: &str,
        id: &str,
        update: &UpdateHabit,
    ) -> Result<Habit, DbError> {
        let db = self.clone();
        let owner_id = owner_id.to_string();
        let id = id.to_string();
        let update = update.clone();
        tokio::task::spawn_blocking(move || db.update_habit_sync(&owner_id, &id, &update))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn set_habit_marks(
        &self,
        owner_id: &str,
        id: &str,
        success_dates: &[NaiveDate],
        failure_dates: &[NaiveDate],
        streaks: StreakSummary,
    ) -> Result<Habit, DbError> {
        let db = self.clone();
        let owner_id = owner_id.to_string();
        let id = id.to_string();
        let success = success_dates.to_vec();
        let failure = failure_dates.to_vec();
        tokio::task::spawn_blocking(move || {
            db.set_habit_marks_sync(&owner_id, &id, &success, &failure, streaks)
        })
        .await
        .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn delete_habit(&self, owner_id: &str, id: &str) -> Result<(), DbError> {
        let db = self.clone();
        let owner_id = owner_id.to_string();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || db.delete_habit_sync(&owner_id, &id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }

    // -- Tasks --
    async fn create_task(&self, owner_id: &str, input: &CreateTask) -> Result<Task, DbError> {
        let db = self.clone();
        let owner_id = owner_id.to_string();
        let input = input.clone();
        tokio::task::spawn_blocking(move || db.create_task_sync(&owner_id, &input))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn get_task(&self, owner_id: &str, id: &str) -> Result<Task, DbError> {
        let db = self.clone();
        let owner_id = owner_id.to_string();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || db.get_task_sync(&owner_id, &id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn list_tasks(&self, owner_id: &str, filter: &TaskFilter) -> Result<Vec<Task>, DbError> {
        let db = self.clone();
        let owner_id = owner_id.to_string();
        let filter = filter.clone();
        tokio::task::spawn_blocking(move || db.list_tasks_sync(&owner_id, &filter))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn update_task(
        &self,
        owner_id: &str,
        id: &str,
        update: &UpdateTask,
    ) -> Result<Task, DbError> {
        let db = self.clone();
        let owner_id = owner_id.to_string();
        let id = id.to_string();
        let update = update.clone();
        tokio::task::spawn_blocking(move || db.update_task_sync(&owner_id, &id, &update))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn delete_task(&self, owner_id: &str, id: &str) -> Result<(), DbError> {
        let db = self.clone();
        let owner_id = owner_id.to_string();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || db.delete_task_sync(&owner_id, &id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn add_worked_minutes(
        &self,
        owner_id: &str,
        id: &str,
        minutes: i64,
    ) -> Result<Task, DbError> {
        let db = self.clone();
        let owner_id = owner_id.to_string();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || db.add_worked_minutes_sync(&owner_id, &id, minutes))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }

    // -- Focus sessions --
    async fn get_focus_tally(&self, owner_id: &str) -> Result<FocusTally, DbError> {
        let db = self.clone();
        let owner_id = owner_id.to_string();
        tokio::task::spawn_blocking(move || db.get_focus_tally_sync(&owner_id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn increment_focus_tally(&self, owner_id: &str) -> Result<FocusTally, DbError> {
        let db = self.clone();
        let owner_id = owner_id.to_string();
        tokio::task::spawn_blocking(move || db.increment_focus_tally_sync(&owner_id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }

    // -- Accounts & sessions --
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, DbError> {
        let db = self.clone();
        let email = email.to_string();
        let password_hash = password_hash.to_string();
        tokio::task::spawn_blocking(move || db.create_user_sync(&email, &password_hash))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn get_user(&self, id: &str) -> Result<User, DbError> {
        let db = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || db.get_user_sync(&id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn find_credential_by_email(&self, email: &str) -> Result<Option<Credential>, DbError> {
        let db = self.clone();
        let email = email.to_string();
        tokio::task::spawn_blocking(move || db.find_credential_by_email_sync(&email))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn insert_session(&self, user_id: &str, token_hash: &str) -> Result<Session, DbError> {
        let db = self.clone();
        let user_id = user_id.to_string();
        let token_hash = token_hash.to_string();
        tokio::task::spawn_blocking(move || db.insert_session_sync(&user_id, &token_hash))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn find_session_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<Session>, DbError> {
        let db = self.clone();
        let token_hash = token_hash.to_string();
        tokio::task::spawn_blocking(move || db.find_session_by_token_hash_sync(&token_hash))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn touch_session(&self, id: &str) -> Result<(), DbError> {
        let db = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || db.touch_session_sync(&id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn delete_session_by_token_hash(&self, token_hash: &str) -> Result<(), DbError> {
        let db = self.clone();
        let token_hash = token_hash.to_string();
        tokio::task::spawn_blocking(move || db.delete_session_by_token_hash_sync(&token_hash))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
}
