use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use stridelog_core::focus::FocusTally;
use stridelog_core::habit::{CreateHabit, Habit, MarkStatus, UpdateHabit};
use stridelog_core::task::{CreateTask, Task, TaskFilter, UpdateTask};
use stridelog_db::DbError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DbError> for ServiceError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(what) => ServiceError::NotFound(what),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

/// The tracker's application surface, shared by the in-process
/// implementation and the HTTP client.
///
/// Every method names its `owner_id` explicitly; there is no ambient
/// current user. Callers that authenticate (the HTTP client, the server's
/// middleware) resolve the owner first and pass it down.
#[async_trait]
pub trait TrackerService: Send + Sync {
    // -- Habits --
    async fn create_habit(
        &self,
        owner_id: &str,
        input: CreateHabit,
    ) -> Result<Habit, ServiceError>;
    async fn get_habit(&self, owner_id: &str, id: &str) -> Result<Habit, ServiceError>;
    async fn list_habits(&self, owner_id: &str) -> Result<Vec<Habit>, ServiceError>;
    /// Habits whose frequency policy requires action on `date`.
    async fn habits_due_on(
        &self,
        owner_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Habit>, ServiceError>;
    async fn update_habit(
        &self,
        owner_id: &str,
        id: &str,
        update: UpdateHabit,
    ) -> Result<Habit, ServiceError>;
    async fn delete_habit(&self, owner_id: &str, id: &str) -> Result<(), ServiceError>;
    /// Record `status` for `date` and return the habit with recomputed
    /// streaks. Rejects dates before the habit's start or in the future.
    async fn mark_habit(
        &self,
        owner_id: &str,
        id: &str,
        date: NaiveDate,
        status: MarkStatus,
    ) -> Result<Habit, ServiceError>;

    // -- Tasks --
    async fn create_task(&self, owner_id: &str, input: CreateTask) -> Result<Task, ServiceError>;
    async fn get_task(&self, owner_id: &str, id: &str) -> Result<Task, ServiceError>;
    async fn list_tasks(
        &self,
        owner_id: &str,
        filter: TaskFilter,
    ) -> Result<Vec<Task>, ServiceError>;
    async fn update_task(
        &self,
        owner_id: &str,
        id: &str,
        update: UpdateTask,
    ) -> Result<Task, ServiceError>;
    async fn delete_task(&self, owner_id: &str, id: &str) -> Result<(), ServiceError>;
    /// Credit `minutes` of focus work against a task.
    async fn add_worked_minutes(
        &self,
        owner_id: &str,
        id: &str,
        minutes: i64,
    ) -> Result<Task, ServiceError>;

    // -- Focus sessions --
    async fn focus_tally(&self, owner_id: &str) -> Result<FocusTally, ServiceError>;
    async fn complete_focus_session(&self, owner_id: &str) -> Result<FocusTally, ServiceError>;
}
