use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use stridelog_core::task::{CreateTask, TaskFilter, UpdateTask};
use stridelog_service::TrackerService;

use crate::auth::AuthedUser;

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/api/tasks/{id}/worked-time", post(add_worked_time))
}

#[derive(Debug, Deserialize)]
struct TaskQuery {
    /// Exact deadline date to filter on.
    date: Option<NaiveDate>,
    category: Option<String>,
    completed: Option<bool>,
}

async fn list_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Query(q): Query<TaskQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let filter = TaskFilter {
        deadline: q.date,
        category: q.category,
        completed: q.completed,
    };
    state
        .service
        .list_tasks(&user.user_id, filter)
        .await
        .map(|t| Json(json!(t)))
        .map_err(to_error)
}

async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Json(input): Json<CreateTask>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    state
        .service
        .create_task(&user.user_id, input)
        .await
        .map(|t| (StatusCode::CREATED, Json(json!(t))))
        .map_err(to_error)
}

async fn get_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .service
        .get_task(&user.user_id, &id)
        .await
        .map(|t| Json(json!(t)))
        .map_err(to_error)
}

async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
    Json(input): Json<UpdateTask>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .service
        .update_task(&user.user_id, &id, input)
        .await
        .map(|t| Json(json!(t)))
        .map_err(to_error)
}

async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    state
        .service
        .delete_task(&user.user_id, &id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(to_error)
}

#[derive(Debug, Deserialize)]
struct WorkedTimeRequest {
    minutes: i64,
}

async fn add_worked_time(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
    Json(req): Json<WorkedTimeRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .service
        .add_worked_minutes(&user.user_id, &id, req.minutes)
        .await
        .map(|t| Json(json!(t)))
        .map_err(to_error)
}

fn to_error(e: stridelog_service::ServiceError) -> (StatusCode, Json<Value>) {
    let (status, msg) = match &e {
        stridelog_service::ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
        stridelog_service::ServiceError::InvalidInput(_) => {
            (StatusCode::BAD_REQUEST, e.to_string())
        }
        stridelog_service::ServiceError::Unauthorized(_) => {
            (StatusCode::UNAUTHORIZED, e.to_string())
        }
        stridelog_service::ServiceError::Internal(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    };
    (status, Json(json!({ "error": msg })))
}
