use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use stridelog_core::habit::{CreateHabit, MarkStatus, UpdateHabit};
use stridelog_service::TrackerService;

use crate::auth::AuthedUser;

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/habits", get(list_habits).post(create_habit))
        .route(
            "/api/habits/{id}",
            get(get_habit).put(update_habit).delete(delete_habit),
        )
        .route("/api/habits/{id}/mark", post(mark_habit))
}

#[derive(Debug, Deserialize)]
struct HabitQuery {
    /// Restrict to habits due on this date.
    due: Option<NaiveDate>,
}

async fn list_habits(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Query(q): Query<HabitQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let habits = match q.due {
        Some(date) => state.service.habits_due_on(&user.user_id, date).await,
        None => state.service.list_habits(&user.user_id).await,
    };
    habits.map(|h| Json(json!(h))).map_err(to_error)
}

async fn create_habit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Json(input): Json<CreateHabit>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    state
        .service
        .create_habit(&user.user_id, input)
        .await
        .map(|h| (StatusCode::CREATED, Json(json!(h))))
        .map_err(to_error)
}

async fn get_habit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .service
        .get_habit(&user.user_id, &id)
        .await
        .map(|h| Json(json!(h)))
        .map_err(to_error)
}

async fn update_habit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
    Json(input): Json<UpdateHabit>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .service
        .update_habit(&user.user_id, &id, input)
        .await
        .map(|h| Json(json!(h)))
        .map_err(to_error)
}

async fn delete_habit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    state
        .service
        .delete_habit(&user.user_id, &id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(to_error)
}

#[derive(Debug, Deserialize)]
struct MarkRequest {
    date: NaiveDate,
    status: MarkStatus,
}

async fn mark_habit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
    Json(req): Json<MarkRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .service
        .mark_habit(&user.user_id, &id, req.date, req.status)
        .await
        .map(|h| Json(json!(h)))
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
