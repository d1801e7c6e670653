use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::{json, Value};

use stridelog_service::TrackerService;

use crate::auth::AuthedUser;

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/focus", get(focus_tally))
        .route("/api/focus/complete", post(complete_session))
}

async fn focus_tally(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .service
        .focus_tally(&user.user_id)
        .await
        .map(|t| Json(json!(t)))
        .map_err(to_error)
}

async fn complete_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .service
        .complete_focus_session(&user.user_id)
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
