use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::{
    generate_session_token, hash_password, sha256_hex, verify_password, AuthedUser,
};

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/logout", post(logout))
        .route("/api/me", get(me))
}

#[derive(Debug, Deserialize)]
struct AuthRequest {
    email: String,
    password: String,
}

fn validate_credentials(req: &AuthRequest) -> Result<(), (StatusCode, Json<Value>)> {
    if !req.email.contains('@') {
        return Err(bad_request("a valid email address is required"));
    }
    if req.password.len() < 6 {
        return Err(bad_request("password must be at least 6 characters"));
    }
    Ok(())
}

async fn signup(
    State(state): State<AppState>,
    Json(req): Json<AuthRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    validate_credentials(&req)?;

    let existing = state
        .db
        .find_credential_by_email(&req.email)
        .await
        .map_err(internal)?;
    if existing.is_some() {
        return Err(bad_request("email is already registered"));
    }

    let user = state
        .db
        .create_user(&req.email, &hash_password(&req.password))
        .await
        .map_err(internal)?;

    let token = generate_session_token();
    state
        .db
        .insert_session(&user.id, &sha256_hex(&token))
        .await
        .map_err(internal)?;

    info!(user_id = %user.id, "user signed up");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "user": user, "token": token })),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<AuthRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    // One generic rejection for unknown email and wrong password alike.
    let invalid = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid email or password" })),
        )
    };

    let credential = state
        .db
        .find_credential_by_email(&req.email)
        .await
        .map_err(internal)?
        .ok_or_else(invalid)?;

    if !verify_password(&req.password, &credential.password_hash) {
        return Err(invalid());
    }

    let token = generate_session_token();
    state
        .db
        .insert_session(&credential.user.id, &sha256_hex(&token))
        .await
        .map_err(internal)?;

    info!(user_id = %credential.user.id, "user logged in");
    Ok(Json(json!({ "user": credential.user, "token": token })))
}

async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    state
        .db
        .delete_session_by_token_hash(&user.token_hash)
        .await
        .map_err(internal)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let user = state.db.get_user(&user.user_id).await.map_err(internal)?;
    Ok(Json(json!(user)))
}

fn bad_request(msg: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": msg })))
}

fn internal(e: stridelog_db::DbError) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
    )
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::test_helpers::{auth_body, read_json, test_router};

    #[tokio::test]
    async fn signup_returns_user_and_token() {
        let app = test_router().await;
        let resp = app
            .oneshot(auth_body("/api/auth/signup", "a@example.com", "hunter22"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = read_json(resp).await;
        assert_eq!(body["user"]["email"], "a@example.com");
        assert!(body["token"].as_str().unwrap().starts_with("sl_"));
    }

    #[tokio::test]
    async fn signup_rejects_bad_credentials() {
        let app = test_router().await;

        let resp = app
            .clone()
            .oneshot(auth_body("/api/auth/signup", "not-an-email", "hunter22"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = app
            .oneshot(auth_body("/api/auth/signup", "a@example.com", "short"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn signup_rejects_duplicate_email() {
        let app = test_router().await;
        let first = app
            .clone()
            .oneshot(auth_body("/api/auth/signup", "a@example.com", "hunter22"))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = app
            .oneshot(auth_body("/api/auth/signup", "a@example.com", "hunter22"))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_checks_password() {
        let app = test_router().await;
        app.clone()
            .oneshot(auth_body("/api/auth/signup", "a@example.com", "hunter22"))
            .await
            .unwrap();

        let ok = app
            .clone()
            .oneshot(auth_body("/api/auth/login", "a@example.com", "hunter22"))
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);

        let wrong = app
            .clone()
            .oneshot(auth_body("/api/auth/login", "a@example.com", "wrong-pass"))
            .await
            .unwrap();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

        let unknown = app
            .oneshot(auth_body("/api/auth/login", "b@example.com", "hunter22"))
            .await
            .unwrap();
        assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logout_revokes_the_session() {
        let app = test_router().await;
        let resp = app
            .clone()
            .oneshot(auth_body("/api/auth/signup", "a@example.com", "hunter22"))
            .await
            .unwrap();
        let body = read_json(resp).await;
        let token = body["token"].as_str().unwrap().to_string();

        let logout = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/logout")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(logout.status(), StatusCode::NO_CONTENT);

        let after = app
            .oneshot(
                Request::builder()
                    .uri("/api/habits")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn me_returns_the_logged_in_user() {
        let app = test_router().await;
        let resp = app
            .clone()
            .oneshot(auth_body("/api/auth/signup", "a@example.com", "hunter22"))
            .await
            .unwrap();
        let body = read_json(resp).await;
        let token = body["token"].as_str().unwrap().to_string();

        let me = app
            .oneshot(
                Request::builder()
                    .uri("/api/me")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(me.status(), StatusCode::OK);
        let body = read_json(me).await;
        assert_eq!(body["email"], "a@example.com");
    }
}
