use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::routes::AppState;

/// The resolved user behind an authenticated request, inserted into
/// request extensions by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub user_id: String,
    pub email: String,
    pub token_hash: String,
}

/// SHA-256 hash a raw token, returning the hex-encoded digest. Only the
/// digest is ever stored; a leaked sessions table yields no usable tokens.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

const BASE62: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

fn random_base62(len: usize) -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| {
            let idx = rng.gen_range(0..BASE62.len());
            BASE62[idx] as char
        })
        .collect()
}

/// Generate a new session token: `sl_` + 43 chars of base62 random data.
pub fn generate_session_token() -> String {
    format!("sl_{}", random_base62(43))
}

/// Salted SHA-256 password hash, stored as `salt$hex-digest`.
pub fn hash_password(password: &str) -> String {
    let salt = random_base62(16);
    let digest = sha256_hex(&format!("{salt}{password}"));
    format!("{salt}${digest}")
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, digest)) = stored.split_once('$') else {
        return false;
    };
    constant_time_eq(&sha256_hex(&format!("{salt}{password}")), digest)
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes()
        .iter()
        .zip(b.as_bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Axum middleware that resolves `Authorization: Bearer <token>` to a
/// session and its user, rejecting the request with 401 otherwise.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let token = match token {
        Some(t) => t,
        None => return unauthorized(),
    };

    let token_hash = sha256_hex(token);
    let session = match state.db.find_session_by_token_hash(&token_hash).await {
        Ok(Some(session)) => session,
        Ok(None) | Err(_) => return unauthorized(),
    };

    let user = match state.db.get_user(&session.user_id).await {
        Ok(user) => user,
        Err(_) => return unauthorized(),
    };

    // Fire-and-forget: record session activity.
    {
        let db = state.db.clone();
        let session_id = session.id.clone();
        tokio::spawn(async move {
            let _ = db.touch_session(&session_id).await;
        });
    }

    request.extensions_mut().insert(AuthedUser {
        user_id: user.id,
        email: user.email,
        token_hash,
    });
    next.run(request).await
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "missing or invalid session token" })),
    )
        .into_response()
}
