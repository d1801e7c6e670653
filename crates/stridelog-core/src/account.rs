use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account. The password hash never leaves the db layer;
/// this is the shape that crosses API boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A user together with their stored password hash, for login checks.
#[derive(Debug, Clone)]
pub struct Credential {
    pub user: User,
    pub password_hash: String,
}

/// A bearer session issued at login. Only the token's SHA-256 hash is
/// stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}
