use chrono::Utc;
use rusqlite::{params, Row};

use stridelog_core::account::{Credential, Session, User};

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        email: row.get("email")?,
        created_at: row.get("created_at")?,
    })
}

fn row_to_session(row: &Row) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        token_hash: row.get("token_hash")?,
        created_at: row.get("created_at")?,
        last_used_at: row.get("last_used_at")?,
    })
}

impl SqliteDatabase {
    pub fn create_user_sync(&self, email: &str, password_hash: &str) -> Result<User, DbError> {
        self.with_conn(|conn| {
            let id = uuid::Uuid::new_v4().to_string();
            let now = Utc::now();
            conn.execute(
                "INSERT INTO users (id, email, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, email, password_hash, now],
            )
            .to_db()?;

            conn.query_row("SELECT * FROM users WHERE id = ?1", params![id], row_to_user)
                .to_db()
        })
    }

    pub fn get_user_sync(&self, id: &str) -> Result<User, DbError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT * FROM users WHERE id = ?1", params![id], row_to_user)
                .map_err(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => {
                        DbError::NotFound(format!("user {id}"))
                    }
                    other => DbError::Internal(other.to_string()),
                })
        })
    }

    pub fn find_credential_by_email_sync(
        &self,
        email: &str,
    ) -> Result<Option<Credential>, DbError> {
        self.with_conn(|conn| {
            let result = conn.query_row(
                "SELECT * FROM users WHERE email = ?1",
                params![email],
                |row| {
                    Ok(Credential {
                        user: row_to_user(row)?,
                        password_hash: row.get("password_hash")?,
                    })
                },
            );
            match result {
                Ok(credential) => Ok(Some(credential)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(other) => Err(DbError::Internal(other.to_string())),
            }
        })
    }

    pub fn insert_session_sync(
        &self,
        user_id: &str,
        token_hash: &str,
    ) -> Result<Session, DbError> {
        self.with_conn(|conn| {
            let id = uuid::Uuid::new_v4().to_string();
            let now = Utc::now();
            conn.execute(
                "INSERT INTO sessions (id, user_id, token_hash, created_at, last_used_at)
                 VALUES (?1, ?2, ?3, ?4, NULL)",
                params![id, user_id, token_hash, now],
            )
            .to_db()?;

            conn.query_row(
                "SELECT * FROM sessions WHERE id = ?1",
                params![id],
                row_to_session,
            )
            .to_db()
        })
    }

    pub fn find_session_by_token_hash_sync(
        &self,
        token_hash: &str,
    ) -> Result<Option<Session>, DbError> {
        self.with_conn(|conn| {
            let result = conn.query_row(
                "SELECT * FROM sessions WHERE token_hash = ?1",
                params![token_hash],
                row_to_session,
            );
            match result {
                Ok(session) => Ok(Some(session)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(other) => Err(DbError::Internal(other.to_string())),
            }
        })
    }

    pub fn touch_session_sync(&self, id: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE sessions SET last_used_at = ?1 WHERE id = ?2",
                params![Utc::now(), id],
            )
            .to_db()?;
            Ok(())
        })
    }

    pub fn delete_session_by_token_hash_sync(&self, token_hash: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM sessions WHERE token_hash = ?1",
                params![token_hash],
            )
            .to_db()?;
            Ok(())
        })
    }
}
