use chrono::Utc;
use rusqlite::params;

use stridelog_core::focus::FocusTally;

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::DbError;

impl SqliteDatabase {
    /// An owner with no completed sessions reads as a zero tally rather
    /// than a missing row.
    pub fn get_focus_tally_sync(&self, owner_id: &str) -> Result<FocusTally, DbError> {
        self.with_conn(|conn| {
            let count = conn
                .query_row(
                    "SELECT count FROM focus_sessions WHERE owner_id = ?1",
                    params![owner_id],
                    |row| row.get::<_, i64>(0),
                )
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(DbError::Internal(other.to_string())),
                })?
                .unwrap_or(0);
            Ok(FocusTally {
                owner_id: owner_id.to_string(),
                count,
            })
        })
    }

    pub fn increment_focus_tally_sync(&self, owner_id: &str) -> Result<FocusTally, DbError> {
        self.with_conn(|conn| {
            let now = Utc::now();
            // Single upsert keeps concurrent completions from losing counts.
            conn.execute(
                "INSERT INTO focus_sessions (owner_id, count, updated_at)
                 VALUES (?1, 1, ?2)
                 ON CONFLICT(owner_id) DO UPDATE
                 SET count = count + 1, updated_at = excluded.updated_at",
                params![owner_id, now],
            )
            .to_db()?;

            let count = conn
                .query_row(
                    "SELECT count FROM focus_sessions WHERE owner_id = ?1",
                    params![owner_id],
                    |row| row.get::<_, i64>(0),
                )
                .to_db()?;
            Ok(FocusTally {
                owner_id: owner_id.to_string(),
                count,
            })
        })
    }
}
