use chrono::{NaiveDate, Utc};
use rusqlite::{params, Row};

use stridelog_core::habit::{CreateHabit, Frequency, Habit, UpdateHabit};
use stridelog_core::streak::StreakSummary;

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::DbError;

pub(crate) fn json_col<T: serde::de::DeserializeOwned>(
    row: &Row,
    col: &str,
) -> rusqlite::Result<T> {
    let raw: String = row.get(col)?;
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<String, DbError> {
    serde_json::to_string(value).map_err(|e| DbError::Internal(e.to_string()))
}

fn row_to_habit(row: &Row) -> rusqlite::Result<Habit> {
    let frequency_str: String = row.get("frequency")?;
    Ok(Habit {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        name: row.get("name")?,
        frequency: Frequency::parse_str(&frequency_str).unwrap_or(Frequency::Daily),
        custom_days: json_col(row, "custom_days")?,
        start_date: row.get("start_date")?,
        success_dates: json_col(row, "success_dates")?,
        failure_dates: json_col(row, "failure_dates")?,
        streaks: StreakSummary {
            current: row.get("current_streak")?,
            highest: row.get("highest_streak")?,
        },
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

impl SqliteDatabase {
    pub fn create_habit_sync(&self, owner_id: &str, input: &CreateHabit) -> Result<Habit, DbError> {
        self.with_conn(|conn| {
            let id = uuid::Uuid::new_v4().to_string();
            let now = Utc::now();
            conn.execute(
                "INSERT INTO habits (
                    id, owner_id, name, frequency, custom_days, start_date,
                    success_dates, failure_dates, current_streak, highest_streak,
                    created_at, updated_at
                 )
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, '[]', '[]', 0, 0, ?7, ?8)",
                params![
                    id,
                    owner_id,
                    input.name,
                    input.frequency.as_str(),
                    to_json(&input.custom_days)?,
                    input.start_date,
                    now,
                    now,
                ],
            )
            .to_db()?;

            conn.query_row("SELECT * FROM habits WHERE id = ?1", params![id], row_to_habit)
                .to_db()
        })
    }

    pub fn get_habit_sync(&self, owner_id: &str, id: &str) -> Result<Habit, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM habits WHERE id = ?1 AND owner_id = ?2",
                params![id, owner_id],
                row_to_habit,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("habit {id}")),
                other => DbError::Internal(other.to_string()),
            })
        })
    }

    pub fn list_habits_sync(&self, owner_id: &str) -> Result<Vec<Habit>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT * FROM habits WHERE owner_id = ?1 ORDER BY created_at ASC")
                .to_db()?;
            let habits = stmt
                .query_map(params![owner_id], row_to_habit)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            Ok(habits)
        })
    }

    pub fn update_habit_sync(
        &self,
        owner_id: &str,
        id: &str,
        update: &UpdateHabit,
    ) -> Result<Habit, DbError> {
        self.with_conn(|conn| {
            let now = Utc::now();
            let mut sets = vec!["updated_at = ?1".to_string()];
            let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(now)];

            if let Some(ref name) = update.name {
                param_values.push(Box::new(name.clone()));
                sets.push(format!("name = ?{}", param_values.len()));
            }
            if let Some(frequency) = update.frequency {
                param_values.push(Box::new(frequency.as_str().to_string()));
                sets.push(format!("frequency = ?{}", param_values.len()));
            }
            if let Some(ref custom_days) = update.custom_days {
                param_values.push(Box::new(to_json(custom_days)?));
                sets.push(format!("custom_days = ?{}", param_values.len()));
            }

            param_values.push(Box::new(id.to_string()));
            let id_param = param_values.len();
            param_values.push(Box::new(owner_id.to_string()));
            let owner_param = param_values.len();

            let sql = format!(
                "UPDATE habits SET {} WHERE id = ?{} AND owner_id = ?{}",
                sets.join(", "),
                id_param,
                owner_param
            );

            let params_ref: Vec<&dyn rusqlite::types::ToSql> =
                param_values.iter().map(|p| p.as_ref()).collect();

            let changed = conn.execute(&sql, params_ref.as_slice()).to_db()?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("habit {id}")));
            }

            conn.query_row("SELECT * FROM habits WHERE id = ?1", params![id], row_to_habit)
                .to_db()
        })
    }

    /// Both date sets and the streak summary land in one UPDATE so no
    /// reader ever sees marks from one snapshot and streaks from another.
    pub fn set_habit_marks_sync(
        &self,
        owner_id: &str,
        id: &str,
        success_dates: &[NaiveDate],
        failure_dates: &[NaiveDate],
        streaks: StreakSummary,
    ) -> Result<Habit, DbError> {
        self.with_conn(|conn| {
            let now = Utc::now();
            let changed = conn
                .execute(
                    "UPDATE habits
                     SET success_dates = ?1, failure_dates = ?2,
                         current_streak = ?3, highest_streak = ?4, updated_at = ?5
                     WHERE id = ?6 AND owner_id = ?7",
                    params![
                        to_json(&success_dates)?,
                        to_json(&failure_dates)?,
                        streaks.current,
                        streaks.highest,
                        now,
                        id,
                        owner_id,
                    ],
                )
                .to_db()?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("habit {id}")));
            }

            conn.query_row("SELECT * FROM habits WHERE id = ?1", params![id], row_to_habit)
                .to_db()
        })
    }

    pub fn delete_habit_sync(&self, owner_id: &str, id: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "DELETE FROM habits WHERE id = ?1 AND owner_id = ?2",
                    params![id, owner_id],
                )
                .to_db()?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("habit {id}")));
            }
            Ok(())
        })
    }
}
