use chrono::Utc;
use rusqlite::{params, Row};

use stridelog_core::task::{CreateTask, Priority, Task, TaskFilter, UpdateTask};

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    let priority_str: String = row.get("priority")?;
    Ok(Task {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        text: row.get("text")?,
        category: row.get("category")?,
        priority: Priority::parse_str(&priority_str).unwrap_or(Priority::Medium),
        deadline: row.get("deadline")?,
        completed: row.get("completed")?,
        total_worked_minutes: row.get("total_worked_minutes")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

impl SqliteDatabase {
    pub fn create_task_sync(&self, owner_id: &str, input: &CreateTask) -> Result<Task, DbError> {
        self.with_conn(|conn| {
            let id = uuid::Uuid::new_v4().to_string();
            let now = Utc::now();
            conn.execute(
                "INSERT INTO tasks (
                    id, owner_id, text, category, priority, deadline,
                    completed, total_worked_minutes, created_at, updated_at
                 )
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 0, ?7, ?8)",
                params![
                    id,
                    owner_id,
                    input.text,
                    input.category,
                    input.priority.as_str(),
                    input.deadline,
                    now,
                    now,
                ],
            )
            .to_db()?;

            conn.query_row("SELECT * FROM tasks WHERE id = ?1", params![id], row_to_task)
                .to_db()
        })
    }

    pub fn get_task_sync(&self, owner_id: &str, id: &str) -> Result<Task, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM tasks WHERE id = ?1 AND owner_id = ?2",
                params![id, owner_id],
                row_to_task,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("task {id}")),
                other => DbError::Internal(other.to_string()),
            })
        })
    }

    pub fn list_tasks_sync(&self, owner_id: &str, filter: &TaskFilter) -> Result<Vec<Task>, DbError> {
        self.with_conn(|conn| {
            let mut sql = String::from("SELECT * FROM tasks WHERE owner_id = ?1");
            let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> =
                vec![Box::new(owner_id.to_string())];

            if let Some(deadline) = filter.deadline {
                param_values.push(Box::new(deadline));
                sql.push_str(&format!(" AND deadline = ?{}", param_values.len()));
            }
            if let Some(ref category) = filter.category {
                param_values.push(Box::new(category.clone()));
                sql.push_str(&format!(" AND category = ?{}", param_values.len()));
            }
            if let Some(completed) = filter.completed {
                param_values.push(Box::new(completed));
                sql.push_str(&format!(" AND completed = ?{}", param_values.len()));
            }

            sql.push_str(" ORDER BY created_at ASC");

            let params_ref: Vec<&dyn rusqlite::types::ToSql> =
                param_values.iter().map(|p| p.as_ref()).collect();

            let mut stmt = conn.prepare(&sql).to_db()?;
            let tasks = stmt
                .query_map(params_ref.as_slice(), row_to_task)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            Ok(tasks)
        })
    }

    pub fn update_task_sync(
        &self,
        owner_id: &str,
        id: &str,
        update: &UpdateTask,
    ) -> Result<Task, DbError> {
        self.with_conn(|conn| {
            let now = Utc::now();
            let mut sets = vec!["updated_at = ?1".to_string()];
            let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(now)];

            if let Some(ref text) = update.text {
                param_values.push(Box::new(text.clone()));
                sets.push(format!("text = ?{}", param_values.len()));
            }
            if let Some(ref category) = update.category {
                param_values.push(Box::new(category.clone()));
                sets.push(format!("category = ?{}", param_values.len()));
            }
            if let Some(priority) = update.priority {
                param_values.push(Box::new(priority.as_str().to_string()));
                sets.push(format!("priority = ?{}", param_values.len()));
            }
            if let Some(deadline) = update.deadline {
                param_values.push(Box::new(deadline));
                sets.push(format!("deadline = ?{}", param_values.len()));
            }
            if let Some(completed) = update.completed {
                param_values.push(Box::new(completed));
                sets.push(format!("completed = ?{}", param_values.len()));
            }

            param_values.push(Box::new(id.to_string()));
            let id_param = param_values.len();
            param_values.push(Box::new(owner_id.to_string()));
            let owner_param = param_values.len();

            let sql = format!(
                "UPDATE tasks SET {} WHERE id = ?{} AND owner_id = ?{}",
                sets.join(", "),
                id_param,
                owner_param
            );

            let params_ref: Vec<&dyn rusqlite::types::ToSql> =
                param_values.iter().map(|p| p.as_ref()).collect();

            let changed = conn.execute(&sql, params_ref.as_slice()).to_db()?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("task {id}")));
            }

            conn.query_row("SELECT * FROM tasks WHERE id = ?1", params![id], row_to_task)
                .to_db()
        })
    }

    pub fn delete_task_sync(&self, owner_id: &str, id: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "DELETE FROM tasks WHERE id = ?1 AND owner_id = ?2",
                    params![id, owner_id],
                )
                .to_db()?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("task {id}")));
            }
            Ok(())
        })
    }

    pub fn add_worked_minutes_sync(
        &self,
        owner_id: &str,
        id: &str,
        minutes: i64,
    ) -> Result<Task, DbError> {
        self.with_conn(|conn| {
            let now = Utc::now();
            let changed = conn
                .execute(
                    "UPDATE tasks
                     SET total_worked_minutes = total_worked_minutes + ?1, updated_at = ?2
                     WHERE id = ?3 AND owner_id = ?4",
                    params![minutes, now, id, owner_id],
                )
                .to_db()?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("task {id}")));
            }

            conn.query_row("SELECT * FROM tasks WHERE id = ?1", params![id], row_to_task)
                .to_db()
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use stridelog_core::task::{CreateTask, Priority, TaskFilter, UpdateTask};

    use crate::SqliteDatabase;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn setup() -> (SqliteDatabase, String) {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let user = db.create_user_sync("test@example.com", "hash").unwrap();
        (db, user.id)
    }

    fn create_input(text: &str, category: &str, deadline: &str) -> CreateTask {
        CreateTask {
            text: text.into(),
            category: category.into(),
            priority: Priority::Medium,
            deadline: d(deadline),
        }
    }

    #[test]
    fn task_crud() {
        let (db, owner) = setup();

        let task = db
            .create_task_sync(&owner, &create_input("Write report", "Work", "2024-11-10"))
            .unwrap();
        assert_eq!(task.text, "Write report");
        assert!(!task.completed);
        assert_eq!(task.total_worked_minutes, 0);

        let updated = db
            .update_task_sync(
                &owner,
                &task.id,
                &UpdateTask {
                    text: Some("Write final report".into()),
                    priority: Some(Priority::High),
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.text, "Write final report");
        assert_eq!(updated.priority, Priority::High);
        assert!(updated.completed);
        // Untouched fields survive a partial update.
        assert_eq!(updated.category, "Work");
        assert_eq!(updated.deadline, d("2024-11-10"));

        db.delete_task_sync(&owner, &task.id).unwrap();
        assert!(db.get_task_sync(&owner, &task.id).is_err());
    }

    #[test]
    fn list_applies_filters() {
        let (db, owner) = setup();
        db.create_task_sync(&owner, &create_input("a", "Work", "2024-11-10"))
            .unwrap();
        db.create_task_sync(&owner, &create_input("b", "Home", "2024-11-10"))
            .unwrap();
        db.create_task_sync(&owner, &create_input("c", "Work", "2024-11-11"))
            .unwrap();

        let all = db.list_tasks_sync(&owner, &TaskFilter::default()).unwrap();
        assert_eq!(all.len(), 3);

        let on_tenth = db
            .list_tasks_sync(
                &owner,
                &TaskFilter {
                    deadline: Some(d("2024-11-10")),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(on_tenth.len(), 2);

        let work_on_tenth = db
            .list_tasks_sync(
                &owner,
                &TaskFilter {
                    deadline: Some(d("2024-11-10")),
                    category: Some("Work".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(work_on_tenth.len(), 1);
        assert_eq!(work_on_tenth[0].text, "a");
    }

    #[test]
    fn worked_minutes_accumulate() {
        let (db, owner) = setup();
        let task = db
            .create_task_sync(&owner, &create_input("deep work", "Work", "2024-11-10"))
            .unwrap();

        db.add_worked_minutes_sync(&owner, &task.id, 25).unwrap();
        let after = db.add_worked_minutes_sync(&owner, &task.id, 25).unwrap();
        assert_eq!(after.total_worked_minutes, 50);
    }

    #[test]
    fn tasks_are_partitioned_by_owner() {
        let (db, owner) = setup();
        let other = db.create_user_sync("other@example.com", "hash").unwrap();

        let task = db
            .create_task_sync(&owner, &create_input("mine", "Work", "2024-11-10"))
            .unwrap();

        assert!(db.get_task_sync(&other.id, &task.id).is_err());
        assert!(db
            .list_tasks_sync(&other.id, &TaskFilter::default())
            .unwrap()
            .is_empty());
        assert!(db.add_worked_minutes_sync(&other.id, &task.id, 5).is_err());
        assert!(db.delete_task_sync(&other.id, &task.id).is_err());
    }
}
