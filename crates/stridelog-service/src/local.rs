use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tracing::debug;

use stridelog_core::focus::FocusTally;
use stridelog_core::habit::{CreateHabit, Frequency, Habit, MarkStatus, UpdateHabit};
use stridelog_core::task::{CreateTask, Task, TaskFilter, UpdateTask};
use stridelog_db::Database;

use crate::traits::{ServiceError, TrackerService};

/// Service backed directly by a [`Database`], used by the server and by
/// anything embedding the tracker in-process.
#[derive(Clone)]
pub struct LocalService {
    db: Arc<dyn Database>,
}

impl LocalService {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    fn validate_habit_name(name: &str) -> Result<(), ServiceError> {
        if name.trim().is_empty() {
            return Err(ServiceError::InvalidInput("habit name is required".into()));
        }
        Ok(())
    }

    fn validate_custom_days(
        frequency: Frequency,
        custom_days: &[stridelog_core::schedule::DayOfWeek],
    ) -> Result<(), ServiceError> {
        if frequency == Frequency::Custom && custom_days.is_empty() {
            return Err(ServiceError::InvalidInput(
                "custom frequency requires at least one weekday".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl TrackerService for LocalService {
    async fn create_habit(
        &self,
        owner_id: &str,
        input: CreateHabit,
    ) -> Result<Habit, ServiceError> {
        Self::validate_habit_name(&input.name)?;
        Self::validate_custom_days(input.frequency, &input.custom_days)?;
        let habit = self.db.create_habit(owner_id, &input).await?;
        debug!(habit_id = %habit.id, "created habit");
        Ok(habit)
    }

    async fn get_habit(&self, owner_id: &str, id: &str) -> Result<Habit, ServiceError> {
        Ok(self.db.get_habit(owner_id, id).await?)
    }

    async fn list_habits(&self, owner_id: &str) -> Result<Vec<Habit>, ServiceError> {
        Ok(self.db.list_habits(owner_id).await?)
    }

    async fn habits_due_on(
        &self,
        owner_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Habit>, ServiceError> {
        let habits = self.db.list_habits(owner_id).await?;
        Ok(habits.into_iter().filter(|h| h.is_due_on(date)).collect())
    }

    async fn update_habit(
        &self,
        owner_id: &str,
        id: &str,
        update: UpdateHabit,
    ) -> Result<Habit, ServiceError> {
        if let Some(ref name) = update.name {
            Self::validate_habit_name(name)?;
        }
        // A frequency switch to Custom must leave the habit with at least
        // one weekday, whether the days come with the update or were
        // already stored.
        if update.frequency == Some(Frequency::Custom) {
            match update.custom_days {
                Some(ref days) => Self::validate_custom_days(Frequency::Custom, days)?,
                None => {
                    let existing = self.db.get_habit(owner_id, id).await?;
                    Self::validate_custom_days(Frequency::Custom, &existing.custom_days)?;
                }
            }
        }
        Ok(self.db.update_habit(owner_id, id, &update).await?)
    }

    async fn delete_habit(&self, owner_id: &str, id: &str) -> Result<(), ServiceError> {
        Ok(self.db.delete_habit(owner_id, id).await?)
    }

    async fn mark_habit(
        &self,
        owner_id: &str,
        id: &str,
        date: NaiveDate,
        status: MarkStatus,
    ) -> Result<Habit, ServiceError> {
        let mut habit = self.db.get_habit(owner_id, id).await?;
        habit
            .mark(date, status, Utc::now().date_naive())
            .map_err(|e| ServiceError::InvalidInput(e.to_string()))?;
        let saved = self
            .db
            .set_habit_marks(
                owner_id,
                id,
                &habit.success_dates,
                &habit.failure_dates,
                habit.streaks,
            )
            .await?;
        debug!(habit_id = %id, %date, %status, "marked habit");
        Ok(saved)
    }

    async fn create_task(&self, owner_id: &str, input: CreateTask) -> Result<Task, ServiceError> {
        if input.text.trim().is_empty() {
            return Err(ServiceError::InvalidInput("task text is required".into()));
        }
        let task = self.db.create_task(owner_id, &input).await?;
        debug!(task_id = %task.id, "created task");
        Ok(task)
    }

    async fn get_task(&self, owner_id: &str, id: &str) -> Result<Task, ServiceError> {
        Ok(self.db.get_task(owner_id, id).await?)
    }

    async fn list_tasks(
        &self,
        owner_id: &str,
        filter: TaskFilter,
    ) -> Result<Vec<Task>, ServiceError> {
        Ok(self.db.list_tasks(owner_id, &filter).await?)
    }

    async fn update_task(
        &self,
        owner_id: &str,
        id: &str,
        update: UpdateTask,
    ) -> Result<Task, ServiceError> {
        if let Some(ref text) = update.text {
            if text.trim().is_empty() {
                return Err(ServiceError::InvalidInput("task text is required".into()));
            }
        }
        Ok(self.db.update_task(owner_id, id, &update).await?)
    }

    async fn delete_task(&self, owner_id: &str, id: &str) -> Result<(), ServiceError> {
        Ok(self.db.delete_task(owner_id, id).await?)
    }

    async fn add_worked_minutes(
        &self,
        owner_id: &str,
        id: &str,
        minutes: i64,
    ) -> Result<Task, ServiceError> {
        if minutes <= 0 {
            return Err(ServiceError::InvalidInput(
                "worked minutes must be positive".into(),
            ));
        }
        Ok(self.db.add_worked_minutes(owner_id, id, minutes).await?)
    }

    async fn focus_tally(&self, owner_id: &str) -> Result<FocusTally, ServiceError> {
        Ok(self.db.get_focus_tally(owner_id).await?)
    }

    async fn complete_focus_session(&self, owner_id: &str) -> Result<FocusTally, ServiceError> {
        Ok(self.db.increment_focus_tally(owner_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use stridelog_core::schedule::DayOfWeek;
    use stridelog_core::streak::StreakSummary;
    use stridelog_core::task::Priority;
    use stridelog_db::SqliteDatabase;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    async fn setup() -> (LocalService, String) {
        let db = Arc::new(SqliteDatabase::open_in_memory().unwrap());
        let user = db.create_user("test@example.com", "hash").await.unwrap();
        (LocalService::new(db), user.id)
    }

    fn daily_habit(name: &str, start: &str) -> CreateHabit {
        CreateHabit {
            name: name.into(),
            frequency: Frequency::Daily,
            custom_days: Vec::new(),
            start_date: d(start),
        }
    }

    #[tokio::test]
    async fn rejects_empty_habit_name() {
        let (svc, owner) = setup().await;
        let err = svc.create_habit(&owner, daily_habit("  ", "2024-11-01")).await;
        assert!(matches!(err, Err(ServiceError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn rejects_custom_frequency_without_days() {
        let (svc, owner) = setup().await;
        let input = CreateHabit {
            frequency: Frequency::Custom,
            ..daily_habit("Gym", "2024-11-01")
        };
        let err = svc.create_habit(&owner, input).await;
        assert!(matches!(err, Err(ServiceError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn switching_to_custom_requires_days_somewhere() {
        let (svc, owner) = setup().await;
        let habit = svc
            .create_habit(&owner, daily_habit("Gym", "2024-11-01"))
            .await
            .unwrap();

        let err = svc
            .update_habit(
                &owner,
                &habit.id,
                UpdateHabit {
                    frequency: Some(Frequency::Custom),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(err, Err(ServiceError::InvalidInput(_))));

        let ok = svc
            .update_habit(
                &owner,
                &habit.id,
                UpdateHabit {
                    frequency: Some(Frequency::Custom),
                    custom_days: Some(vec![DayOfWeek::Mon]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(ok.frequency, Frequency::Custom);
    }

    #[tokio::test]
    async fn mark_persists_dates_and_streaks() {
        let (svc, owner) = setup().await;
        let today = Utc::now().date_naive();
        let habit = svc
            .create_habit(
                &owner,
                CreateHabit {
                    name: "Read".into(),
                    frequency: Frequency::Daily,
                    custom_days: Vec::new(),
                    start_date: today - Duration::days(10),
                },
            )
            .await
            .unwrap();

        svc.mark_habit(&owner, &habit.id, today - Duration::days(1), MarkStatus::Success)
            .await
            .unwrap();
        let marked = svc
            .mark_habit(&owner, &habit.id, today, MarkStatus::Success)
            .await
            .unwrap();
        assert_eq!(marked.streaks, StreakSummary { current: 2, highest: 2 });

        // Flipping yesterday to failure shrinks the streak and moves the
        // date between sets.
        let flipped = svc
            .mark_habit(
                &owner,
                &habit.id,
                today - Duration::days(1),
                MarkStatus::Failure,
            )
            .await
            .unwrap();
        assert_eq!(flipped.streaks, StreakSummary { current: 1, highest: 1 });
        assert_eq!(flipped.failure_dates, vec![today - Duration::days(1)]);
    }

    #[tokio::test]
    async fn mark_rejects_future_and_prestart_dates() {
        let (svc, owner) = setup().await;
        let today = Utc::now().date_naive();
        let habit = svc
            .create_habit(
                &owner,
                CreateHabit {
                    name: "Read".into(),
                    frequency: Frequency::Daily,
                    custom_days: Vec::new(),
                    start_date: today - Duration::days(3),
                },
            )
            .await
            .unwrap();

        let future = svc
            .mark_habit(&owner, &habit.id, today + Duration::days(1), MarkStatus::Success)
            .await;
        assert!(matches!(future, Err(ServiceError::InvalidInput(_))));

        let prestart = svc
            .mark_habit(&owner, &habit.id, today - Duration::days(4), MarkStatus::Success)
            .await;
        assert!(matches!(prestart, Err(ServiceError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn habits_due_on_filters_by_schedule() {
        let (svc, owner) = setup().await;
        svc.create_habit(&owner, daily_habit("Daily one", "2024-11-01"))
            .await
            .unwrap();
        svc.create_habit(
            &owner,
            CreateHabit {
                name: "Mondays".into(),
                frequency: Frequency::Custom,
                custom_days: vec![DayOfWeek::Mon],
                start_date: d("2024-11-01"),
            },
        )
        .await
        .unwrap();

        // 2024-11-05 is a Tuesday.
        let due = svc.habits_due_on(&owner, d("2024-11-05")).await.unwrap();
        let names: Vec<&str> = due.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Daily one"]);
    }

    #[tokio::test]
    async fn worked_minutes_require_positive_amount() {
        let (svc, owner) = setup().await;
        let task = svc
            .create_task(
                &owner,
                CreateTask {
                    text: "deep work".into(),
                    category: "Work".into(),
                    priority: Priority::High,
                    deadline: d("2024-11-10"),
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            svc.add_worked_minutes(&owner, &task.id, 0).await,
            Err(ServiceError::InvalidInput(_))
        ));
        let after = svc.add_worked_minutes(&owner, &task.id, 25).await.unwrap();
        assert_eq!(after.total_worked_minutes, 25);
    }

    #[tokio::test]
    async fn focus_sessions_tally_per_owner() {
        let (svc, owner) = setup().await;
        assert_eq!(svc.focus_tally(&owner).await.unwrap().count, 0);
        svc.complete_focus_session(&owner).await.unwrap();
        let tally = svc.complete_focus_session(&owner).await.unwrap();
        assert_eq!(tally.count, 2);
    }
}
