use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MarkError;
use crate::schedule::{self, DayOfWeek};
use crate::streak::{compute_streaks, StreakSummary};

/// How often a habit comes due. Wire names match the stored documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Weekly,
    Custom,
}

impl Frequency {
    pub const ALL: &[Frequency] = &[Frequency::Daily, Frequency::Weekly, Frequency::Custom];

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Custom => "Custom",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "Daily" => Some(Frequency::Daily),
            "Weekly" => Some(Frequency::Weekly),
            "Custom" => Some(Frequency::Custom),
            _ => None,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome recorded for a habit on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkStatus {
    Success,
    Failure,
}

impl MarkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkStatus::Success => "success",
            MarkStatus::Failure => "failure",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "success" => Some(MarkStatus::Success),
            "failure" => Some(MarkStatus::Failure),
            _ => None,
        }
    }
}

impl fmt::Display for MarkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recurring user-defined activity tracked by date-keyed marks.
///
/// Invariants maintained by [`Habit::mark`]:
/// - a date appears in at most one of `success_dates` / `failure_dates`;
/// - both vectors stay sorted ascending with no duplicates;
/// - `streaks` always reflects the current `success_dates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub frequency: Frequency,
    /// Weekday tags; meaningful only when `frequency` is `Custom`.
    #[serde(default)]
    pub custom_days: Vec<DayOfWeek>,
    /// First date the habit can be marked.
    pub start_date: NaiveDate,
    pub success_dates: Vec<NaiveDate>,
    pub failure_dates: Vec<NaiveDate>,
    pub streaks: StreakSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Habit {
    /// Whether this habit's frequency policy requires action on `target`.
    pub fn is_due_on(&self, target: NaiveDate) -> bool {
        schedule::is_due(self.frequency, self.start_date, &self.custom_days, target)
    }

    /// Record `status` for `date`, keeping the success/failure sets
    /// mutually exclusive and the streak summary in step.
    ///
    /// Idempotent: re-marking a date with the status it already has leaves
    /// the habit unchanged. `today` bounds the future-date check so callers
    /// decide what "now" means (and tests can pin it).
    pub fn mark(
        &mut self,
        date: NaiveDate,
        status: MarkStatus,
        today: NaiveDate,
    ) -> Result<(), MarkError> {
        if date < self.start_date {
            return Err(MarkError::BeforeStart);
        }
        if date > today {
            return Err(MarkError::InFuture);
        }

        let (target, opposite) = match status {
            MarkStatus::Success => (&mut self.success_dates, &mut self.failure_dates),
            MarkStatus::Failure => (&mut self.failure_dates, &mut self.success_dates),
        };
        if let Err(pos) = target.binary_search(&date) {
            target.insert(pos, date);
        }
        if let Ok(pos) = opposite.binary_search(&date) {
            opposite.remove(pos);
        }

        self.streaks = compute_streaks(&self.success_dates);
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHabit {
    pub name: String,
    pub frequency: Frequency,
    #[serde(default)]
    pub custom_days: Vec<DayOfWeek>,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateHabit {
    pub name: Option<String>,
    pub frequency: Option<Frequency>,
    pub custom_days: Option<Vec<DayOfWeek>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn habit(start: &str) -> Habit {
        let now = Utc::now();
        Habit {
            id: "h1".into(),
            owner_id: "u1".into(),
            name: "Read".into(),
            frequency: Frequency::Daily,
            custom_days: Vec::new(),
            start_date: d(start),
            success_dates: Vec::new(),
            failure_dates: Vec::new(),
            streaks: StreakSummary::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn frequency_parse_roundtrip() {
        for f in Frequency::ALL {
            assert_eq!(Frequency::parse_str(f.as_str()), Some(*f));
        }
        assert_eq!(Frequency::parse_str("daily"), None);
    }

    #[test]
    fn mark_before_start_is_rejected() {
        let mut h = habit("2024-11-01");
        let err = h.mark(d("2024-10-31"), MarkStatus::Success, d("2024-11-10"));
        assert_eq!(err, Err(MarkError::BeforeStart));
        assert!(h.success_dates.is_empty());
    }

    #[test]
    fn mark_in_future_is_rejected() {
        let mut h = habit("2024-11-01");
        let err = h.mark(d("2024-11-11"), MarkStatus::Success, d("2024-11-10"));
        assert_eq!(err, Err(MarkError::InFuture));
        assert!(h.success_dates.is_empty());
    }

    #[test]
    fn mark_today_is_allowed() {
        let mut h = habit("2024-11-01");
        h.mark(d("2024-11-10"), MarkStatus::Success, d("2024-11-10"))
            .unwrap();
        assert_eq!(h.success_dates, vec![d("2024-11-10")]);
        assert_eq!(h.streaks, StreakSummary { current: 1, highest: 1 });
    }

    #[test]
    fn mark_is_idempotent() {
        let mut h = habit("2024-11-01");
        let today = d("2024-11-10");
        h.mark(d("2024-11-05"), MarkStatus::Success, today).unwrap();
        h.mark(d("2024-11-05"), MarkStatus::Success, today).unwrap();
        assert_eq!(h.success_dates, vec![d("2024-11-05")]);
        assert!(h.failure_dates.is_empty());
        assert_eq!(h.streaks, StreakSummary { current: 1, highest: 1 });
    }

    #[test]
    fn remarking_moves_date_between_sets() {
        let mut h = habit("2024-11-01");
        let today = d("2024-11-10");
        h.mark(d("2024-11-05"), MarkStatus::Success, today).unwrap();
        h.mark(d("2024-11-05"), MarkStatus::Failure, today).unwrap();
        assert!(h.success_dates.is_empty());
        assert_eq!(h.failure_dates, vec![d("2024-11-05")]);
        assert_eq!(h.streaks, StreakSummary::default());
    }

    #[test]
    fn marks_keep_dates_sorted() {
        let mut h = habit("2024-11-01");
        let today = d("2024-11-10");
        h.mark(d("2024-11-05"), MarkStatus::Success, today).unwrap();
        h.mark(d("2024-11-03"), MarkStatus::Success, today).unwrap();
        h.mark(d("2024-11-04"), MarkStatus::Success, today).unwrap();
        assert_eq!(
            h.success_dates,
            vec![d("2024-11-03"), d("2024-11-04"), d("2024-11-05")]
        );
        assert_eq!(h.streaks, StreakSummary { current: 3, highest: 3 });
    }

    #[test]
    fn failure_breaks_a_streak() {
        let mut h = habit("2024-11-01");
        let today = d("2024-11-10");
        h.mark(d("2024-11-03"), MarkStatus::Success, today).unwrap();
        h.mark(d("2024-11-04"), MarkStatus::Success, today).unwrap();
        h.mark(d("2024-11-05"), MarkStatus::Success, today).unwrap();
        h.mark(d("2024-11-04"), MarkStatus::Failure, today).unwrap();
        assert_eq!(h.streaks, StreakSummary { current: 1, highest: 1 });
    }

    #[test]
    fn is_due_delegates_to_frequency() {
        let mut h = habit("2024-11-01");
        h.frequency = Frequency::Custom;
        h.custom_days = vec![DayOfWeek::Mon, DayOfWeek::Wed];
        assert!(h.is_due_on(d("2024-11-04")));
        assert!(!h.is_due_on(d("2024-11-05")));
    }
}
