use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::habit::Frequency;

/// Day-of-week tag for custom habit schedules. Serialized with the short
/// English names the stored documents use ("Sun" .. "Sat").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayOfWeek {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl DayOfWeek {
    pub const ALL: &[DayOfWeek] = &[
        DayOfWeek::Sun,
        DayOfWeek::Mon,
        DayOfWeek::Tue,
        DayOfWeek::Wed,
        DayOfWeek::Thu,
        DayOfWeek::Fri,
        DayOfWeek::Sat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Sun => "Sun",
            DayOfWeek::Mon => "Mon",
            DayOfWeek::Tue => "Tue",
            DayOfWeek::Wed => "Wed",
            DayOfWeek::Thu => "Thu",
            DayOfWeek::Fri => "Fri",
            DayOfWeek::Sat => "Sat",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "Sun" => Some(DayOfWeek::Sun),
            "Mon" => Some(DayOfWeek::Mon),
            "Tue" => Some(DayOfWeek::Tue),
            "Wed" => Some(DayOfWeek::Wed),
            "Thu" => Some(DayOfWeek::Thu),
            "Fri" => Some(DayOfWeek::Fri),
            "Sat" => Some(DayOfWeek::Sat),
            _ => None,
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Sun => DayOfWeek::Sun,
            Weekday::Mon => DayOfWeek::Mon,
            Weekday::Tue => DayOfWeek::Tue,
            Weekday::Wed => DayOfWeek::Wed,
            Weekday::Thu => DayOfWeek::Thu,
            Weekday::Fri => DayOfWeek::Fri,
            Weekday::Sat => DayOfWeek::Sat,
        }
    }
}

impl std::fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a habit is due on `target`, at calendar-day granularity.
///
/// Nothing is due before the start date, for any frequency. Weekly habits
/// recur on the weekday of the start date (every 7th day from it); custom
/// habits recur on their tagged weekdays.
pub fn is_due(
    frequency: Frequency,
    start_date: NaiveDate,
    custom_days: &[DayOfWeek],
    target: NaiveDate,
) -> bool {
    if target < start_date {
        return false;
    }
    match frequency {
        Frequency::Daily => true,
        Frequency::Weekly => target.signed_duration_since(start_date).num_days() % 7 == 0,
        Frequency::Custom => custom_days.contains(&DayOfWeek::of(target)),
    }
}

/// A Sunday-started calendar week, the unit the week strip navigates by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    start: NaiveDate,
}

impl WeekWindow {
    /// The week containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let back = date.weekday().num_days_from_sunday() as u64;
        Self {
            start: date - Days::new(back),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.start + Days::new(6)
    }

    pub fn prev(&self) -> Self {
        Self {
            start: self.start - Days::new(7),
        }
    }

    pub fn next(&self) -> Self {
        Self {
            start: self.start + Days::new(7),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end()
    }

    /// The seven dates of this week, Sunday first.
    pub fn days(&self) -> [NaiveDate; 7] {
        std::array::from_fn(|i| self.start + Days::new(i as u64))
    }
}
