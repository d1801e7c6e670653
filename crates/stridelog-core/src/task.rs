use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Task urgency. Wire names match the stored documents ("High", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: &[Priority] = &[Priority::High, Priority::Medium, Priority::Low];

    /// Sort rank; lower sorts first.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "High" => Some(Priority::High),
            "Medium" => Some(Priority::Medium),
            "Low" => Some(Priority::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A one-off item with a deadline, optionally time-tracked by the focus
/// timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub owner_id: String,
    pub text: String,
    pub category: String,
    pub priority: Priority,
    pub deadline: NaiveDate,
    pub completed: bool,
    /// Minutes accumulated by completed focus work phases.
    pub total_worked_minutes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Deadline strictly before `today`. A task due today is not overdue.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.deadline < today
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub text: String,
    #[serde(default)]
    pub category: String,
    pub priority: Priority,
    pub deadline: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    pub text: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub deadline: Option<NaiveDate>,
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    pub deadline: Option<NaiveDate>,
    pub category: Option<String>,
    pub completed: Option<bool>,
}

/// Tasks whose deadline falls exactly on `date`. Pure; views are always
/// re-derived from the latest fetched set rather than patched in place.
pub fn select_for_date(tasks: &[Task], date: NaiveDate) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| t.deadline == date)
        .cloned()
        .collect()
}

/// Stable sort by priority rank: High, Medium, Low.
pub fn sort_by_priority(tasks: &mut [Task]) {
    tasks.sort_by_key(|t| t.priority.rank());
}

/// Group tasks by category, preserving first-seen group order and
/// insertion order within each group.
pub fn group_by_category(tasks: &[Task]) -> Vec<(String, Vec<Task>)> {
    let mut groups: Vec<(String, Vec<Task>)> = Vec::new();
    for task in tasks {
        match groups.iter_mut().find(|(name, _)| *name == task.category) {
            Some((_, bucket)) => bucket.push(task.clone()),
            None => groups.push((task.category.clone(), vec![task.clone()])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn task(text: &str, category: &str, priority: Priority, deadline: &str) -> Task {
        let now = Utc::now();
        Task {
            id: text.to_ascii_lowercase(),
            owner_id: "u1".into(),
            text: text.into(),
            category: category.into(),
            priority,
            deadline: d(deadline),
            completed: false,
            total_worked_minutes: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn priority_parse_roundtrip() {
        for p in Priority::ALL {
            assert_eq!(Priority::parse_str(p.as_str()), Some(*p));
        }
        assert_eq!(Priority::parse_str("high"), None);
    }

    #[test]
    fn sort_by_priority_orders_high_medium_low() {
        let mut tasks = vec![
            task("a", "Work", Priority::Low, "2024-11-05"),
            task("b", "Work", Priority::High, "2024-11-05"),
            task("c", "Work", Priority::Medium, "2024-11-05"),
        ];
        sort_by_priority(&mut tasks);
        let order: Vec<Priority> = tasks.iter().map(|t| t.priority).collect();
        assert_eq!(order, vec![Priority::High, Priority::Medium, Priority::Low]);
    }

    #[test]
    fn sort_by_priority_is_stable() {
        let mut tasks = vec![
            task("first", "Work", Priority::High, "2024-11-05"),
            task("second", "Work", Priority::High, "2024-11-05"),
        ];
        sort_by_priority(&mut tasks);
        assert_eq!(tasks[0].text, "first");
        assert_eq!(tasks[1].text, "second");
    }

    #[test]
    fn select_for_date_matches_exact_deadline() {
        let tasks = vec![
            task("a", "Work", Priority::Low, "2024-11-05"),
            task("b", "Home", Priority::High, "2024-11-06"),
            task("c", "Work", Priority::Medium, "2024-11-05"),
        ];
        let selected = select_for_date(&tasks, d("2024-11-05"));
        let texts: Vec<&str> = selected.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "c"]);
        assert!(select_for_date(&tasks, d("2024-11-07")).is_empty());
    }

    #[test]
    fn group_by_category_preserves_insertion_order() {
        let tasks = vec![
            task("a", "Work", Priority::Low, "2024-11-05"),
            task("b", "Home", Priority::High, "2024-11-05"),
            task("c", "Work", Priority::Medium, "2024-11-05"),
        ];
        let groups = group_by_category(&tasks);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "Work");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[0].1[0].text, "a");
        assert_eq!(groups[0].1[1].text, "c");
        assert_eq!(groups[1].0, "Home");
    }

    #[test]
    fn overdue_is_strictly_before_today() {
        let t = task("a", "Work", Priority::Low, "2024-11-05");
        assert!(t.is_overdue(d("2024-11-06")));
        assert!(!t.is_overdue(d("2024-11-05")));
        assert!(!t.is_overdue(d("2024-11-04")));
    }
}
