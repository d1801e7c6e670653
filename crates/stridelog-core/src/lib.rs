pub mod account;
pub mod error;
pub mod focus;
pub mod habit;
pub mod notify;
pub mod schedule;
pub mod streak;
pub mod task;

pub use error::MarkError;
pub use habit::{Frequency, Habit, MarkStatus};
pub use schedule::{DayOfWeek, WeekWindow};
pub use streak::StreakSummary;
pub use task::{Priority, Task};
