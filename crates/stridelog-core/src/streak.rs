use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Consecutive-day streaks over a habit's success dates.
///
/// `current` is the length of the run ending at the most recent success
/// date, whether or not that date is today. `highest` is the longest run
/// ever observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
    pub current: u32,
    pub highest: u32,
}

/// Recompute both streaks from scratch over the full success-date set.
///
/// Input order does not matter; dates are sorted ascending before the
/// walk. A run extends only when a date is exactly one calendar day after
/// its predecessor; duplicates reset the run to 1 like any other
/// non-adjacent date.
pub fn compute_streaks(success_dates: &[NaiveDate]) -> StreakSummary {
    let mut dates = success_dates.to_vec();
    dates.sort_unstable();

    let mut summary = StreakSummary::default();
    let mut run = 0u32;
    let mut previous: Option<NaiveDate> = None;

    for date in dates {
        if previous.and_then(|p| p.succ_opt()) == Some(date) {
            run += 1;
        } else {
            run = 1;
        }
        summary.current = run;
        summary.highest = summary.highest.max(run);
        previous = Some(date);
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(compute_streaks(&[]), StreakSummary::default());
    }

    #[test]
    fn single_date_is_one() {
        let s = compute_streaks(&[d("2024-01-01")]);
        assert_eq!(s, StreakSummary { current: 1, highest: 1 });
    }

    #[test]
    fn three_consecutive_days() {
        let s = compute_streaks(&[d("2024-01-01"), d("2024-01-02"), d("2024-01-03")]);
        assert_eq!(s, StreakSummary { current: 3, highest: 3 });
    }

    #[test]
    fn gap_resets_the_run() {
        let s = compute_streaks(&[d("2024-01-01"), d("2024-01-03")]);
        assert_eq!(s, StreakSummary { current: 1, highest: 1 });
    }

    #[test]
    fn current_is_trailing_run_not_global_max() {
        let s = compute_streaks(&[
            d("2024-01-01"),
            d("2024-01-02"),
            d("2024-01-03"),
            d("2024-01-10"),
            d("2024-01-11"),
        ]);
        assert_eq!(s, StreakSummary { current: 2, highest: 3 });
    }

    #[test]
    fn current_streak_ignores_recency() {
        // The trailing run counts as "current" even when the last success
        // is long past.
        let s = compute_streaks(&[d("2020-05-01"), d("2020-05-02")]);
        assert_eq!(s, StreakSummary { current: 2, highest: 2 });
    }

    #[test]
    fn unsorted_input_is_sorted_first() {
        let s = compute_streaks(&[d("2024-01-03"), d("2024-01-01"), d("2024-01-02")]);
        assert_eq!(s, StreakSummary { current: 3, highest: 3 });
    }

    #[test]
    fn month_boundary_is_consecutive() {
        let s = compute_streaks(&[d("2024-01-31"), d("2024-02-01")]);
        assert_eq!(s, StreakSummary { current: 2, highest: 2 });
    }

    #[test]
    fn leap_day_is_consecutive() {
        let s = compute_streaks(&[d("2024-02-28"), d("2024-02-29"), d("2024-03-01")]);
        assert_eq!(s, StreakSummary { current: 3, highest: 3 });
    }
}
