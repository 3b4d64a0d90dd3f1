//! Longest consecutive-day run over habit day records

use crate::{HabitDay, HabitDayStatus};
use chrono::NaiveDate;

/// Longest run of consecutive completed calendar days
///
/// `days` must be sorted by ascending date. A non-completed record breaks the
/// run, and so does a gap of more than one day. The previous-record reference
/// advances on every record regardless of status.
pub fn longest_streak<'a>(days: impl IntoIterator<Item = &'a HabitDay>) -> u64 {
    longest_run(days.into_iter().map(|d| (d.date, d.status)))
}

/// Same walk over bare `(date, status)` pairs
pub fn longest_run(records: impl IntoIterator<Item = (NaiveDate, HabitDayStatus)>) -> u64 {
    let mut max_run = 0u64;
    let mut current_run = 0u64;
    let mut last_date: Option<NaiveDate> = None;

    for (date, status) in records {
        if status == HabitDayStatus::Completed {
            let follows = last_date
                .map(|last| (date - last).num_days() == 1)
                .unwrap_or(false);
            current_run = if follows { current_run + 1 } else { 1 };
            max_run = max_run.max(current_run);
        } else {
            current_run = 0;
        }
        last_date = Some(date);
    }

    max_run
}

#[cfg(test)]
mod tests {
    use super::*;
    use HabitDayStatus::*;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap() + chrono::Duration::days(offset)
    }

    #[test]
    fn test_skip_breaks_the_run() {
        let records = vec![
            (day(0), Completed),
            (day(1), Completed),
            (day(2), Completed),
            (day(3), Skipped),
            (day(4), Completed),
        ];
        assert_eq!(longest_run(records), 3);
    }

    #[test]
    fn test_gap_breaks_the_run() {
        let records = vec![(day(0), Completed), (day(2), Completed), (day(3), Completed)];
        assert_eq!(longest_run(records), 2);
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(longest_run(Vec::new()), 0);
        assert_eq!(longest_run(vec![(day(0), Empty)]), 0);
    }

    #[test]
    fn test_completed_after_non_completed_neighbour_starts_fresh() {
        // Empty on day 1 resets, day 2 follows day 1 but the run restarts at 1
        let records = vec![
            (day(0), Completed),
            (day(1), Empty),
            (day(2), Completed),
            (day(3), Completed),
        ];
        assert_eq!(longest_run(records), 2);
    }
}
