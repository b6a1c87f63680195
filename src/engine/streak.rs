//! Streak calculator: consecutive satisfied days, counted backward.

use crate::db::models::Habit;
use crate::engine::frequency::{day_met, is_scheduled_for};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Consecutive qualifying days ending at (or just before) `as_of`.
///
/// `as_of` itself not being finished yet neither breaks nor inflates an
/// in-progress streak: the walk starts one day earlier in that case. Days the
/// policy doesn't schedule are skipped outright. The walk is bounded by the
/// earliest recorded check-in, so an empty ledger yields 0.
pub fn current_streak(habit: &Habit, as_of: NaiveDate, counts: &HashMap<NaiveDate, i64>) -> u32 {
    let Some(earliest) = counts.keys().min().copied() else {
        return 0;
    };
    let actual = |date: NaiveDate| counts.get(&date).copied().unwrap_or(0);

    let mut cursor = as_of;
    if !day_met(habit, cursor, actual(cursor)) {
        let Some(prev) = cursor.pred_opt() else {
            return 0;
        };
        cursor = prev;
    }

    let mut streak = 0;
    while cursor >= earliest {
        if is_scheduled_for(habit, cursor) {
            if day_met(habit, cursor, actual(cursor)) {
                streak += 1;
            } else {
                break;
            }
        }
        match cursor.pred_opt() {
            Some(prev) => cursor = prev,
            None => break,
        }
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::FrequencyType;
    use crate::engine::habit_fixture;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn counts(entries: &[(NaiveDate, i64)]) -> HashMap<NaiveDate, i64> {
        entries.iter().copied().collect()
    }

    #[test]
    fn gap_breaks_the_streak() {
        let habit = habit_fixture(FrequencyType::Daily);
        let ledger = counts(&[
            (date(2024, 6, 1), 1),
            (date(2024, 6, 2), 1),
            (date(2024, 6, 3), 1),
        ]);
        // 2024-06-04 has no check-in; evaluated the day after, the run is gone.
        assert_eq!(current_streak(&habit, date(2024, 6, 5), &ledger), 0);
    }

    #[test]
    fn streak_counts_back_from_a_satisfied_day() {
        let habit = habit_fixture(FrequencyType::Daily);
        let ledger = counts(&[
            (date(2024, 6, 1), 1),
            (date(2024, 6, 2), 1),
            (date(2024, 6, 3), 1),
        ]);
        assert_eq!(current_streak(&habit, date(2024, 6, 3), &ledger), 3);
    }

    #[test]
    fn unfinished_today_does_not_break_yesterdays_run() {
        let habit = habit_fixture(FrequencyType::Daily);
        let ledger = counts(&[(date(2024, 6, 2), 1), (date(2024, 6, 3), 1)]);
        assert_eq!(current_streak(&habit, date(2024, 6, 4), &ledger), 2);
    }

    #[test]
    fn empty_ledger_yields_zero() {
        let habit = habit_fixture(FrequencyType::Daily);
        assert_eq!(current_streak(&habit, date(2024, 6, 4), &HashMap::new()), 0);
    }

    #[test]
    fn unscheduled_days_are_skipped_not_broken() {
        let habit = habit_fixture(FrequencyType::Weekdays);
        // Thu 6th and Fri 7th checked in; Mon 10th evaluated with the
        // weekend in between untouched.
        let ledger = counts(&[(date(2024, 6, 6), 1), (date(2024, 6, 7), 1)]);
        assert_eq!(current_streak(&habit, date(2024, 6, 10), &ledger), 2);
    }

    #[test]
    fn times_per_day_gates_satisfaction() {
        let mut habit = habit_fixture(FrequencyType::Daily);
        habit.times_per_day = 2;
        let ledger = counts(&[
            (date(2024, 6, 2), 2),
            (date(2024, 6, 3), 2),
            (date(2024, 6, 4), 1), // under target, breaks here
        ]);
        assert_eq!(current_streak(&habit, date(2024, 6, 4), &ledger), 2);
    }

    #[test]
    fn flexible_habit_streak_uses_times_per_day() {
        let habit = habit_fixture(FrequencyType::Flexible);
        let ledger = counts(&[(date(2024, 6, 2), 1), (date(2024, 6, 3), 3)]);
        assert_eq!(current_streak(&habit, date(2024, 6, 3), &ledger), 2);
    }
}
