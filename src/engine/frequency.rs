//! Frequency policy: maps (habit, date) to a per-day target count.

use crate::db::models::{FrequencyType, Habit};
use chrono::{Datelike, NaiveDate};

/// Monday-first weekday index in 0..=6, matching the custom-schedule mask.
fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}

/// Per-day target for a habit: 1 when the date is scheduled, 0 otherwise.
/// Flexible habits are eligible every day; their quota lives in
/// [`weekly_target_total`]. A missing mask or missing slot counts as
/// unscheduled rather than panicking.
pub fn target_for_date(habit: &Habit, date: NaiveDate) -> i64 {
    let weekday = weekday_index(date);
    match habit.frequency_type {
        FrequencyType::Daily => 1,
        FrequencyType::Weekdays => {
            if weekday < 5 {
                1
            } else {
                0
            }
        }
        FrequencyType::Weekends => {
            if weekday >= 5 {
                1
            } else {
                0
            }
        }
        FrequencyType::Custom => habit
            .custom_schedule
            .as_ref()
            .and_then(|mask| mask.get(weekday))
            .map(|&slot| if slot > 0 { 1 } else { 0 })
            .unwrap_or(0),
        FrequencyType::Flexible => 1,
    }
}

pub fn is_scheduled_for(habit: &Habit, date: NaiveDate) -> bool {
    target_for_date(habit, date) > 0
}

/// Weekly quota: the configured target for flexible habits, the number of
/// scheduled days otherwise.
pub fn weekly_target_total(habit: &Habit) -> i64 {
    match habit.frequency_type {
        FrequencyType::Flexible => habit.weekly_target,
        FrequencyType::Custom => habit
            .custom_schedule
            .as_ref()
            .map(|mask| mask.iter().filter(|&&slot| slot > 0).count() as i64)
            .unwrap_or(0),
        FrequencyType::Daily => 7,
        FrequencyType::Weekdays => 5,
        FrequencyType::Weekends => 2,
    }
}

/// Occurrences required to satisfy one day, clamped to at least 1.
pub fn daily_requirement(habit: &Habit) -> i64 {
    habit.times_per_day.max(1)
}

/// Uniform "day met" predicate: the date is scheduled and the tally reached
/// `times_per_day`. Used by the streak calculator and the daily summaries.
pub fn day_met(habit: &Habit, date: NaiveDate, actual: i64) -> bool {
    target_for_date(habit, date) > 0 && actual >= daily_requirement(habit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::FrequencyType;
    use crate::engine::habit_fixture;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn daily_targets_one_every_day() {
        let habit = habit_fixture(FrequencyType::Daily);
        // 2024-06-03 is a Monday.
        for offset in 0..14 {
            let d = date(2024, 6, 3) + chrono::Days::new(offset);
            assert_eq!(target_for_date(&habit, d), 1);
        }
    }

    #[test]
    fn weekdays_targets_monday_through_friday_only() {
        let habit = habit_fixture(FrequencyType::Weekdays);
        let monday = date(2024, 6, 3);
        for offset in 0..7 {
            let d = monday + chrono::Days::new(offset);
            let expected = if offset < 5 { 1 } else { 0 };
            assert_eq!(target_for_date(&habit, d), expected, "{d}");
        }
    }

    #[test]
    fn weekends_targets_saturday_and_sunday_only() {
        let habit = habit_fixture(FrequencyType::Weekends);
        assert_eq!(target_for_date(&habit, date(2024, 6, 7)), 0); // Fri
        assert_eq!(target_for_date(&habit, date(2024, 6, 8)), 1); // Sat
        assert_eq!(target_for_date(&habit, date(2024, 6, 9)), 1); // Sun
    }

    #[test]
    fn custom_mask_clamps_positive_entries_to_one() {
        let mut habit = habit_fixture(FrequencyType::Custom);
        habit.custom_schedule = Some(vec![3, 0, 1, 0, 1, 0, 0]);
        assert_eq!(target_for_date(&habit, date(2024, 6, 3)), 1); // Mon, entry 3
        assert_eq!(target_for_date(&habit, date(2024, 6, 4)), 0); // Tue
        assert_eq!(target_for_date(&habit, date(2024, 6, 5)), 1); // Wed
    }

    #[test]
    fn custom_without_mask_is_never_scheduled() {
        let habit = habit_fixture(FrequencyType::Custom);
        assert_eq!(target_for_date(&habit, date(2024, 6, 3)), 0);
        assert_eq!(weekly_target_total(&habit), 0);
    }

    #[test]
    fn short_mask_treats_missing_slots_as_unscheduled() {
        let mut habit = habit_fixture(FrequencyType::Custom);
        habit.custom_schedule = Some(vec![1, 1]);
        assert_eq!(target_for_date(&habit, date(2024, 6, 4)), 1); // Tue, slot 1
        assert_eq!(target_for_date(&habit, date(2024, 6, 9)), 0); // Sun, slot 6 missing
    }

    #[test]
    fn flexible_is_always_eligible() {
        let habit = habit_fixture(FrequencyType::Flexible);
        for offset in 0..7 {
            let d = date(2024, 6, 3) + chrono::Days::new(offset);
            assert_eq!(target_for_date(&habit, d), 1);
        }
    }

    #[test]
    fn weekly_totals_per_mode() {
        assert_eq!(weekly_target_total(&habit_fixture(FrequencyType::Daily)), 7);
        assert_eq!(weekly_target_total(&habit_fixture(FrequencyType::Weekdays)), 5);
        assert_eq!(weekly_target_total(&habit_fixture(FrequencyType::Weekends)), 2);

        let mut flexible = habit_fixture(FrequencyType::Flexible);
        flexible.weekly_target = 5;
        assert_eq!(weekly_target_total(&flexible), 5);

        let mut custom = habit_fixture(FrequencyType::Custom);
        custom.custom_schedule = Some(vec![1, 0, 2, 0, 1, 0, 0]);
        assert_eq!(weekly_target_total(&custom), 3);
    }

    #[test]
    fn day_met_requires_schedule_and_times_per_day() {
        let mut habit = habit_fixture(FrequencyType::Weekdays);
        habit.times_per_day = 2;
        let monday = date(2024, 6, 3);
        let saturday = date(2024, 6, 8);
        assert!(!day_met(&habit, monday, 1));
        assert!(day_met(&habit, monday, 2));
        // Off-schedule days are never met regardless of the tally.
        assert!(!day_met(&habit, saturday, 5));
    }
}
