//! Weekly aggregator: joins the frequency policy against a week of check-in
//! counts and derives per-day status plus a completion rate.

use crate::db::models::{FrequencyType, Habit};
use crate::engine::frequency::{target_for_date, weekly_target_total};
use crate::error::FlowError;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DayStatus {
    pub date: NaiveDate,
    /// Monday-first weekday index, 0..=6.
    pub weekday: u32,
    pub target: i64,
    pub actual: i64,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeekView {
    pub week_status: Vec<DayStatus>,
    /// Percentage 0..=100; flexible mode is capped at 100 for display even
    /// when the raw ratio exceeds it.
    pub weekly_rate: i64,
    pub total_actual: i64,
    pub is_perfect: bool,
    /// Flexible mode only: the weekly quota was exceeded.
    pub is_overflow: bool,
}

/// Monday of the given ISO-8601 week (week 1 contains the year's first
/// Thursday). A combination that doesn't exist is an input error.
pub fn iso_week_start(iso_year: i32, iso_week: u32) -> Result<NaiveDate, FlowError> {
    NaiveDate::from_isoywd_opt(iso_year, iso_week, Weekday::Mon).ok_or_else(|| {
        FlowError::InvalidInput(format!("no ISO week {iso_week} in year {iso_year}"))
    })
}

pub fn week_dates(week_start: NaiveDate) -> [NaiveDate; 7] {
    std::array::from_fn(|i| week_start + Days::new(i as u64))
}

/// Aggregate one habit's week. `counts` maps date -> stored check-in count;
/// missing dates read as 0.
pub fn week_view(
    habit: &Habit,
    week_start: NaiveDate,
    counts: &HashMap<NaiveDate, i64>,
) -> WeekView {
    let mut week_status = Vec::with_capacity(7);
    let mut total_actual = 0;

    for date in week_dates(week_start) {
        let target = target_for_date(habit, date);
        let actual = counts.get(&date).copied().unwrap_or(0);
        total_actual += actual;
        week_status.push(DayStatus {
            date,
            weekday: date.weekday().num_days_from_monday(),
            target,
            actual,
            completed: target > 0 && actual >= target,
        });
    }

    let weekly_target = weekly_target_total(habit);
    let (weekly_rate, is_overflow) = if habit.frequency_type == FrequencyType::Flexible {
        let raw = if weekly_target > 0 {
            percentage(total_actual, weekly_target)
        } else {
            0
        };
        (raw.min(100), total_actual > weekly_target)
    } else {
        // A scheduled day counts as done once any check-in landed on it.
        let completed_days = week_status
            .iter()
            .filter(|s| s.actual > 0 && s.target > 0)
            .count() as i64;
        let scheduled_days = week_status.iter().filter(|s| s.target > 0).count() as i64;
        let rate = if scheduled_days > 0 {
            percentage(completed_days, scheduled_days)
        } else {
            // Nothing scheduled this week: vacuously perfect.
            100
        };
        (rate, false)
    };

    WeekView {
        week_status,
        weekly_rate,
        total_actual,
        is_perfect: weekly_rate == 100,
        is_overflow,
    }
}

// Nearest integer, halves away from zero.
fn percentage(part: i64, whole: i64) -> i64 {
    (part as f64 / whole as f64 * 100.0).round() as i64
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
    fn iso_week_one_2024_starts_on_january_first() {
        assert_eq!(iso_week_start(2024, 1).unwrap(), date(2024, 1, 1));
    }

    #[test]
    fn iso_week_one_can_start_in_the_prior_gregorian_year() {
        // 2026-01-01 is a Thursday, so week 1 begins Monday 2025-12-29.
        assert_eq!(iso_week_start(2026, 1).unwrap(), date(2025, 12, 29));
    }

    #[test]
    fn iso_week_53_exists_only_in_long_years() {
        assert_eq!(iso_week_start(2020, 53).unwrap(), date(2020, 12, 28));
        assert!(iso_week_start(2024, 53).is_err());
        assert!(iso_week_start(2024, 0).is_err());
    }

    #[test]
    fn fixed_mode_rate_counts_days_not_tallies() {
        // Scheduled Mon/Wed/Fri, checked in Mon and Fri only -> 2/3 = 67%.
        let mut habit = habit_fixture(FrequencyType::Custom);
        habit.custom_schedule = Some(vec![1, 0, 1, 0, 1, 0, 0]);

        let monday = date(2024, 6, 3);
        let counts = HashMap::from([(date(2024, 6, 3), 1), (date(2024, 6, 7), 1)]);

        let view = week_view(&habit, monday, &counts);
        assert_eq!(view.weekly_rate, 67);
        assert!(!view.is_perfect);
        assert!(!view.is_overflow);
        assert_eq!(view.total_actual, 2);
        assert!(view.week_status[0].completed); // Mon
        assert!(!view.week_status[2].completed); // Wed scheduled, missed
        assert!(!view.week_status[1].completed); // Tue unscheduled, never completed
    }

    #[test]
    fn flexible_mode_caps_display_rate_and_flags_overflow() {
        let mut habit = habit_fixture(FrequencyType::Flexible);
        habit.weekly_target = 5;
        habit.allow_overflow = true;

        let monday = date(2024, 6, 3);
        // 6 total check-ins against a quota of 5: raw 120%, shown as 100%.
        let counts = HashMap::from([
            (date(2024, 6, 3), 2),
            (date(2024, 6, 4), 2),
            (date(2024, 6, 6), 2),
        ]);

        let view = week_view(&habit, monday, &counts);
        assert_eq!(view.total_actual, 6);
        assert_eq!(view.weekly_rate, 100);
        assert!(view.is_perfect);
        assert!(view.is_overflow);
    }

    #[test]
    fn flexible_mode_partial_quota_rounds_to_nearest() {
        let mut habit = habit_fixture(FrequencyType::Flexible);
        habit.weekly_target = 3;

        let monday = date(2024, 6, 3);
        let counts = HashMap::from([(date(2024, 6, 4), 2)]);

        let view = week_view(&habit, monday, &counts);
        assert_eq!(view.weekly_rate, 67); // 2/3 -> 66.7 -> 67
        assert!(!view.is_overflow);
    }

    #[test]
    fn empty_schedule_is_vacuously_perfect() {
        let mut habit = habit_fixture(FrequencyType::Custom);
        habit.custom_schedule = Some(vec![0; 7]);

        let view = week_view(&habit, date(2024, 6, 3), &HashMap::new());
        assert_eq!(view.weekly_rate, 100);
        assert!(view.is_perfect);
    }

    #[test]
    fn weekday_indices_are_monday_first() {
        let view = week_view(
            &habit_fixture(FrequencyType::Daily),
            date(2024, 6, 3),
            &HashMap::new(),
        );
        let indices: Vec<u32> = view.week_status.iter().map(|s| s.weekday).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5, 6]);
    }
}
