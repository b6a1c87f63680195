//! Habit scheduling & streak engine.
//!
//! Pure date arithmetic over a habit's configuration and its per-date
//! check-in counts; no storage or HTTP concerns. The stores feed it count
//! maps, the handlers serialize what comes out.

pub mod frequency;
pub mod streak;
pub mod week;

pub use frequency::{day_met, daily_requirement, is_scheduled_for, target_for_date, weekly_target_total};
pub use streak::current_streak;
pub use week::{DayStatus, WeekView, iso_week_start, week_dates, week_view};

#[cfg(test)]
pub(crate) fn habit_fixture(frequency_type: crate::db::models::FrequencyType) -> crate::db::models::Habit {
    use chrono::Utc;

    crate::db::models::Habit {
        id: 1,
        user_id: 1,
        name: "read".to_string(),
        description: None,
        icon: None,
        color: "#3B82F6".to_string(),
        frequency_type,
        weekly_target: 7,
        times_per_day: 1,
        custom_schedule: None,
        allow_overflow: false,
        is_active: true,
        is_archived: false,
        archived_at: None,
        sort_order: 0,
        created_at: Utc::now(),
    }
}
