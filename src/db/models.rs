use crate::error::FlowError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            pub fn parse(s: &str) -> Result<Self, FlowError> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(FlowError::InvalidInput(format!(
                        "unknown {}: {other:?}",
                        stringify!($name)
                    ))),
                }
            }
        }
    };
}

string_enum! {
    /// How a habit's per-day target is derived. Stored as lowercase TEXT.
    FrequencyType {
        Daily => "daily",
        Weekdays => "weekdays",
        Weekends => "weekends",
        Custom => "custom",
        Flexible => "flexible",
    }
}

string_enum! {
    TaskType {
        Task => "task",
        Todo => "todo",
    }
}

string_enum! {
    TaskStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

string_enum! {
    TaskPriority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
}

impl TaskPriority {
    /// Numeric wire representation (1 = low .. 4 = urgent).
    pub fn as_number(&self) -> i64 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Urgent => 4,
        }
    }

    pub fn from_number(n: i64) -> Self {
        match n {
            1 => Self::Low,
            3 => Self::High,
            4 => Self::Urgent,
            _ => Self::Medium,
        }
    }

    pub fn serialize_number<S>(value: &Self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i64(value.as_number())
    }
}

string_enum! {
    ProjectStatus {
        Planning => "planning",
        Active => "active",
        Paused => "paused",
        Completed => "completed",
        Archived => "archived",
    }
}

string_enum! {
    GoalPeriod {
        Life => "life",
        Year => "year",
        Quarter => "quarter",
        Month => "month",
    }
}

string_enum! {
    GoalStatus {
        Active => "active",
        Completed => "completed",
        Archived => "archived",
    }
}

string_enum! {
    ReviewPeriod {
        Daily => "daily",
        Weekly => "weekly",
        Monthly => "monthly",
        Quarterly => "quarterly",
        Yearly => "yearly",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A recurring behavior tracked against a frequency policy.
/// `custom_schedule`, when present, holds exactly 7 Monday-first entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Habit {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: String,
    pub frequency_type: FrequencyType,
    pub weekly_target: i64,
    pub times_per_day: i64,
    pub custom_schedule: Option<Vec<i64>>,
    pub allow_overflow: bool,
    pub is_active: bool,
    pub is_archived: bool,
    pub archived_at: Option<DateTime<Utc>>,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
}

/// One check-in row per (habit, calendar date); count is a non-negative tally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HabitLog {
    pub id: i64,
    pub habit_id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub count: i64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub project_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub task_type: TaskType,
    pub status: TaskStatus,
    #[serde(serialize_with = "TaskPriority::serialize_number")]
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_type: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub estimated_pomodoros: Option<i64>,
    pub actual_pomodoros: Option<i64>,
    pub is_inbox: bool,
    /// Denormalized from the owning project for list views.
    pub project_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Project {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub start_date: Option<NaiveDate>,
    pub target_date: Option<NaiveDate>,
    pub completed_date: Option<NaiveDate>,
    pub progress: f64,
    pub outline: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A project milestone; project progress is derived from these.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProjectGoal {
    pub id: i64,
    pub project_id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
}

/// OKR objective; key results are loaded alongside, not a column.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Goal {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub period: GoalPeriod,
    pub year: Option<i64>,
    pub quarter: Option<i64>,
    pub month: Option<i64>,
    pub area: Option<String>,
    pub status: GoalStatus,
    pub progress: f64,
    pub project_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub key_results: Vec<KeyResult>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct KeyResult {
    pub id: i64,
    pub goal_id: i64,
    pub title: String,
    pub target_value: f64,
    pub current_value: f64,
    pub unit: Option<String>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub period: ReviewPeriod,
    pub year: i64,
    pub quarter: Option<i64>,
    pub month: Option<i64>,
    pub week: Option<i64>,
    pub date: Option<NaiveDate>,
    pub highlights: Option<String>,
    pub challenges: Option<String>,
    pub learnings: Option<String>,
    pub next_steps: Option<String>,
    pub gratitude: Option<String>,
    pub mood: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_type_round_trips_through_text() {
        for (variant, text) in [
            (FrequencyType::Daily, "daily"),
            (FrequencyType::Weekdays, "weekdays"),
            (FrequencyType::Weekends, "weekends"),
            (FrequencyType::Custom, "custom"),
            (FrequencyType::Flexible, "flexible"),
        ] {
            assert_eq!(variant.as_str(), text);
            assert_eq!(FrequencyType::parse(text).unwrap(), variant);
        }
        assert!(FrequencyType::parse("biweekly").is_err());
    }

    #[test]
    fn task_priority_numeric_mapping() {
        assert_eq!(TaskPriority::from_number(1), TaskPriority::Low);
        assert_eq!(TaskPriority::from_number(4), TaskPriority::Urgent);
        // Unknown numbers fall back to medium.
        assert_eq!(TaskPriority::from_number(9), TaskPriority::Medium);
        assert_eq!(TaskPriority::Urgent.as_number(), 4);
    }

    #[test]
    fn task_status_uses_snake_case_text() {
        assert_eq!(TaskStatus::InProgress.as_str(), "in_progress");
        assert_eq!(
            TaskStatus::parse("in_progress").unwrap(),
            TaskStatus::InProgress
        );
    }
}
