//! First-run provisioning: the single owner account and a starter set of
//! habits so a fresh database is immediately usable.

use tracing::info;

use crate::db::SqlitePool;
use crate::db::habits::{HabitDraft, HabitStore};
use crate::db::models::FrequencyType;
use crate::db::users::UserStore;
use crate::error::FlowError;

const OWNER_USERNAME: &str = "admin";
const OWNER_EMAIL: &str = "admin@example.com";

/// Ensure the owner account exists and seed starter habits on first run.
/// Returns the owner's user id. Idempotent.
pub async fn run(pool: &SqlitePool) -> Result<i64, FlowError> {
    let users = UserStore::new(pool.clone());
    let habits = HabitStore::new(pool.clone());

    let owner = match users.find_by_username(OWNER_USERNAME).await? {
        Some(user) => user,
        None => {
            let user = users.create(OWNER_USERNAME, Some(OWNER_EMAIL)).await?;
            info!(user_id = user.id, "created owner account");
            user
        }
    };

    if habits.count_all(owner.id).await? == 0 {
        for draft in starter_habits() {
            habits.create(owner.id, &draft).await?;
        }
        info!(user_id = owner.id, "seeded starter habits");
    }

    Ok(owner.id)
}

fn starter_habits() -> Vec<HabitDraft> {
    let habit = |name: &str,
                 icon: &str,
                 color: &str,
                 frequency_type: FrequencyType,
                 weekly_target: i64,
                 times_per_day: i64,
                 custom_schedule: Option<[i64; 7]>,
                 allow_overflow: bool,
                 sort_order: i64| HabitDraft {
        name: name.to_string(),
        description: None,
        icon: Some(icon.to_string()),
        color: color.to_string(),
        frequency_type,
        weekly_target,
        times_per_day,
        custom_schedule: custom_schedule.map(|m| m.to_vec()),
        allow_overflow,
        sort_order,
    };

    vec![
        habit("早睡早起", "🌙", "#6366F1", FrequencyType::Custom, 5, 1, Some([1, 1, 1, 1, 1, 0, 0]), false, 0),
        habit("早晚护肤", "✨", "#EC4899", FrequencyType::Custom, 6, 2, Some([1, 1, 1, 1, 1, 1, 0]), false, 1),
        habit("健身", "💪", "#EF4444", FrequencyType::Flexible, 5, 1, None, true, 2),
        habit("练腹肌核心", "🎯", "#F59E0B", FrequencyType::Custom, 4, 1, Some([1, 0, 1, 0, 1, 0, 1]), false, 3),
        habit("做有氧", "🏃", "#3B82F6", FrequencyType::Custom, 2, 1, Some([0, 1, 0, 0, 1, 0, 0]), false, 4),
        habit("柔韧性训练", "🧘", "#10B981", FrequencyType::Custom, 4, 1, Some([1, 0, 1, 0, 1, 0, 1]), false, 5),
        habit("肌酸", "💊", "#84CC16", FrequencyType::Custom, 7, 1, Some([1, 1, 1, 1, 1, 1, 1]), false, 6),
        habit("坚持朗读", "📖", "#8B5CF6", FrequencyType::Custom, 7, 1, Some([1, 1, 1, 1, 1, 1, 1]), false, 7),
    ]
}
