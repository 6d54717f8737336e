use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::plan::PlanTier;

/// Which counter a rewrite call is billed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageMode {
    GhostMini,
    GhostPro,
}

impl UsageMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageMode::GhostMini => "ghost_mini",
            UsageMode::GhostPro => "ghost_pro",
        }
    }
}

/// One row per (user, UTC calendar date). Counters only ever grow; rows are
/// never deleted. Uniqueness on (user_id, usage_date) is enforced by the
/// store and backs the increment-or-insert retry.
#[derive(Debug, Clone)]
pub struct UsageCounter {
    pub id: Uuid,
    pub user_id: Uuid,
    pub usage_date: NaiveDate,
    pub plan_id: PlanTier,
    pub ghost_mini_used: i32,
    pub ghost_pro_used: i32,
}

impl UsageCounter {
    pub fn used_for(&self, mode: UsageMode) -> i32 {
        match mode {
            UsageMode::GhostMini => self.ghost_mini_used,
            UsageMode::GhostPro => self.ghost_pro_used,
        }
    }
}
