use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::billing::SubscriptionRepo,
    domain::entities::{
        plan::{Plan, PlanTier},
        usage::{UsageCounter, UsageMode},
    },
};

/// Plan applied to users with no live subscription.
pub const DEFAULT_PLAN_ID: PlanTier = PlanTier::Free;

// ============================================================================
// Repository Traits
// ============================================================================

#[async_trait]
pub trait PlanRepo: Send + Sync {
    async fn get_by_id(&self, id: PlanTier) -> AppResult<Option<Plan>>;
}

#[async_trait]
pub trait UsageCounterRepo: Send + Sync {
    async fn get_for_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Option<UsageCounter>>;

    /// Inserts the first counter row of the day with the given mode already
    /// consumed once. Fails with `AppError::Conflict` when another request
    /// created the row concurrently; callers re-read and increment instead.
    async fn insert_first(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        plan_id: PlanTier,
        mode: UsageMode,
    ) -> AppResult<UsageCounter>;

    async fn increment(&self, id: Uuid, mode: UsageMode, plan_id: PlanTier) -> AppResult<()>;
}

#[derive(Debug, Clone)]
pub struct RecordUsageEvent {
    pub user_id: Uuid,
    pub plan_id: PlanTier,
    pub mode: UsageMode,
    pub word_count: i32,
    pub metadata: serde_json::Value,
}

#[async_trait]
pub trait UsageEventRepo: Send + Sync {
    async fn append(&self, event: &RecordUsageEvent) -> AppResult<()>;
}

// ============================================================================
// Mode Selection
// ============================================================================

/// Picks which daily counter a rewrite draws from. The pro counter is
/// preferred; the mini counter is used only when the plan grants no pro
/// quota at all (absent or zero) while still granting mini quota.
pub fn resolve_usage_mode(plan: &Plan) -> UsageMode {
    let pro_quota = plan.limits.ghost_pro_quota.unwrap_or(0);
    let mini_quota = plan.limits.ghost_mini_quota.unwrap_or(0);
    if pro_quota <= 0 && mini_quota > 0 {
        UsageMode::GhostMini
    } else {
        UsageMode::GhostPro
    }
}

// ============================================================================
// Use Cases
// ============================================================================

pub struct QuotaUseCases {
    plan_repo: Arc<dyn PlanRepo>,
    subscription_repo: Arc<dyn SubscriptionRepo>,
    counter_repo: Arc<dyn UsageCounterRepo>,
    event_repo: Arc<dyn UsageEventRepo>,
}

impl QuotaUseCases {
    pub fn new(
        plan_repo: Arc<dyn PlanRepo>,
        subscription_repo: Arc<dyn SubscriptionRepo>,
        counter_repo: Arc<dyn UsageCounterRepo>,
        event_repo: Arc<dyn UsageEventRepo>,
    ) -> Self {
        Self {
            plan_repo,
            subscription_repo,
            counter_repo,
            event_repo,
        }
    }

    /// Resolves the plan in force for a user at `now`. No live subscription
    /// means the default plan; a plan row missing from the catalog degrades
    /// to the built-in fallback rather than failing the request.
    pub async fn resolve_active_plan(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<Plan> {
        let plan_id = self
            .subscription_repo
            .find_active_for_user(user_id, now)
            .await?
            .map(|sub| sub.plan_id)
            .unwrap_or(DEFAULT_PLAN_ID);

        let plan = self
            .plan_repo
            .get_by_id(plan_id)
            .await
            .ok()
            .flatten()
            .unwrap_or_else(Plan::fallback);
        Ok(plan)
    }

    pub async fn today_usage(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Option<UsageCounter>> {
        self.counter_repo.get_for_date(user_id, date).await
    }

    /// Consumes one unit of the given mode for the day. The uniqueness
    /// constraint on (user, date) arbitrates the first-insert race: losers
    /// observe `Conflict`, re-read the winner's row and increment it.
    pub async fn consume(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        plan_id: PlanTier,
        mode: UsageMode,
    ) -> AppResult<()> {
        if let Some(counter) = self.counter_repo.get_for_date(user_id, date).await? {
            return self.counter_repo.increment(counter.id, mode, plan_id).await;
        }

        match self
            .counter_repo
            .insert_first(user_id, date, plan_id, mode)
            .await
        {
            Ok(_) => Ok(()),
            Err(AppError::Conflict(_)) => {
                let counter = self
                    .counter_repo
                    .get_for_date(user_id, date)
                    .await?
                    .ok_or_else(|| {
                        AppError::Internal(
                            "usage counter insert conflicted but no row is visible".to_string(),
                        )
                    })?;
                self.counter_repo.increment(counter.id, mode, plan_id).await
            }
            Err(e) => Err(e),
        }
    }

    pub async fn record_event(&self, event: &RecordUsageEvent) -> AppResult<()> {
        self.event_repo.append(event).await
    }
}
