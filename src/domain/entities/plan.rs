use serde::{Deserialize, Serialize};

/// Plan identifiers. Reference data only; rows are never created at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Pro,
}

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Pro => "pro",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pro" => PlanTier::Pro,
            _ => PlanTier::Free,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Yearly => "yearly",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "yearly" => BillingCycle::Yearly,
            _ => BillingCycle::Monthly,
        }
    }

    /// Convert to Stripe's recurring interval format.
    pub fn to_stripe_interval(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "month",
            BillingCycle::Yearly => "year",
        }
    }

    /// Convert from Stripe's recurring interval format.
    pub fn from_stripe_interval(s: &str) -> Self {
        match s {
            "year" => BillingCycle::Yearly,
            _ => BillingCycle::Monthly,
        }
    }
}

/// Per-plan ceilings. `None` means unlimited and never triggers a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanLimits {
    pub max_words: Option<i32>,
    pub ghost_mini_quota: Option<i32>,
    pub ghost_pro_quota: Option<i32>,
}

impl PlanLimits {
    pub fn quota_for(&self, mode: super::usage::UsageMode) -> Option<i32> {
        match mode {
            super::usage::UsageMode::GhostMini => self.ghost_mini_quota,
            super::usage::UsageMode::GhostPro => self.ghost_pro_quota,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Plan {
    pub id: PlanTier,
    pub name: String,
    pub limits: PlanLimits,
}

impl Plan {
    /// Hard-coded default used when the catalog lookup fails. The resolver
    /// must never leave the caller without usable limits.
    pub fn fallback() -> Self {
        Plan {
            id: PlanTier::Free,
            name: "StealthWriter Free".to_string(),
            limits: PlanLimits {
                max_words: Some(1_000),
                ghost_mini_quota: Some(3),
                ghost_pro_quota: Some(0),
            },
        }
    }
}
