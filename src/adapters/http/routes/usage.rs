use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::get,
};
use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::{
    adapters::http::{app_state::AppState, routes::require_bearer_user},
    app_error::AppResult,
    domain::entities::{
        plan::{Plan, PlanTier},
        usage::{UsageCounter, UsageMode},
    },
};

pub fn router() -> Router<AppState> {
    Router::new().route("/usage", get(get_usage))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlanLimitsBody {
    pub max_words: Option<i32>,
    pub ghost_mini_quota: Option<i32>,
    pub ghost_pro_quota: Option<i32>,
}

#[derive(Serialize)]
pub(crate) struct PlanBody {
    pub id: PlanTier,
    pub name: String,
    pub limits: PlanLimitsBody,
}

impl PlanBody {
    pub fn from_plan(plan: &Plan) -> Self {
        PlanBody {
            id: plan.id,
            name: plan.name.clone(),
            limits: PlanLimitsBody {
                max_words: plan.limits.max_words,
                ghost_mini_quota: plan.limits.ghost_mini_quota,
                ghost_pro_quota: plan.limits.ghost_pro_quota,
            },
        }
    }
}

#[derive(Serialize)]
pub(crate) struct ModeUsageBody {
    pub used: i32,
    pub limit: Option<i32>,
    /// `max(limit - used, 0)`; null for unlimited quotas.
    pub remaining: Option<i32>,
}

impl ModeUsageBody {
    pub fn new(counter: Option<&UsageCounter>, mode: UsageMode, limit: Option<i32>) -> Self {
        let used = counter.map(|c| c.used_for(mode)).unwrap_or(0);
        ModeUsageBody {
            used,
            limit,
            remaining: limit.map(|l| (l - used).max(0)),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UsageBody {
    pub date: NaiveDate,
    pub ghost_mini: ModeUsageBody,
    pub ghost_pro: ModeUsageBody,
}

impl UsageBody {
    pub fn new(date: NaiveDate, counter: Option<&UsageCounter>, plan: &Plan) -> Self {
        UsageBody {
            date,
            ghost_mini: ModeUsageBody::new(counter, UsageMode::GhostMini, plan.limits.ghost_mini_quota),
            ghost_pro: ModeUsageBody::new(counter, UsageMode::GhostPro, plan.limits.ghost_pro_quota),
        }
    }
}

#[derive(Serialize)]
struct UsageResponse {
    plan: PlanBody,
    usage: UsageBody,
}

async fn get_usage(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let user = require_bearer_user(&app_state, &headers).await?;

    let now = Utc::now();
    let date = now.date_naive();
    let plan = app_state
        .quota_use_cases
        .resolve_active_plan(user.id, now)
        .await?;
    let counter = app_state.quota_use_cases.today_usage(user.id, date).await?;

    Ok(Json(UsageResponse {
        plan: PlanBody::from_plan(&plan),
        usage: UsageBody::new(date, counter.as_ref(), &plan),
    }))
}
