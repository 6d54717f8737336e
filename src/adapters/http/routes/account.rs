use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    adapters::http::{
        app_state::AppState,
        routes::{require_session_user, usage::PlanBody, usage::UsageBody},
    },
    app_error::AppResult,
    domain::entities::{
        order::{Order, OrderStatus},
        plan::BillingCycle,
        subscription::{Subscription, SubscriptionStatus},
    },
};

pub fn router() -> Router<AppState> {
    Router::new().route("/account/summary", get(get_summary))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionBody {
    status: SubscriptionStatus,
    billing_cycle: BillingCycle,
    current_period_start: Option<DateTime<Utc>>,
    current_period_end: Option<DateTime<Utc>>,
    stripe_subscription_id: String,
    stripe_customer_id: Option<String>,
}

impl SubscriptionBody {
    fn from_subscription(sub: Subscription) -> Self {
        SubscriptionBody {
            status: sub.status,
            billing_cycle: sub.billing_cycle,
            current_period_start: sub.current_period_start,
            current_period_end: sub.current_period_end,
            stripe_subscription_id: sub.stripe_subscription_id,
            stripe_customer_id: sub.stripe_customer_id,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderBody {
    status: OrderStatus,
    cycle: BillingCycle,
    stripe_link: Option<String>,
    stripe_session_id: Option<String>,
    stripe_customer_id: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl OrderBody {
    fn from_order(order: Order) -> Self {
        OrderBody {
            status: order.status,
            cycle: order.cycle,
            stripe_link: order.stripe_link,
            stripe_session_id: order.stripe_session_id,
            stripe_customer_id: order.stripe_customer_id,
            created_at: order.created_at,
        }
    }
}

#[derive(Serialize)]
struct SummaryResponse {
    plan: PlanBody,
    usage: UsageBody,
    subscription: Option<SubscriptionBody>,
    order: Option<OrderBody>,
}

async fn get_summary(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let user = require_session_user(&app_state, &headers, &jar).await?;

    let now = Utc::now();
    let date = now.date_naive();
    let plan = app_state
        .quota_use_cases
        .resolve_active_plan(user.id, now)
        .await?;
    let counter = app_state.quota_use_cases.today_usage(user.id, date).await?;
    let subscription = app_state.billing_use_cases.latest_subscription(user.id).await?;
    let order = app_state.billing_use_cases.latest_order(user.id).await?;

    Ok(Json(SummaryResponse {
        plan: PlanBody::from_plan(&plan),
        usage: UsageBody::new(date, counter.as_ref(), &plan),
        subscription: subscription.map(SubscriptionBody::from_subscription),
        order: order.map(OrderBody::from_order),
    }))
}
