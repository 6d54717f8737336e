use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    adapters::http::{app_state::AppState, routes::require_bearer_user},
    app_error::AppResult,
    domain::entities::plan::BillingCycle,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/orders/create", post(create_order))
}

#[derive(Deserialize)]
struct CreateOrderRequest {
    cycle: BillingCycle,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderResponse {
    order_id: Uuid,
    payment_link: String,
}

async fn create_order(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<impl IntoResponse> {
    let user = require_bearer_user(&app_state, &headers).await?;

    let result = app_state
        .billing_use_cases
        .create_order(&user, payload.cycle)
        .await?;

    Ok(Json(CreateOrderResponse {
        order_id: result.order_id,
        payment_link: result.payment_link,
    }))
}
