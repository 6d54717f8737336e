//! Stripe webhook handler.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::use_cases::billing::SubscriptionSync,
    domain::entities::{plan::BillingCycle, subscription::SubscriptionStatus},
    infra::stripe_client::StripeClient,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/webhooks/billing", post(handle_billing_webhook))
}

/// Whether a processing error should trigger a Stripe redelivery. Transient
/// conditions get a 5xx; expected conditions (a subscription we cannot
/// attribute yet, a missing order) are logged and acknowledged so Stripe
/// stops retrying.
fn is_retryable_error(error: &AppError) -> bool {
    matches!(
        error,
        AppError::Database(_)
            | AppError::Internal(_)
            | AppError::UpstreamFailure(_)
            | AppError::Conflict(_)
    )
}

fn timestamp_to_utc(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(secs, 0)
}

/// Extracts the sync payload from a full Stripe subscription object (webhook
/// `data.object` or a `GET /v1/subscriptions/{id}` response body).
fn subscription_sync_from_json(object: &serde_json::Value) -> Option<SubscriptionSync> {
    let subscription_id = object["id"].as_str()?;
    let interval = object["items"]["data"][0]["price"]["recurring"]["interval"]
        .as_str()
        .unwrap_or("month");

    Some(SubscriptionSync {
        stripe_subscription_id: subscription_id.to_string(),
        stripe_customer_id: object["customer"].as_str().map(str::to_string),
        status: SubscriptionStatus::from_stripe(object["status"].as_str().unwrap_or("")),
        billing_cycle: BillingCycle::from_stripe_interval(interval),
        current_period_start: object["current_period_start"]
            .as_i64()
            .and_then(timestamp_to_utc),
        current_period_end: object["current_period_end"]
            .as_i64()
            .and_then(timestamp_to_utc),
        cancelled_at: object["cancel_at"].as_i64().and_then(timestamp_to_utc),
    })
}

async fn handle_billing_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> AppResult<impl IntoResponse> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::ValidationError("Missing Stripe signature".into()))?;

    StripeClient::verify_webhook_signature(
        &body,
        signature,
        app_state.config.stripe_webhook_secret.expose_secret(),
    )?;

    let event: serde_json::Value = serde_json::from_str(&body)
        .map_err(|e| AppError::ValidationError(format!("Invalid webhook payload: {}", e)))?;

    let event_type = event["type"].as_str().unwrap_or("");
    let event_id = event["id"].as_str().unwrap_or("");
    let object = &event["data"]["object"];

    let result = match event_type {
        "checkout.session.completed" => handle_checkout_completed(&app_state, object).await,
        "customer.subscription.created"
        | "customer.subscription.updated"
        | "customer.subscription.deleted" => handle_subscription_event(&app_state, object).await,
        "invoice.payment_succeeded" | "invoice.payment_failed" => {
            handle_invoice_event(&app_state, object).await
        }
        _ => {
            tracing::debug!(event_type, event_id, "Ignoring unhandled webhook event");
            Ok(())
        }
    };

    if let Err(error) = result {
        if is_retryable_error(&error) {
            tracing::error!(
                error = %error,
                event_type,
                event_id,
                "Webhook processing failed, returning 500 for Stripe retry"
            );
            return Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Processing failed" })),
            ));
        }
        tracing::warn!(
            error = %error,
            event_type,
            event_id,
            "Webhook event skipped on non-retryable condition"
        );
    }

    Ok((StatusCode::OK, Json(serde_json::json!({ "received": true }))))
}

async fn handle_checkout_completed(
    app_state: &AppState,
    session: &serde_json::Value,
) -> AppResult<()> {
    let Some(order_id) = session["client_reference_id"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
    else {
        tracing::warn!("Checkout session completed without a usable order reference");
        return Ok(());
    };
    let Some(session_id) = session["id"].as_str() else {
        return Ok(());
    };

    app_state
        .billing_use_cases
        .mark_order_paid(
            order_id,
            session_id,
            session["customer"].as_str(),
            session["subscription"].as_str(),
        )
        .await
}

async fn handle_subscription_event(
    app_state: &AppState,
    object: &serde_json::Value,
) -> AppResult<()> {
    let Some(sync) = subscription_sync_from_json(object) else {
        tracing::warn!("Subscription event without a subscription id");
        return Ok(());
    };
    app_state.billing_use_cases.sync_subscription(&sync).await?;
    Ok(())
}

async fn handle_invoice_event(
    app_state: &AppState,
    invoice: &serde_json::Value,
) -> AppResult<()> {
    // Invoice payloads carry only a subscription reference; the full object
    // is re-fetched before upserting.
    let Some(subscription_id) = invoice["subscription"].as_str() else {
        return Ok(());
    };
    app_state
        .billing_use_cases
        .resync_subscription_from_gateway(subscription_id)
        .await?;
    Ok(())
}
