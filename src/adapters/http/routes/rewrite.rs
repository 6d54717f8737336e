use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::{app_state::AppState, routes::require_bearer_user},
    app_error::AppResult,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/rewrite", post(rewrite))
}

#[derive(Deserialize)]
struct RewriteRequest {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
struct RewriteResponse {
    rewritten: String,
}

async fn rewrite(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RewriteRequest>,
) -> AppResult<impl IntoResponse> {
    let user = require_bearer_user(&app_state, &headers).await?;

    let outcome = app_state
        .rewrite_use_cases
        .rewrite(&user, &payload.text)
        .await?;

    Ok(Json(RewriteResponse {
        rewritten: outcome.rewritten,
    }))
}
