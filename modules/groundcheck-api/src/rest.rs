use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use tracing::{info, warn};

use groundcheck_scout::CheckError;

use crate::chat::{self, IncomingMessage};
use crate::AppState;

/// Longest claim accepted over HTTP, in characters.
pub const MAX_CLAIM_CHARS: usize = 5000;

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    claim: Option<String>,
}

fn error(status: StatusCode, message: &str) -> axum::response::Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

pub async fn api_analyze(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    let claim = body.claim.unwrap_or_default();
    let claim = claim.trim();
    if claim.is_empty() {
        return error(StatusCode::BAD_REQUEST, "No claim provided");
    }
    if claim.chars().count() > MAX_CLAIM_CHARS {
        return error(StatusCode::BAD_REQUEST, "Claim too long (max 5000 characters)");
    }

    info!(chars = claim.len(), "Analyze request");
    match state.pipeline.check(claim).await {
        Ok(report) => Json(serde_json::json!({ "analysis": report.rendered })).into_response(),
        Err(CheckError::EmptyClaim) => error(StatusCode::BAD_REQUEST, "No claim provided"),
        Err(e @ CheckError::UnreadableUrl(_)) => {
            warn!(error = %e, "Analyze request failed");
            error(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string())
        }
    }
}

pub async fn api_messages(
    State(state): State<Arc<AppState>>,
    Json(message): Json<IncomingMessage>,
) -> impl IntoResponse {
    if message.user_id.trim().is_empty() {
        return error(StatusCode::BAD_REQUEST, "user_id is required");
    }
    let reply = chat::reply(&state, message).await;
    Json(serde_json::json!({ "reply": reply })).into_response()
}
