//! Chat endpoint
//!
//! `POST /api/chat` drives one conversation turn: validate the request,
//! hand it to the orchestrator, and report the reply. Internal failures
//! never leak detail to the client; the generic message goes out and the
//! cause goes to the log.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use crate::middleware::CurrentUser;
use crate::state::AppState;

use super::error_body;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub agent_id: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub status: &'static str,
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse {
    if request.prompt.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            error_body("prompt must not be empty"),
        )
            .into_response();
    }

    if request.agent_id.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            error_body("agentId must not be empty"),
        )
            .into_response();
    }

    match state
        .orchestrator
        .respond(user.as_ref(), &request.prompt, &request.agent_id)
        .await
    {
        Ok(reply) => Json(ChatResponse {
            reply,
            status: "success",
        })
        .into_response(),
        Err(e) => {
            error!("Chat turn failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("An error occurred while processing your message."),
            )
                .into_response()
        }
    }
}
