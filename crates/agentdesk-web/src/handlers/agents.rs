//! Agent catalog endpoint

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::state::AppState;

use super::error_body;

#[derive(Debug, Serialize)]
pub struct AgentSummary {
    pub id: String,
    pub name: String,
    pub group: String,
    pub description: String,
}

/// `GET /api/agents` lists the catalog, ordered by name.
pub async fn list_agents(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.list_agents().await {
        Ok(agents) => {
            let agents: Vec<AgentSummary> = agents
                .into_iter()
                .map(|a| AgentSummary {
                    id: a.id,
                    name: a.name,
                    group: a.group,
                    description: a.description,
                })
                .collect();
            Json(json!({ "agents": agents })).into_response()
        }
        Err(e) => {
            error!("Agent listing failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("failed to list agents"),
            )
                .into_response()
        }
    }
}
