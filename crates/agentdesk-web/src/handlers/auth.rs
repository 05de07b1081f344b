//! Authentication endpoints
//!
//! Register, login, logout and the current-user probe. Sessions ride in an
//! HttpOnly cookie; the token itself never appears in a response body.

use axum::{
    extract::{Extension, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use agentdesk_store::{StoreError, SESSION_TTL_DAYS};

use crate::middleware::{session_token, CurrentUser, SESSION_COOKIE};
use crate::state::AppState;

use super::error_body;

// Cookie lifetime tracks the store's session TTL.
const SESSION_MAX_AGE_SECS: i64 = SESSION_TTL_DAYS * 24 * 60 * 60;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
}

fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, SESSION_MAX_AGE_SECS
    )
}

fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CredentialsRequest>,
) -> impl IntoResponse {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            error_body("email and password are required"),
        )
            .into_response();
    }

    let user = match state
        .store
        .create_user(request.email.trim(), &request.password)
        .await
    {
        Ok(user) => user,
        Err(StoreError::Conflict(message)) => {
            return (StatusCode::CONFLICT, error_body(&message)).into_response();
        }
        Err(e) => {
            error!("Registration failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("registration failed"),
            )
                .into_response();
        }
    };

    start_session(&state, user).await
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CredentialsRequest>,
) -> impl IntoResponse {
    let user = match state
        .store
        .verify_credentials(request.email.trim(), &request.password)
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                error_body("invalid email or password"),
            )
                .into_response();
        }
        Err(e) => {
            error!("Login failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("login failed"),
            )
                .into_response();
        }
    };

    start_session(&state, user).await
}

async fn start_session(state: &AppState, user: agentdesk_store::User) -> axum::response::Response {
    match state.store.create_session(&user.id).await {
        Ok(session) => (
            StatusCode::OK,
            [(header::SET_COOKIE, session_cookie(&session.token))],
            Json(json!({
                "user": UserResponse { id: user.id, email: user.email },
                "status": "success",
            })),
        )
            .into_response(),
        Err(e) => {
            error!("Session creation failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("session creation failed"),
            )
                .into_response()
        }
    }
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
) -> impl IntoResponse {
    if let Some(token) = session_token(&headers) {
        if let Err(e) = state.store.delete_session(&token).await {
            error!("Session deletion failed: {}", e);
        }
    }

    (
        StatusCode::OK,
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(json!({ "status": "success" })),
    )
}

pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> impl IntoResponse {
    match user {
        Some(user) => Json(json!({
            "user": UserResponse { id: user.id, email: user.email },
        }))
        .into_response(),
        None => (StatusCode::UNAUTHORIZED, error_body("not signed in")).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_max_age_matches_store_ttl() {
        let cookie = session_cookie("tok123");
        assert!(cookie.starts_with("agentdesk_session=tok123;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains(&format!("Max-Age={}", SESSION_TTL_DAYS * 24 * 60 * 60)));

        assert!(clear_session_cookie().contains("Max-Age=0"));
    }
}
