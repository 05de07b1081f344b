//! Router assembly
//!
//! All routes share one state and one middleware stack. The access gate
//! runs innermost so every handler sees a resolved `CurrentUser`; the
//! request timeout is set well above the chat turn budget so slow model
//! calls resolve inside the handler instead of at the HTTP layer.

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::handlers::{agents, auth, chat, health, pages};
use crate::middleware::{access_gate, request_logging, security_headers};
use crate::state::AppState;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/dashboard", get(pages::dashboard))
        .route("/login", get(pages::login_page))
        .route("/register", get(pages::register_page))
        .route("/api/chat", post(chat::chat))
        .route("/api/agents", get(agents::list_agents))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/health", get(health::health))
        .layer(from_fn_with_state(state.clone(), access_gate))
        .layer(from_fn(security_headers))
        .layer(from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .with_state(state)
}
