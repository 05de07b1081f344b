//! Request Middleware
//!
//! The access gate resolves the session cookie to an optional user, applies
//! the redirect rules for page routes, and attaches the user to the request
//! for downstream handlers. Security headers and request logging follow the
//! same middleware-fn pattern.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

use agentdesk_store::User;

use crate::state::AppState;

/// Name of the session cookie issued at login.
pub const SESSION_COOKIE: &str = "agentdesk_session";

/// The authenticated user for this request, if any. Inserted by the access
/// gate; handlers read it via `Extension<CurrentUser>`.
#[derive(Clone)]
pub struct CurrentUser(pub Option<User>);

/// Pull the session token out of the Cookie header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;

    for part in raw.split(';') {
        if let Some(token) = part.trim().strip_prefix(SESSION_COOKIE) {
            if let Some(value) = token.strip_prefix('=') {
                let value = value.trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }

    None
}

/// Session gate ahead of every route.
///
/// Decision table on (has session, path kind):
/// - no session + protected page -> redirect to /login
/// - session + auth page -> redirect to /dashboard
/// - everything else passes through with `CurrentUser` attached.
///
/// A store failure during session lookup is treated as "no session": the
/// request proceeds anonymously rather than failing outright.
pub async fn access_gate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let user = match session_token(request.headers()) {
        Some(token) => match state.store.session_user(&token).await {
            Ok(user) => user,
            Err(e) => {
                warn!("Session lookup failed, treating request as anonymous: {}", e);
                None
            }
        },
        None => None,
    };

    let (is_protected, is_auth_page) = {
        let path = request.uri().path();
        (
            path.starts_with("/dashboard"),
            path == "/login" || path == "/register",
        )
    };

    if user.is_none() && is_protected {
        return Redirect::to("/login").into_response();
    }

    if user.is_some() && is_auth_page {
        return Redirect::to("/dashboard").into_response();
    }

    request.extensions_mut().insert(CurrentUser(user));
    next.run(request).await
}

/// Security headers middleware
pub async fn security_headers(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert("X-Content-Type-Options", "nosniff".parse().unwrap());
    headers.insert("X-Frame-Options", "DENY".parse().unwrap());
    headers.insert(
        "Referrer-Policy",
        "strict-origin-when-cross-origin".parse().unwrap(),
    );

    response
}

/// Request logging middleware
pub async fn request_logging(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    if status.is_server_error() {
        tracing::error!("{} {} {} - {}ms", method, uri, status.as_u16(), duration.as_millis());
    } else if status.is_client_error() {
        tracing::warn!("{} {} {} - {}ms", method, uri, status.as_u16(), duration.as_millis());
    } else {
        tracing::info!("{} {} {} - {}ms", method, uri, status.as_u16(), duration.as_millis());
    }

    response
}
