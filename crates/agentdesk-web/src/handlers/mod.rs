//! HTTP Handlers
//!
//! One module per API area, plus the inline pages. All JSON error bodies
//! share the `{ "message": ... }` shape.

pub mod agents;
pub mod auth;
pub mod chat;
pub mod health;
pub mod pages;

use axum::Json;
use serde_json::{json, Value};

/// Standard error body for 4xx/5xx JSON responses.
pub fn error_body(message: &str) -> Json<Value> {
    Json(json!({ "message": message }))
}
