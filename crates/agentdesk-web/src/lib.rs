//! agentdesk-web: the persona chat dashboard server
//!
//! Single axum server exposing:
//! - REST API for chat, auth, and the agent catalog
//! - the dashboard/login/register pages behind the session gate
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                agentdesk server (:8080)              │
//! ├──────────────────────────────────────────────────────┤
//! │  /dashboard, /login, /register  - pages (gated)      │
//! │  /api/chat                      - chat turn          │
//! │  /api/agents                    - agent picker data  │
//! │  /api/auth/*                    - register/login     │
//! │  /api/health                    - health check       │
//! └──────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod middleware;
pub mod orchestrator;
pub mod router;
pub mod state;

pub use orchestrator::ChatOrchestrator;
pub use router::create_router;
pub use state::AppState;
