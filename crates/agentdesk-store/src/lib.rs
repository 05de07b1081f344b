//! agentdesk persistence layer.
//!
//! Single SQLite database (via sqlx) holding the append-only chat history,
//! the read-only agent catalog, and the user/session tables that back the
//! login gate. Rows cross this boundary as typed structs, never as raw
//! dynamic values.

pub mod error;
pub mod sqlite_store;
pub mod types;

pub use error::{Result, StoreError};
pub use sqlite_store::{SqliteStore, SESSION_TTL_DAYS};
pub use types::{AgentRecord, Session, StoredMessage, TurnRole, User};
