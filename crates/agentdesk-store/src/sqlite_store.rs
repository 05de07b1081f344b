//! SQLite-backed store
//!
//! Durable storage for conversation turns, the agent catalog, and the
//! user/session tables. Uses SQLx for async database operations.

use crate::error::{Result, StoreError};
use crate::types::{AgentRecord, Session, StoredMessage, TurnRole, User};
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Sessions are valid for a week; expired rows are ignored on lookup and
/// removed by `cleanup_expired_sessions`. Public so the cookie layer can
/// derive its Max-Age from the same value.
pub const SESSION_TTL_DAYS: i64 = 7;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new store with the given database URL.
    ///
    /// URL format: `sqlite:path/to/db.sqlite` or `sqlite::memory:`
    pub async fn new(url: &str) -> Result<Self> {
        info!("Initializing SQLite store: {}", url);

        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.initialize_schema().await?;

        info!("SQLite store initialized successfully");
        Ok(store)
    }

    /// Create an in-memory store for testing.
    ///
    /// Single connection: every pooled in-memory connection would otherwise
    /// open its own empty database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.initialize_schema().await?;
        Ok(store)
    }

    async fn initialize_schema(&self) -> Result<()> {
        debug!("Initializing database schema");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chat_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                agent_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS agents (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                "group" TEXT NOT NULL,
                description TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                token TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_chat_user_agent ON chat_history(user_id, agent_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_chat_created ON chat_history(created_at)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id)")
            .execute(&self.pool)
            .await?;

        debug!("Database schema initialized");
        Ok(())
    }

    // =========================================================================
    // CHAT HISTORY
    // =========================================================================

    /// Append one conversation turn with a server-assigned timestamp and
    /// return its row id.
    ///
    /// At-least-once semantics: there is no idempotency key, a retried call
    /// produces a duplicate row.
    pub async fn append_message(
        &self,
        user_id: &str,
        agent_id: &str,
        role: TurnRole,
        content: &str,
    ) -> Result<i64> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO chat_history (user_id, agent_id, role, content, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(agent_id)
        .bind(role.as_str())
        .bind(content)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        debug!("Appended {} turn for ({}, {})", role.as_str(), user_id, agent_id);
        Ok(result.last_insert_rowid())
    }

    /// The most recent turns for a (user, agent) pair, newest first.
    ///
    /// With `before` set, only rows older than that row id are considered,
    /// which lets a caller read the window that preceded a turn it just
    /// inserted. Callers wanting chronological order reverse the result.
    /// Rows with a role this build doesn't know are logged and skipped.
    pub async fn recent_messages(
        &self,
        user_id: &str,
        agent_id: &str,
        limit: i64,
        before: Option<i64>,
    ) -> Result<Vec<StoredMessage>> {
        let rows = if let Some(before_id) = before {
            sqlx::query(
                r#"
                SELECT role, content, created_at FROM chat_history
                WHERE user_id = ? AND agent_id = ? AND id < ?
                ORDER BY created_at DESC, id DESC
                LIMIT ?
                "#,
            )
            .bind(user_id)
            .bind(agent_id)
            .bind(before_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query(
                r#"
                SELECT role, content, created_at FROM chat_history
                WHERE user_id = ? AND agent_id = ?
                ORDER BY created_at DESC, id DESC
                LIMIT ?
                "#,
            )
            .bind(user_id)
            .bind(agent_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        };

        let mut messages = Vec::with_capacity(rows.len());
        for row in rows {
            let role_str: String = row.get("role");
            let Some(role) = TurnRole::parse(&role_str) else {
                warn!("Skipping chat_history row with malformed role: {}", role_str);
                continue;
            };
            messages.push(StoredMessage {
                role,
                content: row.get("content"),
                created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
            });
        }

        Ok(messages)
    }

    /// Number of stored turns for a (user, agent) pair.
    pub async fn conversation_len(&self, user_id: &str, agent_id: &str) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM chat_history WHERE user_id = ? AND agent_id = ?",
        )
        .bind(user_id)
        .bind(agent_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u64)
    }

    // =========================================================================
    // AGENT CATALOG
    // =========================================================================

    /// Insert or refresh one catalog row. Used to seed the built-in agents
    /// at startup; the catalog is read-only afterwards.
    pub async fn upsert_agent(&self, agent: &AgentRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO agents (id, name, "group", description)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                "group" = excluded."group",
                description = excluded.description
            "#,
        )
        .bind(&agent.id)
        .bind(&agent.name)
        .bind(&agent.group)
        .bind(&agent.description)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All catalog rows, ascending by display name.
    pub async fn list_agents(&self) -> Result<Vec<AgentRecord>> {
        let rows = sqlx::query(
            r#"SELECT id, name, "group", description FROM agents ORDER BY name ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| AgentRecord {
                id: row.get("id"),
                name: row.get("name"),
                group: row.get("group"),
                description: row.get("description"),
            })
            .collect())
    }

    // =========================================================================
    // USERS & SESSIONS
    // =========================================================================

    /// Register a new user with an argon2-hashed password.
    pub async fn create_user(&self, email: &str, password: &str) -> Result<User> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| StoreError::PasswordHash(e.to_string()))?
            .to_string();

        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        };

        let result = sqlx::query(
            "INSERT INTO users (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&password_hash)
        .bind(user.created_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                info!("Created user {}", user.id);
                Ok(user)
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::Conflict("email already registered".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check an email/password pair. Returns the user on a match, None on a
    /// wrong password or unknown email.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let stored_hash: String = row.get("password_hash");
        let parsed = PasswordHash::new(&stored_hash)
            .map_err(|e| StoreError::PasswordHash(e.to_string()))?;

        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            return Ok(None);
        }

        Ok(Some(User {
            id: row.get("id"),
            email: row.get("email"),
            created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
        }))
    }

    /// Issue a new session for a user.
    pub async fn create_session(&self, user_id: &str) -> Result<Session> {
        let token: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();

        let session = Session {
            token,
            user_id: user_id.to_string(),
            created_at: Utc::now(),
            expires_at: Utc::now() + Duration::days(SESSION_TTL_DAYS),
        };

        sqlx::query(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&session.token)
        .bind(&session.user_id)
        .bind(session.created_at.to_rfc3339())
        .bind(session.expires_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!("Issued session for user {}", user_id);
        Ok(session)
    }

    /// Resolve a session token to its user. Expired or unknown tokens
    /// resolve to None, never to an error.
    pub async fn session_user(&self, token: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT u.id, u.email, u.created_at, s.expires_at
            FROM sessions s JOIN users u ON u.id = s.user_id
            WHERE s.token = ?
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let expires_at = parse_timestamp(&row.get::<String, _>("expires_at"))?;
        if expires_at < Utc::now() {
            return Ok(None);
        }

        Ok(Some(User {
            id: row.get("id"),
            email: row.get("email"),
            created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
        }))
    }

    /// Remove a session (logout). Unknown tokens are a no-op.
    pub async fn delete_session(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Drop sessions past their expiry.
    pub async fn cleanup_expired_sessions(&self) -> Result<u64> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
            .bind(&now)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected();
        if deleted > 0 {
            info!("Cleaned up {} expired sessions", deleted);
        }
        Ok(deleted)
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Invalid(format!("timestamp {}: {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_and_recent_messages() {
        let store = SqliteStore::in_memory().await.unwrap();

        store
            .append_message("u1", "agent_01_brainstorm", TurnRole::User, "first")
            .await
            .unwrap();
        store
            .append_message("u1", "agent_01_brainstorm", TurnRole::Assistant, "second")
            .await
            .unwrap();
        store
            .append_message("u1", "agent_02_validacao", TurnRole::User, "other agent")
            .await
            .unwrap();

        let recent = store
            .recent_messages("u1", "agent_01_brainstorm", 10, None)
            .await
            .unwrap();

        // Newest first, filtered to the exact (user, agent) pair.
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "second");
        assert_eq!(recent[0].role, TurnRole::Assistant);
        assert_eq!(recent[1].content, "first");

        assert_eq!(store.conversation_len("u1", "agent_01_brainstorm").await.unwrap(), 2);
        assert_eq!(store.conversation_len("u2", "agent_01_brainstorm").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_recent_messages_limit() {
        let store = SqliteStore::in_memory().await.unwrap();

        for i in 0..12 {
            store
                .append_message("u1", "agent_03_mvp", TurnRole::User, &format!("msg-{}", i))
                .await
                .unwrap();
        }

        let recent = store.recent_messages("u1", "agent_03_mvp", 10, None).await.unwrap();
        assert_eq!(recent.len(), 10);
        // The two oldest rows fall outside the window.
        assert_eq!(recent[0].content, "msg-11");
        assert_eq!(recent[9].content, "msg-2");
    }

    #[tokio::test]
    async fn test_recent_messages_before_excludes_newer_rows() {
        let store = SqliteStore::in_memory().await.unwrap();

        for i in 0..3 {
            store
                .append_message("u1", "agent_03_mvp", TurnRole::User, &format!("msg-{}", i))
                .await
                .unwrap();
        }
        let newest_id = store
            .append_message("u1", "agent_03_mvp", TurnRole::User, "newest")
            .await
            .unwrap();

        let window = store
            .recent_messages("u1", "agent_03_mvp", 10, Some(newest_id))
            .await
            .unwrap();
        assert_eq!(window.len(), 3);
        assert_eq!(window[0].content, "msg-2");
        assert!(window.iter().all(|m| m.content != "newest"));
    }

    #[tokio::test]
    async fn test_malformed_role_rows_are_skipped() {
        let store = SqliteStore::in_memory().await.unwrap();

        store
            .append_message("u1", "agent_03_mvp", TurnRole::User, "good")
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO chat_history (user_id, agent_id, role, content, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind("u1")
        .bind("agent_03_mvp")
        .bind("tool")
        .bind("bad row")
        .bind(Utc::now().to_rfc3339())
        .execute(&store.pool)
        .await
        .unwrap();

        let recent = store.recent_messages("u1", "agent_03_mvp", 10, None).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].content, "good");
    }

    #[tokio::test]
    async fn test_agent_catalog_ordering() {
        let store = SqliteStore::in_memory().await.unwrap();

        for (id, name) in [("a3", "Zeta"), ("a1", "Alpha"), ("a2", "Midway")] {
            store
                .upsert_agent(&AgentRecord {
                    id: id.to_string(),
                    name: name.to_string(),
                    group: "Test".to_string(),
                    description: String::new(),
                })
                .await
                .unwrap();
        }

        let agents = store.list_agents().await.unwrap();
        let names: Vec<&str> = agents.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Midway", "Zeta"]);

        // Upsert refreshes in place, no duplicate rows.
        store
            .upsert_agent(&AgentRecord {
                id: "a1".to_string(),
                name: "Alpha Two".to_string(),
                group: "Test".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(store.list_agents().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_user_registration_and_login() {
        let store = SqliteStore::in_memory().await.unwrap();

        let user = store.create_user("alice@example.com", "hunter22").await.unwrap();
        assert_eq!(user.email, "alice@example.com");

        // Duplicate email is a conflict.
        let dup = store.create_user("alice@example.com", "other").await;
        assert!(matches!(dup, Err(StoreError::Conflict(_))));

        // Right and wrong credentials.
        let ok = store
            .verify_credentials("alice@example.com", "hunter22")
            .await
            .unwrap();
        assert_eq!(ok.unwrap().id, user.id);

        assert!(store
            .verify_credentials("alice@example.com", "wrong")
            .await
            .unwrap()
            .is_none());
        assert!(store
            .verify_credentials("bob@example.com", "hunter22")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let store = SqliteStore::in_memory().await.unwrap();
        let user = store.create_user("carol@example.com", "pw").await.unwrap();

        let session = store.create_session(&user.id).await.unwrap();
        assert_eq!(session.token.len(), 32);

        let resolved = store.session_user(&session.token).await.unwrap().unwrap();
        assert_eq!(resolved.id, user.id);

        assert!(store.session_user("no-such-token").await.unwrap().is_none());

        store.delete_session(&session.token).await.unwrap();
        assert!(store.session_user(&session.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_sessions_are_rejected_and_cleaned() {
        let store = SqliteStore::in_memory().await.unwrap();
        let user = store.create_user("dave@example.com", "pw").await.unwrap();
        let session = store.create_session(&user.id).await.unwrap();

        // Force the session into the past.
        let past = (Utc::now() - Duration::days(1)).to_rfc3339();
        sqlx::query("UPDATE sessions SET expires_at = ? WHERE token = ?")
            .bind(&past)
            .bind(&session.token)
            .execute(&store.pool)
            .await
            .unwrap();

        assert!(store.session_user(&session.token).await.unwrap().is_none());
        assert_eq!(store.cleanup_expired_sessions().await.unwrap(), 1);
    }
}
