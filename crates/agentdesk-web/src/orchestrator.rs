//! Chat Orchestrator
//!
//! One chat turn: persist the user's message, load the recent window, prepend
//! the persona instruction, call the completion API, persist and return the
//! reply. The user's own turn is recorded before any external call so a crash
//! mid-request loses at most the reply; a completion failure degrades to a
//! fixed apology string instead of an HTTP error.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, warn};

use agentdesk_agents::persona;
use agentdesk_llm::{client::BoxedClient, ChatMessage};
use agentdesk_store::{SqliteStore, TurnRole, User};

/// Reply returned when the completion call fails for any reason.
pub const FALLBACK_REPLY: &str = "An error occurred while processing your message.";

/// Turns of prior context submitted with each request. Older context is
/// dropped to bound the prompt size.
const HISTORY_WINDOW: i64 = 10;

/// Budget for the completion call, over and above the client's own transport
/// timeout. Expiry is handled like any other completion failure.
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(45);

pub struct ChatOrchestrator {
    store: Arc<SqliteStore>,
    completion: BoxedClient,
    model: String,
    timeout: Duration,
}

impl ChatOrchestrator {
    pub fn new(store: Arc<SqliteStore>, completion: BoxedClient, model: String) -> Self {
        Self {
            store,
            completion,
            model,
            timeout: COMPLETION_TIMEOUT,
        }
    }

    /// Override the completion deadline. Tests use this to hit the timeout
    /// path without waiting out the production value.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run one chat turn and return the assistant's text.
    ///
    /// Anonymous callers get a reply without any persistence. The only error
    /// path is a store failure while recording the user's own turn; every
    /// completion-side failure resolves to `FALLBACK_REPLY`.
    pub async fn respond(
        &self,
        user: Option<&User>,
        prompt: &str,
        agent_id: &str,
    ) -> Result<String> {
        // Record the user's turn first. Losing it would corrupt the
        // conversation record, so this failure is fatal for the request.
        let turn_id = match user {
            Some(user) => Some(
                self.store
                    .append_message(&user.id, agent_id, TurnRole::User, prompt)
                    .await
                    .context("failed to record user turn")?,
            ),
            None => None,
        };

        let history = self.load_history(user, agent_id, turn_id).await;
        let instruction = persona::resolve(agent_id);

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(instruction));
        messages.extend(history);
        messages.push(ChatMessage::user(prompt));

        let reply = match tokio::time::timeout(
            self.timeout,
            self.completion.complete(&self.model, messages),
        )
        .await
        {
            Ok(Ok(response)) => response.message.content,
            Ok(Err(e)) => {
                error!("Completion call failed: {:#}", e);
                FALLBACK_REPLY.to_string()
            }
            Err(_) => {
                error!(
                    "Completion call timed out after {}ms",
                    self.timeout.as_millis()
                );
                FALLBACK_REPLY.to_string()
            }
        };

        // Best-effort: the caller already has their answer, so a failure
        // here is logged and swallowed. The fallback string is persisted
        // like any other assistant turn.
        if let Some(user) = user {
            if let Err(e) = self
                .store
                .append_message(&user.id, agent_id, TurnRole::Assistant, &reply)
                .await
            {
                warn!("Failed to record assistant turn: {}", e);
            }
        }

        Ok(reply)
    }

    /// The last `HISTORY_WINDOW` turns for this (user, agent) pair, oldest
    /// first. The window is the context that preceded the current turn, so
    /// the just-inserted row is excluded via `before`. Anonymous users and
    /// store failures both resolve to an empty window; a turn with degraded
    /// context beats no turn at all.
    async fn load_history(
        &self,
        user: Option<&User>,
        agent_id: &str,
        before: Option<i64>,
    ) -> Vec<ChatMessage> {
        let Some(user) = user else {
            return Vec::new();
        };

        match self
            .store
            .recent_messages(&user.id, agent_id, HISTORY_WINDOW, before)
            .await
        {
            Ok(mut rows) => {
                // Store returns newest-first; the model wants chronological.
                rows.reverse();
                rows.into_iter()
                    .map(|m| ChatMessage {
                        role: m.role.as_str().to_string(),
                        content: m.content,
                    })
                    .collect()
            }
            Err(e) => {
                warn!("History load failed, continuing with empty context: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentdesk_llm::{CompletionClient, CompletionResponse};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Completion stub that records every request and returns a canned reply
    /// or a canned failure, optionally after a delay.
    struct StubClient {
        reply: Option<String>,
        delay: Option<Duration>,
        requests: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl StubClient {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                delay: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                delay: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn stalled(reply: &str, delay: Duration) -> Self {
            Self {
                reply: Some(reply.to_string()),
                delay: Some(delay),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn last_request(&self) -> Vec<ChatMessage> {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl CompletionClient for StubClient {
        async fn complete(
            &self,
            model: &str,
            messages: Vec<ChatMessage>,
        ) -> Result<CompletionResponse> {
            self.requests.lock().unwrap().push(messages);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.reply {
                Some(reply) => Ok(CompletionResponse {
                    message: ChatMessage::assistant(reply.clone()),
                    model: model.to_string(),
                    finish_reason: Some("stop".to_string()),
                    usage: None,
                }),
                None => Err(anyhow::anyhow!("stubbed completion outage")),
            }
        }
    }

    async fn orchestrator_with(
        stub: Arc<StubClient>,
    ) -> (ChatOrchestrator, Arc<SqliteStore>) {
        let store = Arc::new(SqliteStore::in_memory().await.unwrap());
        let orchestrator =
            ChatOrchestrator::new(store.clone(), stub, "test-model".to_string());
        (orchestrator, store)
    }

    async fn test_user(store: &SqliteStore) -> User {
        store.create_user("test@example.com", "password").await.unwrap()
    }

    #[tokio::test]
    async fn test_successful_turn_persists_two_rows() {
        let stub = Arc::new(StubClient::replying("sure, here are some ideas"));
        let (orchestrator, store) = orchestrator_with(stub.clone()).await;
        let user = test_user(&store).await;

        let reply = orchestrator
            .respond(Some(&user), "give me ideas", "agent_01_brainstorm")
            .await
            .unwrap();
        assert_eq!(reply, "sure, here are some ideas");

        let rows = store
            .recent_messages(&user.id, "agent_01_brainstorm", 10, None)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].role, TurnRole::Assistant);
        assert_eq!(rows[0].content, "sure, here are some ideas");
        assert_eq!(rows[1].role, TurnRole::User);
        assert_eq!(rows[1].content, "give me ideas");
    }

    #[tokio::test]
    async fn test_completion_failure_returns_and_persists_fallback() {
        let stub = Arc::new(StubClient::failing());
        let (orchestrator, store) = orchestrator_with(stub).await;
        let user = test_user(&store).await;

        let reply = orchestrator
            .respond(Some(&user), "hello", "agent_02_validacao")
            .await
            .unwrap();
        assert_eq!(reply, FALLBACK_REPLY);

        let rows = store
            .recent_messages(&user.id, "agent_02_validacao", 10, None)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].content, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_completion_timeout_returns_and_persists_fallback() {
        // The stub would answer, but only after the deadline has passed.
        let stub = Arc::new(StubClient::stalled("too late", Duration::from_secs(5)));
        let (orchestrator, store) = orchestrator_with(stub).await;
        let orchestrator = orchestrator.with_timeout(Duration::from_millis(50));
        let user = test_user(&store).await;

        let reply = orchestrator
            .respond(Some(&user), "hello", "agent_02_validacao")
            .await
            .unwrap();
        assert_eq!(reply, FALLBACK_REPLY);

        let rows = store
            .recent_messages(&user.id, "agent_02_validacao", 10, None)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].role, TurnRole::Assistant);
        assert_eq!(rows[0].content, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_anonymous_turn_skips_persistence() {
        let stub = Arc::new(StubClient::replying("hi"));
        let (orchestrator, store) = orchestrator_with(stub.clone()).await;

        let reply = orchestrator
            .respond(None, "hello", "agent_01_brainstorm")
            .await
            .unwrap();
        assert_eq!(reply, "hi");

        // No rows written and no history submitted.
        assert_eq!(
            store.conversation_len("", "agent_01_brainstorm").await.unwrap(),
            0
        );
        let request = stub.last_request();
        assert_eq!(request.len(), 2);
        assert_eq!(request[0].role, "system");
        assert_eq!(request[1].role, "user");
    }

    #[tokio::test]
    async fn test_unknown_agent_uses_fallback_instruction() {
        let stub = Arc::new(StubClient::replying("hi there"));
        let (orchestrator, _store) = orchestrator_with(stub.clone()).await;

        let reply = orchestrator
            .respond(None, "hello", "unknown_agent")
            .await
            .unwrap();
        assert_eq!(reply, "hi there");

        let request = stub.last_request();
        assert_eq!(request[0].role, "system");
        assert_eq!(request[0].content, persona::FALLBACK_INSTRUCTION);
    }

    #[tokio::test]
    async fn test_history_window_is_bounded_and_chronological() {
        let stub = Arc::new(StubClient::replying("ok"));
        let (orchestrator, store) = orchestrator_with(stub.clone()).await;
        let user = test_user(&store).await;

        for i in 0..12 {
            store
                .append_message(&user.id, "agent_03_mvp", TurnRole::User, &format!("old-{}", i))
                .await
                .unwrap();
        }

        orchestrator
            .respond(Some(&user), "latest question", "agent_03_mvp")
            .await
            .unwrap();

        let request = stub.last_request();
        // system + the 10 turns that preceded this one + current prompt.
        // The just-persisted user turn is excluded from the window, so the
        // prompt appears exactly once.
        assert_eq!(request.len(), 12);
        assert_eq!(request[0].role, "system");
        assert_eq!(request[1].content, "old-2");
        assert_eq!(request[10].content, "old-11");
        assert_eq!(request[11].content, "latest question");
        assert_eq!(
            request.iter().filter(|m| m.content == "latest question").count(),
            1
        );
    }
}
