//! Persisted chat history.
//!
//! Messages live in an embedded SurrealDB store, one record per turn,
//! keyed by session id and ordered by insertion time.

use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

use crate::error::AgentError;
use crate::llm::{ChatMessage, Role};

const CHAT_MESSAGE: &str = "chat_message";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredMessage {
    session: String,
    role: Role,
    content: String,
    /// Unix epoch nanoseconds, the session's insertion order
    created_at: i64,
}

/// Chat history for one session.
pub struct ChatHistory {
    db: Surreal<Db>,
    session_id: String,
}

impl ChatHistory {
    /// Open the on-disk history store.
    pub async fn connect(dir: &Path, session_id: &str) -> Result<Self, AgentError> {
        let db = Surreal::new::<RocksDb>(dir).await?;
        db.use_ns("mesa").use_db("chat_history").await?;
        Ok(Self {
            db,
            session_id: session_id.to_string(),
        })
    }

    /// Open an in-memory history store. Used by tests.
    pub async fn connect_memory(session_id: &str) -> Result<Self, AgentError> {
        let db = Surreal::new::<Mem>(()).await?;
        db.use_ns("mesa").use_db("chat_history").await?;
        Ok(Self {
            db,
            session_id: session_id.to_string(),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// All messages of this session, oldest first.
    pub async fn messages(&self) -> Result<Vec<ChatMessage>, AgentError> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM chat_message WHERE session = $session ORDER BY created_at",
            )
            .bind(("session", self.session_id.clone()))
            .await?;
        let stored: Vec<StoredMessage> = result.take(0)?;
        Ok(stored
            .into_iter()
            .map(|message| ChatMessage {
                role: message.role,
                content: message.content,
            })
            .collect())
    }

    async fn add(&self, role: Role, content: &str) -> Result<(), AgentError> {
        let _: Option<StoredMessage> = self
            .db
            .create(CHAT_MESSAGE)
            .content(StoredMessage {
                session: self.session_id.clone(),
                role,
                content: content.to_string(),
                created_at: Utc::now().timestamp_nanos_opt().unwrap_or_default(),
            })
            .await?;
        Ok(())
    }

    pub async fn add_user_message(&self, content: &str) -> Result<(), AgentError> {
        self.add(Role::User, content).await
    }

    pub async fn add_ai_message(&self, content: &str) -> Result<(), AgentError> {
        self.add(Role::Assistant, content).await
    }

    /// History with the system message guaranteed at the front.
    pub async fn messages_with_system(
        &self,
        system_prompt: &str,
    ) -> Result<Vec<ChatMessage>, AgentError> {
        let mut messages = self.messages().await?;
        if messages.first().map(|m| m.role) != Some(Role::System) {
            messages.insert(0, ChatMessage::system(system_prompt));
        }
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn history_round_trips_in_order() {
        let history = ChatHistory::connect_memory("session_test").await.unwrap();
        history.add_user_message("hello").await.unwrap();
        history.add_ai_message("hi, how can I help?").await.unwrap();
        history.add_user_message("book a table").await.unwrap();

        let messages = history.messages().await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "hello");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[2].content, "book a table");
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let history = ChatHistory::connect_memory("session_a").await.unwrap();
        history.add_user_message("hello").await.unwrap();

        let other = ChatHistory {
            db: history.db.clone(),
            session_id: "session_b".to_string(),
        };
        assert!(other.messages().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn system_message_is_seeded_once() {
        let history = ChatHistory::connect_memory("session_sys").await.unwrap();
        history.add_user_message("hello").await.unwrap();

        let messages = history.messages_with_system("be nice").await.unwrap();
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, "be nice");
        assert_eq!(messages.len(), 2);
    }
}
