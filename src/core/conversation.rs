use crate::core::{ChatMessage, ConversationHistory};
use crate::utils::error::{AgentError, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};

/// Local chat histories plus the platform thread each conversation is bound
/// to. Owned by the service state and passed to handlers explicitly.
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: RwLock<HashMap<String, ConversationHistory>>,
    // 每個對話一個 cell，確保平台 thread 只建立一次
    threads: RwLock<HashMap<String, Arc<OnceCell<String>>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_create(&self, conversation_id: &str) -> ConversationHistory {
        let mut conversations = self.conversations.write().await;
        conversations
            .entry(conversation_id.to_string())
            .or_insert_with(|| {
                tracing::debug!("Created conversation {}", conversation_id);
                ConversationHistory::new(conversation_id)
            })
            .clone()
    }

    pub async fn append(&self, conversation_id: &str, message: ChatMessage) {
        let mut conversations = self.conversations.write().await;
        let conversation = conversations
            .entry(conversation_id.to_string())
            .or_insert_with(|| ConversationHistory::new(conversation_id));
        conversation.messages.push(message);
        conversation.updated_at = Utc::now();
    }

    pub async fn get(&self, conversation_id: &str) -> Result<ConversationHistory> {
        self.conversations
            .read()
            .await
            .get(conversation_id)
            .cloned()
            .ok_or_else(|| AgentError::ConversationNotFound {
                conversation_id: conversation_id.to_string(),
            })
    }

    /// Removes the history and forgets the bound platform thread.
    pub async fn delete(&self, conversation_id: &str) -> Result<()> {
        let removed = self.conversations.write().await.remove(conversation_id);
        self.threads.write().await.remove(conversation_id);

        match removed {
            Some(_) => Ok(()),
            None => Err(AgentError::ConversationNotFound {
                conversation_id: conversation_id.to_string(),
            }),
        }
    }

    pub async fn thread_for(&self, conversation_id: &str) -> Option<String> {
        self.threads
            .read()
            .await
            .get(conversation_id)
            .and_then(|cell| cell.get().cloned())
    }

    pub async fn bind_thread(&self, conversation_id: &str, thread_id: &str) {
        self.threads.write().await.insert(
            conversation_id.to_string(),
            Arc::new(OnceCell::new_with(Some(thread_id.to_string()))),
        );
    }

    /// Returns the bound thread, running `create` at most once per
    /// conversation even when several turns arrive together. A failed
    /// `create` leaves the conversation unbound.
    pub async fn thread_or_create<F, Fut>(&self, conversation_id: &str, create: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        let cell = self
            .threads
            .write()
            .await
            .entry(conversation_id.to_string())
            .or_default()
            .clone();

        cell.get_or_try_init(create).await.cloned()
    }

    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Sender;

    #[tokio::test]
    async fn append_creates_and_records_messages() {
        let store = ConversationStore::new();
        store.append("c1", ChatMessage::from_user("hello")).await;
        store.append("c1", ChatMessage::from_agent("hi there")).await;

        let history = store.get("c1").await.unwrap();
        assert_eq!(history.messages.len(), 2);
        assert_eq!(history.messages[1].sender, Sender::Agent);
        assert!(history.updated_at >= history.created_at);
    }

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let store = ConversationStore::new();
        let first = store.get_or_create("c1").await;
        let second = store.get_or_create("c1").await;
        assert_eq!(first.created_at, second.created_at);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn delete_forgets_thread_binding() {
        let store = ConversationStore::new();
        store.get_or_create("c1").await;
        store.bind_thread("c1", "thread_1").await;

        store.delete("c1").await.unwrap();

        assert!(store.thread_for("c1").await.is_none());
        assert!(matches!(
            store.get("c1").await,
            Err(AgentError::ConversationNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn thread_or_create_runs_once_for_concurrent_turns() {
        let store = ConversationStore::new();
        let counter = std::sync::atomic::AtomicUsize::new(0);
        let created = &counter;
        let create = move || async move {
            let n = created.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            Ok(format!("thread_{}", n))
        };

        let (first, second) = tokio::join!(
            store.thread_or_create("c1", create),
            store.thread_or_create("c1", create)
        );

        assert_eq!(first.unwrap(), "thread_0");
        assert_eq!(second.unwrap(), "thread_0");
        assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(store.thread_for("c1").await.as_deref(), Some("thread_0"));
    }

    #[tokio::test]
    async fn failed_thread_creation_is_retried() {
        let store = ConversationStore::new();
        let failed = store
            .thread_or_create("c1", || async {
                Err(AgentError::EmptyAgentResponse {
                    thread_id: String::new(),
                })
            })
            .await;
        assert!(failed.is_err());
        assert!(store.thread_for("c1").await.is_none());

        let thread_id = store
            .thread_or_create("c1", || async { Ok("thread_9".to_string()) })
            .await
            .unwrap();
        assert_eq!(thread_id, "thread_9");
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let store = ConversationStore::new();
        assert!(store.delete("nope").await.is_err());
    }
}
