use std::sync::Arc;

use chrono::Utc;
use parley_persist::{Result, StoreClient};
use parley_types::{ConversationRecord, MessageRecord, MessageRole, NewConversation};

/// Conversation tracking for the public chat endpoint
///
/// One conversation per `(embed_key, session_id)`. Lookups race with creation
/// across concurrent requests of the same session; a rare duplicate is
/// tolerated.
pub struct ConversationStore {
    store: Arc<dyn StoreClient>,
}

impl ConversationStore {
    pub fn new(store: Arc<dyn StoreClient>) -> Self {
        Self { store }
    }

    pub async fn get_or_create(
        &self,
        embed_key: &str,
        session_id: &str,
        visitor_ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<ConversationRecord> {
        if let Some(existing) = self.store.find_conversation(embed_key, session_id).await? {
            return Ok(existing);
        }

        let conversation = self
            .store
            .create_conversation(NewConversation {
                embed_key: embed_key.to_string(),
                session_id: session_id.to_string(),
                visitor_ip: visitor_ip.map(str::to_string),
                user_agent: user_agent.map(str::to_string),
            })
            .await?;

        tracing::debug!(
            conversation_id = %conversation.id,
            embed_key = %embed_key,
            "Started conversation"
        );
        Ok(conversation)
    }

    /// Store one user/assistant exchange. Failures are logged, never returned.
    pub async fn append_turn(
        &self,
        conversation: &ConversationRecord,
        user_text: &str,
        assistant_text: &str,
    ) {
        let now = Utc::now();
        let messages = [
            MessageRecord::new(conversation, MessageRole::User, user_text, now),
            MessageRecord::new(conversation, MessageRole::Assistant, assistant_text, now),
        ];

        let mut saved = 0;
        for message in messages {
            if let Err(e) = self.store.save_message(message).await {
                tracing::warn!(
                    step = "persist",
                    conversation_id = %conversation.id,
                    error = %e,
                    "Failed to save message"
                );
                continue;
            }
            saved += 1;
        }

        if saved == 0 {
            return;
        }

        if let Err(e) = self
            .store
            .touch_conversation(&conversation.id, saved, now)
            .await
        {
            tracing::warn!(
                step = "persist",
                conversation_id = %conversation.id,
                error = %e,
                "Failed to update conversation counters"
            );
        }
    }
}
