use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A browser session talking to one embed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: String,
    /// Embed record id, or `defaults::FALLBACK_EMBED_KEY` when the embed did not resolve
    pub embed_key: String,
    pub session_id: String,
    pub visitor_ip: Option<String>,
    pub user_agent: Option<String>,
    pub total_messages: u32,
    pub last_message_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the relay when a session sends its first message
#[derive(Debug, Clone)]
pub struct NewConversation {
    pub embed_key: String,
    pub session_id: String,
    pub visitor_ip: Option<String>,
    pub user_agent: Option<String>,
}

impl NewConversation {
    pub fn into_record(self, now: DateTime<Utc>) -> ConversationRecord {
        ConversationRecord {
            id: uuid::Uuid::new_v4().to_string(),
            embed_key: self.embed_key,
            session_id: self.session_id,
            visitor_ip: self.visitor_ip,
            user_agent: self.user_agent,
            total_messages: 0,
            last_message_at: now,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One side of a chat turn; append-only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    pub conversation_id: String,
    pub embed_key: String,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl MessageRecord {
    pub fn new(
        conversation: &ConversationRecord,
        role: MessageRole,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: conversation.id.clone(),
            embed_key: conversation.embed_key.clone(),
            role,
            content: content.into(),
            created_at,
        }
    }
}
