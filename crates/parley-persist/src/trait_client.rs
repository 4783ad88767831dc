use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parley_types::{
    AgentRecord, AnalyticsEvent, ConversationRecord, EmbedRecord, MessageRecord, NewConversation,
};

use crate::error::Result;

/// Backing store for embeds, conversations and analytics
///
/// Every lookup takes typed arguments; implementations must never splice
/// caller-provided strings into a query language.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Active embed for a public code, if any
    async fn find_active_embed(&self, embed_code: &str) -> Result<Option<EmbedRecord>>;

    /// Agent by id
    async fn get_agent(&self, agent_id: &str) -> Result<Option<AgentRecord>>;

    /// Number of user messages recorded for an embed key at or after `since`
    async fn count_user_messages_since(
        &self,
        embed_key: &str,
        since: DateTime<Utc>,
    ) -> Result<u64>;

    /// Conversation for an embed key + browser session
    async fn find_conversation(
        &self,
        embed_key: &str,
        session_id: &str,
    ) -> Result<Option<ConversationRecord>>;

    /// Insert a new conversation
    async fn create_conversation(&self, conversation: NewConversation)
        -> Result<ConversationRecord>;

    /// Append a message
    async fn save_message(&self, message: MessageRecord) -> Result<()>;

    /// Bump the message counter and last-activity timestamp of a conversation
    async fn touch_conversation(
        &self,
        conversation_id: &str,
        added_messages: u32,
        at: DateTime<Utc>,
    ) -> Result<()>;

    /// Record an analytics event
    async fn save_analytics_event(&self, event: AnalyticsEvent) -> Result<()>;

    /// Lightweight connectivity check
    async fn ping(&self) -> Result<()>;
}
