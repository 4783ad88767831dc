use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use parley_types::{
    AgentRecord, AnalyticsEvent, ConversationRecord, EmbedRecord, MessageRecord, MessageRole,
    NewConversation,
};

use crate::error::{PersistError, Result};
use crate::trait_client::StoreClient;

#[derive(Default)]
struct Tables {
    embeds: Vec<EmbedRecord>,
    agents: HashMap<String, AgentRecord>,
    conversations: Vec<ConversationRecord>,
    messages: Vec<MessageRecord>,
    analytics: Vec<AnalyticsEvent>,
}

/// Process-local store
///
/// Backs development runs (`store.backend = "memory"`) and tests. Reads and
/// writes can be switched off independently to rehearse store outages.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    reads_down: AtomicBool,
    writes_down: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_embed(&self, embed: EmbedRecord) {
        let mut tables = self.tables.write().await;
        tables.embeds.retain(|e| e.id != embed.id);
        tables.embeds.push(embed);
    }

    pub async fn insert_agent(&self, agent: AgentRecord) {
        self.tables
            .write()
            .await
            .agents
            .insert(agent.id.clone(), agent);
    }

    pub async fn remove_agent(&self, agent_id: &str) {
        self.tables.write().await.agents.remove(agent_id);
    }

    /// Make every read fail with [`PersistError::Unavailable`]
    pub fn set_reads_down(&self, down: bool) {
        self.reads_down.store(down, Ordering::SeqCst);
    }

    /// Make every write fail with [`PersistError::Unavailable`]
    pub fn set_writes_down(&self, down: bool) {
        self.writes_down.store(down, Ordering::SeqCst);
    }

    pub async fn conversations(&self) -> Vec<ConversationRecord> {
        self.tables.read().await.conversations.clone()
    }

    pub async fn messages(&self) -> Vec<MessageRecord> {
        self.tables.read().await.messages.clone()
    }

    pub async fn analytics_events(&self) -> Vec<AnalyticsEvent> {
        self.tables.read().await.analytics.clone()
    }

    fn check_reads(&self) -> Result<()> {
        if self.reads_down.load(Ordering::SeqCst) {
            return Err(PersistError::Unavailable("reads disabled".to_string()));
        }
        Ok(())
    }

    fn check_writes(&self) -> Result<()> {
        if self.writes_down.load(Ordering::SeqCst) {
            return Err(PersistError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn find_active_embed(&self, embed_code: &str) -> Result<Option<EmbedRecord>> {
        self.check_reads()?;
        let tables = self.tables.read().await;
        Ok(tables
            .embeds
            .iter()
            .find(|e| e.embed_code == embed_code && e.is_active)
            .cloned())
    }

    async fn get_agent(&self, agent_id: &str) -> Result<Option<AgentRecord>> {
        self.check_reads()?;
        Ok(self.tables.read().await.agents.get(agent_id).cloned())
    }

    async fn count_user_messages_since(
        &self,
        embed_key: &str,
        since: DateTime<Utc>,
    ) -> Result<u64> {
        self.check_reads()?;
        let tables = self.tables.read().await;
        let count = tables
            .messages
            .iter()
            .filter(|m| m.embed_key == embed_key)
            .filter(|m| m.role == MessageRole::User)
            .filter(|m| m.created_at >= since)
            .count();
        Ok(count as u64)
    }

    async fn find_conversation(
        &self,
        embed_key: &str,
        session_id: &str,
    ) -> Result<Option<ConversationRecord>> {
        self.check_reads()?;
        let tables = self.tables.read().await;
        Ok(tables
            .conversations
            .iter()
            .find(|c| c.embed_key == embed_key && c.session_id == session_id)
            .cloned())
    }

    async fn create_conversation(
        &self,
        conversation: NewConversation,
    ) -> Result<ConversationRecord> {
        self.check_writes()?;
        let record = conversation.into_record(Utc::now());
        self.tables
            .write()
            .await
            .conversations
            .push(record.clone());
        Ok(record)
    }

    async fn save_message(&self, message: MessageRecord) -> Result<()> {
        self.check_writes()?;
        self.tables.write().await.messages.push(message);
        Ok(())
    }

    async fn touch_conversation(
        &self,
        conversation_id: &str,
        added_messages: u32,
        at: DateTime<Utc>,
    ) -> Result<()> {
        self.check_writes()?;
        let mut tables = self.tables.write().await;
        let conversation = tables
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
            .ok_or_else(|| PersistError::ConversationNotFound(conversation_id.to_string()))?;

        conversation.total_messages += added_messages;
        conversation.last_message_at = at;
        Ok(())
    }

    async fn save_analytics_event(&self, event: AnalyticsEvent) -> Result<()> {
        self.check_writes()?;
        self.tables.write().await.analytics.push(event);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.check_reads()
    }
}
