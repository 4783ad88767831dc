use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{
    bson::{doc, Document},
    Client, IndexModel,
};

use parley_types::{
    AgentRecord, AnalyticsEvent, ConversationRecord, EmbedRecord, MessageRecord, NewConversation,
};

use crate::dbs::mongo::models::{MongoAnalyticsEvent, MongoConversation, MongoMessage};
use crate::dbs::mongo::repositories::{
    MongoAnalyticsRepository, MongoConversationRepository, MongoEmbedRepository,
    MongoMessageRepository,
};
use crate::error::{PersistError, Result};
use crate::trait_client::StoreClient;

pub struct MongoStore {
    client: Client,
    database: String,
    embed_repo: MongoEmbedRepository,
    conversation_repo: MongoConversationRepository,
    message_repo: MongoMessageRepository,
    analytics_repo: MongoAnalyticsRepository,
}

impl MongoStore {
    /// Connect to MongoDB and create client
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        let store = Self {
            embed_repo: MongoEmbedRepository::new(&client, database),
            conversation_repo: MongoConversationRepository::new(&client, database),
            message_repo: MongoMessageRepository::new(&client, database),
            analytics_repo: MongoAnalyticsRepository::new(&client, database),
            database: database.to_string(),
            client,
        };

        // Lookups still work without indexes, only slower
        if let Err(e) = store.ensure_indexes().await {
            tracing::warn!(database = %database, error = %e, "Failed to create MongoDB indexes");
        }

        Ok(store)
    }

    /// Indexes backing the per-request lookups and rate-limit counts
    pub async fn ensure_indexes(&self) -> Result<()> {
        let db = self.client.database(&self.database);
        let indexes = [
            ("embeds", doc! { "embed_code": 1, "is_active": 1 }),
            ("conversations", doc! { "embed_key": 1, "session_id": 1 }),
            ("messages", doc! { "embed_key": 1, "role": 1, "created_at": -1 }),
            ("analytics_events", doc! { "embed_code": 1, "created_at": -1 }),
        ];

        for (collection, keys) in indexes {
            db.collection::<Document>(collection)
                .create_index(IndexModel::builder().keys(keys).build())
                .await?;
        }

        tracing::debug!(database = %self.database, "MongoDB indexes ensured");
        Ok(())
    }

    /// Insert or replace an embed record (operator tooling)
    pub async fn upsert_embed(&self, embed: EmbedRecord) -> Result<()> {
        self.embed_repo.upsert_embed(&embed.into()).await
    }

    /// Insert or replace an agent record (operator tooling)
    pub async fn upsert_agent(&self, agent: AgentRecord) -> Result<()> {
        self.embed_repo.upsert_agent(&agent.into()).await
    }
}

#[async_trait]
impl StoreClient for MongoStore {
    async fn find_active_embed(&self, embed_code: &str) -> Result<Option<EmbedRecord>> {
        let embed = self.embed_repo.find_active(embed_code).await?;
        Ok(embed.map(Into::into))
    }

    async fn get_agent(&self, agent_id: &str) -> Result<Option<AgentRecord>> {
        let agent = self.embed_repo.get_agent(agent_id).await?;
        Ok(agent.map(Into::into))
    }

    async fn count_user_messages_since(
        &self,
        embed_key: &str,
        since: DateTime<Utc>,
    ) -> Result<u64> {
        self.message_repo
            .count_user_messages_since(embed_key, since)
            .await
    }

    async fn find_conversation(
        &self,
        embed_key: &str,
        session_id: &str,
    ) -> Result<Option<ConversationRecord>> {
        let conversation = self.conversation_repo.find(embed_key, session_id).await?;
        Ok(conversation.map(Into::into))
    }

    async fn create_conversation(
        &self,
        conversation: NewConversation,
    ) -> Result<ConversationRecord> {
        let record = conversation.into_record(Utc::now());
        let doc: MongoConversation = record.clone().into();
        self.conversation_repo.create(&doc).await?;
        Ok(record)
    }

    async fn save_message(&self, message: MessageRecord) -> Result<()> {
        let doc: MongoMessage = message.into();
        self.message_repo.save_message(&doc).await
    }

    async fn touch_conversation(
        &self,
        conversation_id: &str,
        added_messages: u32,
        at: DateTime<Utc>,
    ) -> Result<()> {
        self.conversation_repo
            .touch(conversation_id, added_messages, at)
            .await
    }

    async fn save_analytics_event(&self, event: AnalyticsEvent) -> Result<()> {
        let doc = MongoAnalyticsEvent::try_from(event)?;
        self.analytics_repo.save_event(&doc).await
    }

    async fn ping(&self) -> Result<()> {
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }
}
