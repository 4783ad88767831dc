use chrono::{DateTime, Utc};
use mongodb::{bson, bson::doc, Client, Collection};

use crate::dbs::mongo::models::MongoConversation;
use crate::error::{PersistError, Result};

#[derive(Clone)]
pub struct MongoConversationRepository {
    collection: Collection<MongoConversation>,
}

impl MongoConversationRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("conversations");
        Self { collection }
    }

    /// Conversation for an embed key + session
    pub async fn find(
        &self,
        embed_key: &str,
        session_id: &str,
    ) -> Result<Option<MongoConversation>> {
        let filter = doc! { "embed_key": embed_key, "session_id": session_id };
        Ok(self.collection.find_one(filter).await?)
    }

    /// Insert a new conversation
    pub async fn create(&self, conversation: &MongoConversation) -> Result<()> {
        self.collection.insert_one(conversation).await?;
        Ok(())
    }

    /// Increment the message counter and set last activity
    pub async fn touch(
        &self,
        conversation_id: &str,
        added_messages: u32,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let filter = doc! { "_id": conversation_id };
        let update = doc! {
            "$inc": { "total_messages": i64::from(added_messages) },
            "$set": { "last_message_at": bson::DateTime::from_chrono(at) }
        };

        let result = self.collection.update_one(filter, update).await?;
        if result.matched_count == 0 {
            return Err(PersistError::ConversationNotFound(conversation_id.to_string()));
        }
        Ok(())
    }
}
