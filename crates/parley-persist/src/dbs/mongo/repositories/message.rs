use chrono::{DateTime, Utc};
use mongodb::{bson, bson::doc, Client, Collection};

use crate::dbs::mongo::models::MongoMessage;
use crate::error::Result;

#[derive(Clone)]
pub struct MongoMessageRepository {
    collection: Collection<MongoMessage>,
}

impl MongoMessageRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("messages");
        Self { collection }
    }

    /// Save a single message
    pub async fn save_message(&self, message: &MongoMessage) -> Result<()> {
        self.collection.insert_one(message).await?;
        Ok(())
    }

    /// Count user messages for an embed key created at or after `since`
    pub async fn count_user_messages_since(
        &self,
        embed_key: &str,
        since: DateTime<Utc>,
    ) -> Result<u64> {
        let filter = doc! {
            "embed_key": embed_key,
            "role": "user",
            "created_at": { "$gte": bson::DateTime::from_chrono(since) }
        };
        Ok(self.collection.count_documents(filter).await?)
    }
}
