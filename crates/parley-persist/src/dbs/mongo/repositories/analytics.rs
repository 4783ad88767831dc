use mongodb::{Client, Collection};

use crate::dbs::mongo::models::MongoAnalyticsEvent;
use crate::error::Result;

#[derive(Clone)]
pub struct MongoAnalyticsRepository {
    collection: Collection<MongoAnalyticsEvent>,
}

impl MongoAnalyticsRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("analytics_events");
        Self { collection }
    }

    pub async fn save_event(&self, event: &MongoAnalyticsEvent) -> Result<()> {
        self.collection.insert_one(event).await?;
        Ok(())
    }
}
