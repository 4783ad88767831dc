use mongodb::{bson::doc, Client, Collection};

use crate::dbs::mongo::models::{MongoAgent, MongoEmbed};
use crate::error::Result;

#[derive(Clone)]
pub struct MongoEmbedRepository {
    embeds: Collection<MongoEmbed>,
    agents: Collection<MongoAgent>,
}

impl MongoEmbedRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let database = client.database(db_name);
        Self {
            embeds: database.collection("embeds"),
            agents: database.collection("agents"),
        }
    }

    /// Active embed by public code
    pub async fn find_active(&self, embed_code: &str) -> Result<Option<MongoEmbed>> {
        let filter = doc! { "embed_code": embed_code, "is_active": true };
        Ok(self.embeds.find_one(filter).await?)
    }

    /// Agent by id
    pub async fn get_agent(&self, agent_id: &str) -> Result<Option<MongoAgent>> {
        let filter = doc! { "_id": agent_id };
        Ok(self.agents.find_one(filter).await?)
    }

    /// Insert or replace an embed (keyed by id)
    pub async fn upsert_embed(&self, embed: &MongoEmbed) -> Result<()> {
        self.embeds
            .replace_one(doc! { "_id": embed.id.as_str() }, embed)
            .upsert(true)
            .await?;
        Ok(())
    }

    /// Insert or replace an agent (keyed by id)
    pub async fn upsert_agent(&self, agent: &MongoAgent) -> Result<()> {
        self.agents
            .replace_one(doc! { "_id": agent.id.as_str() }, agent)
            .upsert(true)
            .await?;
        Ok(())
    }
}
