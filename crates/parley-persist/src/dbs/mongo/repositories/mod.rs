pub mod analytics;
pub mod conversation;
pub mod embed;
pub mod message;

pub use analytics::MongoAnalyticsRepository;
pub use conversation::MongoConversationRepository;
pub use embed::MongoEmbedRepository;
pub use message::MongoMessageRepository;
