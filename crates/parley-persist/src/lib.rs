pub mod dbs;
pub mod error;
pub mod trait_client;

pub use dbs::memory::MemoryStore;
#[cfg(feature = "mongodb")]
pub use dbs::mongo::MongoStore;
pub use error::{PersistError, Result};
pub use trait_client::StoreClient;
