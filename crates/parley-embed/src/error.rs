use parley_persist::PersistError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("No active embed for code: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] PersistError),
}
