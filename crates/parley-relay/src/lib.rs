pub mod conversation;
pub mod error;
pub mod rate_limit;
pub mod relay;

pub use conversation::ConversationStore;
pub use error::{UpstreamFailure, ValidationError};
pub use rate_limit::{RateLimitResult, RateLimiter};
pub use relay::{
    ChatRelay, ChatReply, ChatTurn, RelaySettings, AI_ERROR, AI_FAILURE_TEXT, MAX_MESSAGE_CHARS,
    MAX_SESSION_ID_CHARS, RATE_LIMIT_ERROR, RATE_LIMIT_TEXT,
};
