pub mod analytics;
pub mod conversation;
pub mod defaults;
pub mod records;
pub mod validate;
pub mod widget;

pub use analytics::AnalyticsEvent;
pub use conversation::{ConversationRecord, MessageRecord, MessageRole, NewConversation};
pub use records::{AgentRecord, EmbedRecord};
pub use widget::{PartialWidgetConfig, WidgetConfig, WidgetPosition};
