use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Page-view or widget interaction reported by an embedded script
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub id: String,
    pub embed_code: String,
    pub event_type: String,
    pub session_id: Option<String>,
    pub page_url: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl AnalyticsEvent {
    pub fn new(embed_code: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            embed_code: embed_code.into(),
            event_type: event_type.into(),
            session_id: None,
            page_url: None,
            referrer: None,
            user_agent: None,
            metadata: serde_json::Value::Null,
            created_at: Utc::now(),
        }
    }
}
