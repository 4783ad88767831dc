use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parley_types::{
    AgentRecord, AnalyticsEvent, ConversationRecord, EmbedRecord, MessageRecord, MessageRole,
    PartialWidgetConfig, WidgetPosition,
};

// Timestamps are stored as BSON dates so range filters compare natively.

/// MongoDB document for `embeds`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoEmbed {
    #[serde(rename = "_id")]
    pub id: String,
    pub embed_code: String,
    pub agent_id: Option<String>,
    pub display_name: Option<String>,
    pub is_active: bool,
    pub max_requests_per_hour: Option<i64>,
    pub max_requests_per_day: Option<i64>,
    #[serde(default)]
    pub theme: PartialWidgetConfig,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// MongoDB document for `agents`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoAgent {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub system_prompt: Option<String>,
    pub welcome_message: Option<String>,
    pub placeholder: Option<String>,
    pub primary_color: Option<String>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub border_radius: Option<i64>,
    pub font_size: Option<i64>,
    pub font_family: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub position: Option<WidgetPosition>,
    #[serde(default)]
    pub auto_open: Option<bool>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// MongoDB document for `conversations`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConversation {
    #[serde(rename = "_id")]
    pub id: String,
    pub embed_key: String,
    pub session_id: String,
    pub visitor_ip: Option<String>,
    pub user_agent: Option<String>,
    pub total_messages: i64,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub last_message_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// MongoDB document for `messages`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMessage {
    #[serde(rename = "_id")]
    pub id: String,
    pub conversation_id: String,
    pub embed_key: String,
    pub role: MessageRole,
    pub content: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// MongoDB document for `analytics_events`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoAnalyticsEvent {
    #[serde(rename = "_id")]
    pub id: String,
    pub embed_code: String,
    pub event_type: String,
    pub session_id: Option<String>,
    pub page_url: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub metadata: bson::Bson,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

// Conversions between store-agnostic and MongoDB-specific models

fn to_u32(value: Option<i64>) -> Option<u32> {
    value.and_then(|v| u32::try_from(v).ok())
}

impl From<MongoEmbed> for EmbedRecord {
    fn from(doc: MongoEmbed) -> Self {
        Self {
            id: doc.id,
            embed_code: doc.embed_code,
            agent_id: doc.agent_id,
            display_name: doc.display_name,
            is_active: doc.is_active,
            max_requests_per_hour: to_u32(doc.max_requests_per_hour),
            max_requests_per_day: to_u32(doc.max_requests_per_day),
            theme: doc.theme,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

impl From<EmbedRecord> for MongoEmbed {
    fn from(record: EmbedRecord) -> Self {
        Self {
            id: record.id,
            embed_code: record.embed_code,
            agent_id: record.agent_id,
            display_name: record.display_name,
            is_active: record.is_active,
            max_requests_per_hour: record.max_requests_per_hour.map(i64::from),
            max_requests_per_day: record.max_requests_per_day.map(i64::from),
            theme: record.theme,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<MongoAgent> for AgentRecord {
    fn from(doc: MongoAgent) -> Self {
        Self {
            id: doc.id,
            user_id: doc.user_id,
            name: doc.name,
            system_prompt: doc.system_prompt,
            welcome_message: doc.welcome_message,
            placeholder: doc.placeholder,
            primary_color: doc.primary_color,
            background_color: doc.background_color,
            text_color: doc.text_color,
            border_radius: to_u32(doc.border_radius),
            font_size: to_u32(doc.font_size),
            font_family: doc.font_family,
            avatar_url: doc.avatar_url,
            position: doc.position,
            auto_open: doc.auto_open,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

impl From<AgentRecord> for MongoAgent {
    fn from(record: AgentRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            name: record.name,
            system_prompt: record.system_prompt,
            welcome_message: record.welcome_message,
            placeholder: record.placeholder,
            primary_color: record.primary_color,
            background_color: record.background_color,
            text_color: record.text_color,
            border_radius: record.border_radius.map(i64::from),
            font_size: record.font_size.map(i64::from),
            font_family: record.font_family,
            avatar_url: record.avatar_url,
            position: record.position,
            auto_open: record.auto_open,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<MongoConversation> for ConversationRecord {
    fn from(doc: MongoConversation) -> Self {
        Self {
            id: doc.id,
            embed_key: doc.embed_key,
            session_id: doc.session_id,
            visitor_ip: doc.visitor_ip,
            user_agent: doc.user_agent,
            total_messages: u32::try_from(doc.total_messages).unwrap_or(u32::MAX),
            last_message_at: doc.last_message_at,
            created_at: doc.created_at,
        }
    }
}

impl From<ConversationRecord> for MongoConversation {
    fn from(record: ConversationRecord) -> Self {
        Self {
            id: record.id,
            embed_key: record.embed_key,
            session_id: record.session_id,
            visitor_ip: record.visitor_ip,
            user_agent: record.user_agent,
            total_messages: i64::from(record.total_messages),
            last_message_at: record.last_message_at,
            created_at: record.created_at,
        }
    }
}

impl From<MessageRecord> for MongoMessage {
    fn from(record: MessageRecord) -> Self {
        Self {
            id: record.id,
            conversation_id: record.conversation_id,
            embed_key: record.embed_key,
            role: record.role,
            content: record.content,
            created_at: record.created_at,
        }
    }
}

impl TryFrom<AnalyticsEvent> for MongoAnalyticsEvent {
    type Error = bson::ser::Error;

    fn try_from(event: AnalyticsEvent) -> Result<Self, Self::Error> {
        Ok(Self {
            id: event.id,
            embed_code: event.embed_code,
            event_type: event.event_type,
            session_id: event.session_id,
            page_url: event.page_url,
            referrer: event.referrer,
            user_agent: event.user_agent,
            metadata: bson::to_bson(&event.metadata)?,
            created_at: event.created_at,
        })
    }
}
