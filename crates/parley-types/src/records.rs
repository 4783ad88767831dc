use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::widget::{PartialWidgetConfig, WidgetPosition};

/// A published deployment of an agent, addressed by its public embed code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedRecord {
    pub id: String,
    /// Public URL-safe token; never changes once issued
    pub embed_code: String,
    pub agent_id: Option<String>,
    pub display_name: Option<String>,
    pub is_active: bool,
    pub max_requests_per_hour: Option<u32>,
    pub max_requests_per_day: Option<u32>,
    /// Embed-level overrides, highest priority in the fallback chain
    #[serde(default)]
    pub theme: PartialWidgetConfig,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EmbedRecord {
    pub fn new(embed_code: impl Into<String>, agent_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            embed_code: embed_code.into(),
            agent_id,
            display_name: None,
            is_active: true,
            max_requests_per_hour: None,
            max_requests_per_day: None,
            theme: PartialWidgetConfig::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Embed tier of the fallback chain (`display_name` acts as the name override)
    pub fn tier(&self) -> PartialWidgetConfig {
        PartialWidgetConfig {
            name: self.display_name.clone(),
            ..PartialWidgetConfig::default()
        }
        .or(self.theme.clone())
    }
}

/// Chatbot persona owned by a dashboard user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub system_prompt: Option<String>,
    pub welcome_message: Option<String>,
    pub placeholder: Option<String>,
    pub primary_color: Option<String>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub border_radius: Option<u32>,
    pub font_size: Option<u32>,
    pub font_family: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub position: Option<WidgetPosition>,
    #[serde(default)]
    pub auto_open: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AgentRecord {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            name: name.into(),
            system_prompt: None,
            welcome_message: None,
            placeholder: None,
            primary_color: None,
            background_color: None,
            text_color: None,
            border_radius: None,
            font_size: None,
            font_family: None,
            avatar_url: None,
            position: None,
            auto_open: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Agent tier of the fallback chain
    pub fn tier(&self) -> PartialWidgetConfig {
        PartialWidgetConfig {
            name: Some(self.name.clone()),
            system_prompt: self.system_prompt.clone(),
            welcome_message: self.welcome_message.clone(),
            placeholder: self.placeholder.clone(),
            primary_color: self.primary_color.clone(),
            background_color: self.background_color.clone(),
            text_color: self.text_color.clone(),
            border_radius: self.border_radius,
            font_size: self.font_size,
            font_family: self.font_family.clone(),
            avatar_url: self.avatar_url.clone(),
            position: self.position,
            auto_open: self.auto_open,
        }
    }
}
