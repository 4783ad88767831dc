use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::validate::is_hex_color;

/// Corner of the host page the widget is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetPosition {
    #[default]
    BottomRight,
    BottomLeft,
}

impl WidgetPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BottomRight => "bottom-right",
            Self::BottomLeft => "bottom-left",
        }
    }
}

/// One tier of the widget fallback chain
///
/// Every field is optional. Tiers are combined with [`PartialWidgetConfig::or`],
/// which keeps the first present value, and finally completed with the
/// built-in defaults by [`PartialWidgetConfig::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialWidgetConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub welcome_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<WidgetPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_open: Option<bool>,
}

/// Left-biased pick that also treats blank strings as absent
fn first_text(high: Option<String>, low: Option<String>) -> Option<String> {
    high.filter(|s| !s.trim().is_empty())
        .or_else(|| low.filter(|s| !s.trim().is_empty()))
}

impl PartialWidgetConfig {
    /// Merge with a lower-priority tier; values present on `self` win
    pub fn or(self, lower: PartialWidgetConfig) -> PartialWidgetConfig {
        PartialWidgetConfig {
            name: first_text(self.name, lower.name),
            system_prompt: first_text(self.system_prompt, lower.system_prompt),
            welcome_message: first_text(self.welcome_message, lower.welcome_message),
            placeholder: first_text(self.placeholder, lower.placeholder),
            primary_color: first_text(self.primary_color, lower.primary_color),
            background_color: first_text(self.background_color, lower.background_color),
            text_color: first_text(self.text_color, lower.text_color),
            border_radius: self.border_radius.or(lower.border_radius),
            font_size: self.font_size.or(lower.font_size),
            font_family: first_text(self.font_family, lower.font_family),
            // An explicit empty avatar still means "no avatar" at this tier
            avatar_url: self.avatar_url.or(lower.avatar_url),
            position: self.position.or(lower.position),
            auto_open: self.auto_open.or(lower.auto_open),
        }
    }

    /// Drop color values that are not hex colors so a lower tier applies
    pub fn sanitized(mut self) -> PartialWidgetConfig {
        for color in [
            &mut self.primary_color,
            &mut self.background_color,
            &mut self.text_color,
        ] {
            if color.as_deref().is_some_and(|c| !is_hex_color(c)) {
                *color = None;
            }
        }
        self
    }

    /// Complete the chain with built-in defaults
    pub fn resolve(self, embed_code: impl Into<String>) -> WidgetConfig {
        WidgetConfig {
            embed_code: embed_code.into(),
            name: self.name.unwrap_or_else(|| defaults::NAME.to_string()),
            system_prompt: self
                .system_prompt
                .unwrap_or_else(|| defaults::SYSTEM_PROMPT.to_string()),
            welcome_message: self
                .welcome_message
                .unwrap_or_else(|| defaults::WELCOME_MESSAGE.to_string()),
            placeholder: self
                .placeholder
                .unwrap_or_else(|| defaults::PLACEHOLDER.to_string()),
            primary_color: self
                .primary_color
                .unwrap_or_else(|| defaults::PRIMARY_COLOR.to_string()),
            background_color: self
                .background_color
                .unwrap_or_else(|| defaults::BACKGROUND_COLOR.to_string()),
            text_color: self
                .text_color
                .unwrap_or_else(|| defaults::TEXT_COLOR.to_string()),
            border_radius: self.border_radius.unwrap_or(defaults::BORDER_RADIUS),
            font_size: self.font_size.unwrap_or(defaults::FONT_SIZE),
            font_family: self
                .font_family
                .unwrap_or_else(|| defaults::FONT_FAMILY.to_string()),
            avatar_url: self
                .avatar_url
                .unwrap_or_else(|| defaults::AVATAR_URL.to_string()),
            position: self.position.unwrap_or_default(),
            auto_open: self.auto_open.unwrap_or(defaults::AUTO_OPEN),
        }
    }
}

/// Fully resolved widget configuration
///
/// Input to the script materializer. `system_prompt` is consumed by the chat
/// relay only and is never written into a generated script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub embed_code: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub system_prompt: String,
    pub welcome_message: String,
    pub placeholder: String,
    pub primary_color: String,
    pub background_color: String,
    pub text_color: String,
    pub border_radius: u32,
    pub font_size: u32,
    pub font_family: String,
    pub avatar_url: String,
    pub position: WidgetPosition,
    pub auto_open: bool,
}

impl WidgetConfig {
    /// All-defaults configuration for an embed code with no usable record
    pub fn fallback(embed_code: impl Into<String>) -> Self {
        PartialWidgetConfig::default().resolve(embed_code)
    }
}

impl From<WidgetConfig> for PartialWidgetConfig {
    fn from(config: WidgetConfig) -> Self {
        PartialWidgetConfig {
            name: Some(config.name),
            system_prompt: Some(config.system_prompt),
            welcome_message: Some(config.welcome_message),
            placeholder: Some(config.placeholder),
            primary_color: Some(config.primary_color),
            background_color: Some(config.background_color),
            text_color: Some(config.text_color),
            border_radius: Some(config.border_radius),
            font_size: Some(config.font_size),
            font_family: Some(config.font_family),
            avatar_url: Some(config.avatar_url),
            position: Some(config.position),
            auto_open: Some(config.auto_open),
        }
    }
}
