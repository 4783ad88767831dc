//! Built-in values used when neither the embed nor its agent sets a field.

pub const NAME: &str = "AI Assistant";
pub const SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant. Answer questions clearly and concisely.";
pub const WELCOME_MESSAGE: &str = "Hi! How can I help you today?";
pub const PLACEHOLDER: &str = "Type your message...";
pub const PRIMARY_COLOR: &str = "#3B82F6";
pub const BACKGROUND_COLOR: &str = "#FFFFFF";
pub const TEXT_COLOR: &str = "#1F2937";
pub const BORDER_RADIUS: u32 = 12;
pub const FONT_SIZE: u32 = 14;
pub const FONT_FAMILY: &str = "system-ui, -apple-system, sans-serif";
pub const AVATAR_URL: &str = "";
pub const AUTO_OPEN: bool = false;

pub const MAX_REQUESTS_PER_HOUR: u32 = 100;
pub const MAX_REQUESTS_PER_DAY: u32 = 1000;

/// Shared rate-limit and ownership key for every code that did not resolve
pub const FALLBACK_EMBED_KEY: &str = "__fallback__";
