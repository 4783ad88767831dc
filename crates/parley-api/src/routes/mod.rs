pub mod analytics;
pub mod embed_preview;
pub mod embed_script;
pub mod health;
pub mod openapi;
pub mod public_chat;
