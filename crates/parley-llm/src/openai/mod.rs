mod client;

pub use client::{OpenAIClient, DEFAULT_TIMEOUT, OPENAI_API_BASE};
