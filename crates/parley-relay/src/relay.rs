use std::sync::Arc;
use std::time::Duration;

use parley_embed::ConfigResolver;
use parley_llm::{ChatClient, ChatOptions, ChatRequest, Message};
use parley_persist::StoreClient;
use parley_types::validate::is_valid_embed_code;
use serde::Serialize;

use crate::conversation::ConversationStore;
use crate::error::{UpstreamFailure, ValidationError};
use crate::rate_limit::RateLimiter;

pub const AI_FAILURE_TEXT: &str =
    "I'm sorry, I'm having trouble processing your request right now. Please try again in a moment.";
pub const RATE_LIMIT_TEXT: &str =
    "This chat has received too many messages. Please try again later.";

pub const AI_ERROR: &str = "AI API error";
pub const RATE_LIMIT_ERROR: &str = "Rate limit exceeded";

pub const MAX_MESSAGE_CHARS: usize = 4000;
pub const MAX_SESSION_ID_CHARS: usize = 128;

/// A validated visitor message
#[derive(Debug, Clone)]
pub struct ChatTurn {
    embed_code: String,
    message: String,
    session_id: String,
    visitor_ip: Option<String>,
    user_agent: Option<String>,
}

impl ChatTurn {
    pub fn new(
        embed_code: impl Into<String>,
        message: impl Into<String>,
        session_id: impl Into<String>,
        visitor_ip: Option<String>,
        user_agent: Option<String>,
    ) -> Result<Self, ValidationError> {
        let embed_code = embed_code.into().trim().to_string();
        let message = message.into().trim().to_string();
        let session_id = session_id.into().trim().to_string();

        if embed_code.is_empty() {
            return Err(ValidationError::Missing("embedCode"));
        }
        if !is_valid_embed_code(&embed_code) {
            return Err(ValidationError::Invalid("embedCode"));
        }
        if message.is_empty() {
            return Err(ValidationError::Missing("message"));
        }
        if session_id.is_empty() {
            return Err(ValidationError::Missing("sessionId"));
        }
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(ValidationError::TooLong {
                field: "message",
                max: MAX_MESSAGE_CHARS,
            });
        }
        if session_id.chars().count() > MAX_SESSION_ID_CHARS {
            return Err(ValidationError::TooLong {
                field: "sessionId",
                max: MAX_SESSION_ID_CHARS,
            });
        }

        Ok(Self {
            embed_code,
            message,
            session_id,
            visitor_ip: visitor_ip.filter(|v| !v.trim().is_empty()),
            user_agent: user_agent.filter(|v| !v.trim().is_empty()),
        })
    }

    pub fn embed_code(&self) -> &str {
        &self.embed_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Response body of the public chat endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub message: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatReply {
    fn answer(message: String, session_id: &str) -> Self {
        Self {
            message,
            session_id: session_id.to_string(),
            error: None,
        }
    }

    fn rate_limited(session_id: &str) -> Self {
        Self {
            message: RATE_LIMIT_TEXT.to_string(),
            session_id: session_id.to_string(),
            error: Some(RATE_LIMIT_ERROR.to_string()),
        }
    }

    fn ai_failure(session_id: &str) -> Self {
        Self {
            message: AI_FAILURE_TEXT.to_string(),
            session_id: session_id.to_string(),
            error: Some(AI_ERROR.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Sampling and timeout policy for relay AI calls
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub ai_timeout: Duration,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 500,
            ai_timeout: Duration::from_secs(30),
        }
    }
}

/// Request-handling core of the public chat endpoint
///
/// Steps run in order: resolve, rate check, conversation, AI call, persist.
/// Only a rate-limit rejection or an AI failure changes the reply; store
/// problems are logged and skipped.
pub struct ChatRelay {
    resolver: Arc<ConfigResolver>,
    limiter: RateLimiter,
    conversations: ConversationStore,
    llm: Arc<dyn ChatClient>,
    settings: RelaySettings,
}

impl ChatRelay {
    pub fn new(
        store: Arc<dyn StoreClient>,
        resolver: Arc<ConfigResolver>,
        llm: Arc<dyn ChatClient>,
        settings: RelaySettings,
    ) -> Self {
        Self {
            resolver,
            limiter: RateLimiter::new(Arc::clone(&store)),
            conversations: ConversationStore::new(store),
            llm,
            settings,
        }
    }

    pub async fn handle(&self, turn: ChatTurn) -> ChatReply {
        let resolved = self.resolver.resolve_or_default(turn.embed_code()).await;
        let embed_key = resolved.embed_key();

        let limit = self.limiter.check_limit(embed_key, resolved.limits).await;
        if !limit.allowed {
            tracing::info!(
                step = "rate_check",
                embed_key = %embed_key,
                reason = limit.reason.unwrap_or_default(),
                hourly_count = limit.hourly_count,
                daily_count = limit.daily_count,
                "Rejected chat request"
            );
            return ChatReply::rate_limited(turn.session_id());
        }

        let conversation = match self
            .conversations
            .get_or_create(
                embed_key,
                turn.session_id(),
                turn.visitor_ip.as_deref(),
                turn.user_agent.as_deref(),
            )
            .await
        {
            Ok(conversation) => Some(conversation),
            Err(e) => {
                tracing::warn!(
                    step = "conversation",
                    embed_key = %embed_key,
                    error = %e,
                    "Continuing without conversation tracking"
                );
                None
            }
        };

        let answer = match self
            .complete(&resolved.config.system_prompt, turn.message())
            .await
        {
            Ok(answer) => answer,
            Err(failure) => {
                tracing::error!(
                    step = "ai_call",
                    embed_key = %embed_key,
                    error = %failure,
                    "AI call failed, returning fallback"
                );
                return ChatReply::ai_failure(turn.session_id());
            }
        };

        if let Some(conversation) = &conversation {
            self.conversations
                .append_turn(conversation, turn.message(), &answer)
                .await;
        }

        ChatReply::answer(answer, turn.session_id())
    }

    async fn complete(&self, system_prompt: &str, message: &str) -> Result<String, UpstreamFailure> {
        let request = ChatRequest::new(
            self.settings.model.clone(),
            vec![Message::system(system_prompt), Message::human(message)],
        )
        .with_options(
            ChatOptions::new()
                .temperature(self.settings.temperature)
                .max_tokens(self.settings.max_tokens),
        );

        let response = tokio::time::timeout(self.settings.ai_timeout, self.llm.chat(request))
            .await
            .map_err(|_| UpstreamFailure::Timeout(self.settings.ai_timeout))??;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "AI call completed"
            );
        }

        response
            .text()
            .map(str::to_string)
            .ok_or(UpstreamFailure::EmptyCompletion)
    }
}
