use std::sync::Arc;
use std::time::Duration;

use parley_persist::StoreClient;
use parley_types::{defaults, EmbedRecord, PartialWidgetConfig, WidgetConfig};

use crate::cache::TtlCache;
use crate::error::ResolveError;

/// Request quotas that apply to one embed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimits {
    pub per_hour: u32,
    pub per_day: u32,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            per_hour: defaults::MAX_REQUESTS_PER_HOUR,
            per_day: defaults::MAX_REQUESTS_PER_DAY,
        }
    }
}

/// Outcome of resolving an embed code
#[derive(Debug, Clone)]
pub struct ResolvedEmbed {
    pub config: WidgetConfig,
    /// `None` when the code has no active record and defaults were used
    pub embed: Option<EmbedRecord>,
    pub limits: RateLimits,
}

impl ResolvedEmbed {
    /// All-defaults result for an unknown or unreadable embed code
    pub fn fallback(embed_code: &str, limits: RateLimits) -> Self {
        Self {
            config: WidgetConfig::fallback(embed_code),
            embed: None,
            limits,
        }
    }

    /// Identity used for rate limiting and conversation ownership
    ///
    /// Unknown codes all share [`defaults::FALLBACK_EMBED_KEY`], so rotating
    /// codes cannot mint fresh quotas.
    pub fn embed_key(&self) -> &str {
        match &self.embed {
            Some(embed) => &embed.id,
            None => defaults::FALLBACK_EMBED_KEY,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.embed.is_none()
    }
}

/// Turns public embed codes into complete widget configurations
///
/// Fallback chain, highest priority first: embed overrides, agent values,
/// built-in defaults. Successful lookups (including "not found") are cached
/// for `cache_ttl`; store errors are not.
pub struct ConfigResolver {
    store: Arc<dyn StoreClient>,
    cache: TtlCache<Option<ResolvedEmbed>>,
    default_limits: RateLimits,
}

impl ConfigResolver {
    pub fn new(store: Arc<dyn StoreClient>, cache_ttl: Duration, default_limits: RateLimits) -> Self {
        Self {
            store,
            cache: TtlCache::new(cache_ttl),
            default_limits,
        }
    }

    pub fn default_limits(&self) -> RateLimits {
        self.default_limits
    }

    /// Resolve an embed code, reporting `NotFound` and store errors
    pub async fn resolve(&self, embed_code: &str) -> Result<ResolvedEmbed, ResolveError> {
        if let Some(cached) = self.cache.get(embed_code) {
            return cached.ok_or_else(|| ResolveError::NotFound(embed_code.to_string()));
        }

        let resolved = self.lookup(embed_code).await?;
        self.cache.insert(embed_code, resolved.clone());
        resolved.ok_or_else(|| ResolveError::NotFound(embed_code.to_string()))
    }

    /// Resolve an embed code, substituting defaults on any failure
    pub async fn resolve_or_default(&self, embed_code: &str) -> ResolvedEmbed {
        match self.resolve(embed_code).await {
            Ok(resolved) => resolved,
            Err(ResolveError::NotFound(_)) => {
                tracing::debug!(embed_code = %embed_code, "No active embed, using defaults");
                ResolvedEmbed::fallback(embed_code, self.default_limits)
            }
            Err(ResolveError::Store(e)) => {
                tracing::warn!(embed_code = %embed_code, error = %e, "Embed lookup failed, using defaults");
                ResolvedEmbed::fallback(embed_code, self.default_limits)
            }
        }
    }

    /// Drop a cached resolution (e.g. after an embed was edited)
    pub fn invalidate(&self, embed_code: &str) {
        self.cache.invalidate(embed_code);
    }

    async fn lookup(&self, embed_code: &str) -> Result<Option<ResolvedEmbed>, ResolveError> {
        let Some(embed) = self.store.find_active_embed(embed_code).await? else {
            return Ok(None);
        };

        let agent_tier = match embed.agent_id.as_deref() {
            Some(agent_id) => match self.store.get_agent(agent_id).await? {
                Some(agent) => agent.tier(),
                None => {
                    tracing::warn!(
                        embed_code = %embed_code,
                        agent_id = %agent_id,
                        "Embed references a missing agent"
                    );
                    PartialWidgetConfig::default()
                }
            },
            None => PartialWidgetConfig::default(),
        };

        let config = embed
            .tier()
            .sanitized()
            .or(agent_tier.sanitized())
            .resolve(embed_code);

        let limits = RateLimits {
            per_hour: embed
                .max_requests_per_hour
                .unwrap_or(self.default_limits.per_hour),
            per_day: embed
                .max_requests_per_day
                .unwrap_or(self.default_limits.per_day),
        };

        Ok(Some(ResolvedEmbed {
            config,
            embed: Some(embed),
            limits,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_persist::MemoryStore;
    use parley_types::AgentRecord;

    async fn store_with_support_bot() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let mut agent =
            AgentRecord::new("user-1", "Support Bot").with_system_prompt("You are concise.");
        agent.id = "agent-1".to_string();
        agent.primary_color = Some("#10B981".to_string());
        agent.welcome_message = Some("Welcome to Acme!".to_string());
        store.insert_agent(agent).await;

        let mut embed = EmbedRecord::new("abc123", Some("agent-1".to_string()));
        embed.id = "embed-1".to_string();
        embed.max_requests_per_hour = Some(10);
        store.insert_embed(embed).await;
        store
    }

    fn resolver(store: Arc<MemoryStore>, ttl: Duration) -> ConfigResolver {
        ConfigResolver::new(store, ttl, RateLimits::default())
    }

    #[tokio::test]
    async fn test_found_embed_merges_agent_values() {
        let store = store_with_support_bot().await;
        let resolved = resolver(store, Duration::ZERO)
            .resolve("abc123")
            .await
            .unwrap();

        assert_eq!(resolved.embed_key(), "embed-1");
        assert_eq!(resolved.config.name, "Support Bot");
        assert_eq!(resolved.config.system_prompt, "You are concise.");
        assert_eq!(resolved.config.primary_color, "#10B981");
        assert_eq!(resolved.config.welcome_message, "Welcome to Acme!");
        assert_eq!(resolved.config.text_color, defaults::TEXT_COLOR);
        assert_eq!(resolved.limits.per_hour, 10);
        assert_eq!(resolved.limits.per_day, defaults::MAX_REQUESTS_PER_DAY);
    }

    #[tokio::test]
    async fn test_unknown_code_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let err = resolver(store, Duration::ZERO)
            .resolve("doesnotexist")
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::NotFound(code) if code == "doesnotexist"));
    }

    #[tokio::test]
    async fn test_resolve_or_default_for_unknown_code() {
        let store = Arc::new(MemoryStore::new());
        let resolved = resolver(store, Duration::ZERO)
            .resolve_or_default("doesnotexist")
            .await;

        assert!(resolved.is_fallback());
        assert_eq!(resolved.embed_key(), defaults::FALLBACK_EMBED_KEY);
        assert_eq!(resolved.config, WidgetConfig::fallback("doesnotexist"));
        assert_eq!(resolved.limits, RateLimits::default());
    }

    #[tokio::test]
    async fn test_missing_agent_keeps_embed_fields() {
        let store = Arc::new(MemoryStore::new());
        let mut embed = EmbedRecord::new("orphan", Some("gone".to_string()));
        embed.display_name = Some("Orphaned Helper".to_string());
        embed.theme.font_size = Some(18);
        store.insert_embed(embed).await;

        let resolved = resolver(store, Duration::ZERO)
            .resolve("orphan")
            .await
            .unwrap();

        assert!(!resolved.is_fallback());
        assert_eq!(resolved.config.name, "Orphaned Helper");
        assert_eq!(resolved.config.font_size, 18);
        assert_eq!(resolved.config.system_prompt, defaults::SYSTEM_PROMPT);
        assert_eq!(resolved.config.primary_color, defaults::PRIMARY_COLOR);
    }

    #[tokio::test]
    async fn test_embed_overrides_beat_agent() {
        let store = store_with_support_bot().await;
        let mut embed = EmbedRecord::new("pricing", Some("agent-1".to_string()));
        embed.display_name = Some("Pricing Helper".to_string());
        embed.theme.primary_color = Some("#111111".to_string());
        store.insert_embed(embed).await;

        let config = resolver(store, Duration::ZERO)
            .resolve("pricing")
            .await
            .unwrap()
            .config;

        assert_eq!(config.name, "Pricing Helper");
        assert_eq!(config.primary_color, "#111111");
        assert_eq!(config.system_prompt, "You are concise.");
    }

    #[tokio::test]
    async fn test_invalid_colors_fall_through() {
        let store = store_with_support_bot().await;
        let mut embed = EmbedRecord::new("broken-theme", Some("agent-1".to_string()));
        embed.theme.primary_color = Some("red;}body{display:none".to_string());
        store.insert_embed(embed).await;

        let config = resolver(store, Duration::ZERO)
            .resolve("broken-theme")
            .await
            .unwrap()
            .config;

        assert_eq!(config.primary_color, "#10B981");
    }

    #[tokio::test]
    async fn test_store_error_degrades_to_defaults() {
        let store = store_with_support_bot().await;
        store.set_reads_down(true);
        let resolver = resolver(store.clone(), Duration::from_secs(60));

        assert!(matches!(
            resolver.resolve("abc123").await,
            Err(ResolveError::Store(_))
        ));
        let resolved = resolver.resolve_or_default("abc123").await;
        assert!(resolved.is_fallback());
        assert_eq!(resolved.config.name, defaults::NAME);

        // Errors are not cached: recovery is visible immediately
        store.set_reads_down(false);
        let resolved = resolver.resolve_or_default("abc123").await;
        assert_eq!(resolved.config.name, "Support Bot");
    }

    #[tokio::test]
    async fn test_cache_serves_until_invalidated() {
        let store = store_with_support_bot().await;
        let resolver = resolver(store.clone(), Duration::from_secs(60));

        assert_eq!(resolver.resolve_or_default("abc123").await.config.name, "Support Bot");

        // Even with the store down, the cached entry is served
        store.set_reads_down(true);
        assert_eq!(resolver.resolve_or_default("abc123").await.config.name, "Support Bot");

        resolver.invalidate("abc123");
        assert!(resolver.resolve_or_default("abc123").await.is_fallback());
    }
}
