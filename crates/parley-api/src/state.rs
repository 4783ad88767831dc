use std::sync::Arc;

use parley_embed::{ConfigResolver, RateLimits, ScriptMaterializer};
use parley_llm::ChatClient;
use parley_persist::StoreClient;
use parley_relay::{ChatRelay, RelaySettings};

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// Built once at startup; the resolver cache is shared by the script,
/// preview and chat routes.
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn StoreClient>,
    pub resolver: Arc<ConfigResolver>,
    pub materializer: ScriptMaterializer,
    pub relay: ChatRelay,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn StoreClient>, llm: Arc<dyn ChatClient>) -> Self {
        let resolver = Arc::new(ConfigResolver::new(
            Arc::clone(&store),
            config.cache_ttl(),
            RateLimits {
                per_hour: config.rate_limit.default_per_hour,
                per_day: config.rate_limit.default_per_day,
            },
        ));

        let settings = RelaySettings {
            model: config.llm.model.clone(),
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
            ai_timeout: config.llm.timeout(),
        };

        Self {
            materializer: ScriptMaterializer::new(config.public.base_url()),
            relay: ChatRelay::new(Arc::clone(&store), Arc::clone(&resolver), llm, settings),
            resolver,
            store,
            config: Arc::new(config),
        }
    }

    pub fn base_url(&self) -> &str {
        self.config.public.base_url()
    }
}
