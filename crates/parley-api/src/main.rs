use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use parley_api::{
    build_router,
    config::{Config, StoreBackend},
    state::AppState,
};
use parley_llm::{ChatClient, ClientFactory, OpenAIConfig, ProviderConfig};
use parley_persist::{MemoryStore, MongoStore, StoreClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // Initialize logging
    init_logging(&config);

    tracing::info!("Starting Parley API server");
    tracing::info!(
        "Config loaded: {}:{} (public base URL {})",
        config.server.host,
        config.server.port,
        config.public.base_url()
    );

    // Initialize LLM client
    tracing::info!(model = %config.llm.model, "Initializing LLM client");
    let llm_client: Arc<dyn ChatClient> = ClientFactory::create_chat_client(ProviderConfig::OpenAI(
        OpenAIConfig::new(config.openai_api_key.clone())
            .with_base_url(config.llm.base_url.clone())
            .with_timeout_secs(config.llm.timeout_secs),
    ))?;

    // Initialize store
    let store: Arc<dyn StoreClient> = match config.store.backend {
        StoreBackend::Mongodb => {
            tracing::info!("Connecting to MongoDB");
            let mongo = MongoStore::connect(&config.mongodb_uri, &config.store.database).await?;
            tracing::info!(database = %config.store.database, "MongoDB connected");
            Arc::new(mongo)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);

    // Create application state
    let state = Arc::new(AppState::new(config, store, llm_client));

    // Build router
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("API docs: http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
