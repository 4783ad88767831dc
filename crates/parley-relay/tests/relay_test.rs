use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use parley_embed::{ConfigResolver, RateLimits};
use parley_llm::{ChatClient, ChatRequest, ChatResponse, Role};
use parley_persist::{MemoryStore, StoreClient};
use parley_relay::{
    ChatRelay, ChatTurn, RelaySettings, AI_ERROR, AI_FAILURE_TEXT, RATE_LIMIT_ERROR,
};
use parley_types::defaults::FALLBACK_EMBED_KEY;
use parley_types::{AgentRecord, EmbedRecord, MessageRecord, MessageRole, NewConversation};

#[derive(Clone, Copy)]
enum Behavior {
    Reply,
    Fail,
    Empty,
    Hang,
}

/// Counting stand-in for the OpenAI client
struct MockChat {
    behavior: Behavior,
    calls: AtomicUsize,
    last_request: Mutex<Option<ChatRequest>>,
}

impl MockChat {
    fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatClient for MockChat {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);

        let content = match self.behavior {
            Behavior::Reply => Some("Happy to help!".to_string()),
            Behavior::Empty => Some("   ".to_string()),
            Behavior::Fail => bail!("OpenAI API error (500 Internal Server Error): upstream exploded"),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Some("too late".to_string())
            }
        };
        Ok(ChatResponse {
            content,
            usage: None,
            finish_reason: Some("stop".to_string()),
        })
    }
}

async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let mut agent = AgentRecord::new("user-1", "Support Bot").with_system_prompt("You are concise.");
    agent.id = "agent-1".to_string();
    store.insert_agent(agent).await;

    let mut embed = EmbedRecord::new("abc123", Some("agent-1".to_string()));
    embed.id = "embed-1".to_string();
    store.insert_embed(embed).await;
    store
}

fn relay(store: Arc<MemoryStore>, llm: Arc<MockChat>) -> ChatRelay {
    relay_with_timeout(store, llm, Duration::from_secs(5))
}

fn relay_with_timeout(store: Arc<MemoryStore>, llm: Arc<MockChat>, ai_timeout: Duration) -> ChatRelay {
    let limits = RateLimits {
        per_hour: 100,
        per_day: 1000,
    };
    build_relay(store, llm, ai_timeout, limits)
}

fn build_relay(
    store: Arc<MemoryStore>,
    llm: Arc<MockChat>,
    ai_timeout: Duration,
    default_limits: RateLimits,
) -> ChatRelay {
    let resolver = Arc::new(ConfigResolver::new(store.clone(), Duration::ZERO, default_limits));
    let settings = RelaySettings {
        ai_timeout,
        ..RelaySettings::default()
    };
    ChatRelay::new(store, resolver, llm, settings)
}

fn turn(embed_code: &str, message: &str, session_id: &str) -> ChatTurn {
    ChatTurn::new(embed_code, message, session_id, None, None).unwrap()
}

#[tokio::test]
async fn test_happy_path_persists_one_conversation() {
    let store = seeded_store().await;
    let llm = MockChat::new(Behavior::Reply);
    let relay = relay(store.clone(), llm.clone());

    let reply = relay.handle(turn("abc123", "Hello", "s1")).await;
    assert_eq!(reply.message, "Happy to help!");
    assert_eq!(reply.session_id, "s1");
    assert_eq!(reply.error, None);

    let request = llm.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.messages.len(), 2);
    assert_eq!(request.messages[0].role, Role::System);
    assert_eq!(request.messages[0].content, "You are concise.");
    assert_eq!(request.messages[1].role, Role::User);
    assert_eq!(request.messages[1].content, "Hello");

    let conversations = store.conversations().await;
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].embed_key, "embed-1");
    assert_eq!(conversations[0].total_messages, 2);
    assert_eq!(store.messages().await.len(), 2);

    // Same session, same conversation
    relay.handle(turn("abc123", "Thanks", "s1")).await;
    let conversations = store.conversations().await;
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].total_messages, 4);
}

#[tokio::test]
async fn test_missing_embed_uses_default_prompt() {
    let store = Arc::new(MemoryStore::new());
    let llm = MockChat::new(Behavior::Reply);
    let relay = relay(store.clone(), llm.clone());

    let reply = relay.handle(turn("doesnotexist", "Hello", "s1")).await;
    assert_eq!(reply.error, None);

    let request = llm.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(
        request.messages[0].content,
        "You are a helpful AI assistant. Answer questions clearly and concisely."
    );
    assert_eq!(store.conversations().await[0].embed_key, FALLBACK_EMBED_KEY);
}

#[tokio::test]
async fn test_unknown_codes_share_one_quota() {
    let store = Arc::new(MemoryStore::new());
    let llm = MockChat::new(Behavior::Reply);
    let limits = RateLimits {
        per_hour: 1,
        per_day: 1,
    };
    let relay = build_relay(store.clone(), llm.clone(), Duration::from_secs(5), limits);

    let first = relay.handle(turn("unknown-1", "Hello", "s1")).await;
    assert_eq!(first.error, None);

    let second = relay.handle(turn("unknown-2", "Hello", "s2")).await;
    assert_eq!(second.error.as_deref(), Some(RATE_LIMIT_ERROR));
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn test_over_quota_skips_ai_call() {
    let store = seeded_store().await;
    let conversation = store
        .create_conversation(NewConversation {
            embed_key: "embed-1".to_string(),
            session_id: "older".to_string(),
            visitor_ip: None,
            user_agent: None,
        })
        .await
        .unwrap();
    for _ in 0..100 {
        store
            .save_message(MessageRecord::new(&conversation, MessageRole::User, "hi", Utc::now()))
            .await
            .unwrap();
    }

    let llm = MockChat::new(Behavior::Reply);
    let relay = relay(store.clone(), llm.clone());
    let reply = relay.handle(turn("abc123", "One more", "s1")).await;

    assert_eq!(reply.error.as_deref(), Some(RATE_LIMIT_ERROR));
    assert_eq!(llm.calls(), 0);
    assert_eq!(store.messages().await.len(), 100);
    assert_eq!(store.conversations().await.len(), 1);
}

#[tokio::test]
async fn test_provider_error_returns_fallback() {
    let store = seeded_store().await;
    let llm = MockChat::new(Behavior::Fail);
    let reply = relay(store.clone(), llm.clone())
        .handle(turn("abc123", "Hello", "s1"))
        .await;

    assert_eq!(reply.message, AI_FAILURE_TEXT);
    assert_eq!(reply.error.as_deref(), Some(AI_ERROR));
    assert_eq!(reply.session_id, "s1");
    assert!(!reply.message.contains("upstream exploded"));
    assert!(store.messages().await.is_empty());
}

#[tokio::test]
async fn test_empty_completion_is_a_failure() {
    let store = seeded_store().await;
    let reply = relay(store, MockChat::new(Behavior::Empty))
        .handle(turn("abc123", "Hello", "s1"))
        .await;
    assert_eq!(reply.error.as_deref(), Some(AI_ERROR));
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let store = seeded_store().await;
    let llm = MockChat::new(Behavior::Hang);
    let reply = relay_with_timeout(store, llm.clone(), Duration::from_millis(50))
        .handle(turn("abc123", "Hello", "s1"))
        .await;

    assert_eq!(reply.message, AI_FAILURE_TEXT);
    assert_eq!(reply.error.as_deref(), Some(AI_ERROR));
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn test_store_outage_still_replies() {
    let store = seeded_store().await;
    store.set_reads_down(true);
    store.set_writes_down(true);

    let llm = MockChat::new(Behavior::Reply);
    let reply = relay(store.clone(), llm.clone())
        .handle(turn("abc123", "Hello", "s1"))
        .await;

    assert_eq!(reply.message, "Happy to help!");
    assert_eq!(reply.error, None);
    assert_eq!(llm.calls(), 1);

    store.set_reads_down(false);
    assert!(store.conversations().await.is_empty());
}
