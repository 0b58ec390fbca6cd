pub mod models;
pub mod lexicon;
pub mod emotion;
pub mod topic;
pub mod insights;
pub mod summary;
pub mod mock_reply;
pub mod ai_service;
pub mod store;
pub mod chat;
pub mod app_config;
pub mod api;

pub use models::{Conversation, ConversationMetadata, Emotion, Message, MessageRole, Topic};
pub use emotion::{classify_emotion, EmotionResult};
pub use topic::{classify_topic, ClassificationResult};
pub use insights::{summarize, ConversationInsights};
pub use summary::{derive_metadata, derive_summary, derive_tags, derive_title};
pub use mock_reply::{mock_reply, MockReply, ReplyContext};
pub use ai_service::{AIMessage, AIService, CompletionService};
pub use store::{ConversationStore, JsonFileStore, KeyValueStore, MemoryStore};
pub use chat::{ChatEngine, ChatTurn, EngineSettings};

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::info;

use app_config::AppConfig;

/// Build a chat engine backed by the JSON file store from configuration.
///
/// Without an API key every reply comes from the mock generator.
pub fn build_engine(config: &AppConfig) -> Result<ChatEngine<JsonFileStore>> {
    let store = ConversationStore::new(JsonFileStore::open(&config.data_file));

    let completion: Option<Arc<dyn CompletionService>> = match &config.api_key {
        Some(key) => Some(Arc::new(AIService::new(
            config.api_url.clone(),
            key.clone(),
            config.request_timeout,
        )?)),
        None => {
            info!("No API key configured; replies will be mocked");
            None
        }
    };

    let rng = match config.mock_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    Ok(ChatEngine::new(store, completion, EngineSettings::from(config), rng))
}
