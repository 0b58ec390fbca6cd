//! One chat turn: classify, append, reply (live or mock), recompute, save.

use anyhow::{anyhow, Result};
use chrono::Utc;
use rand::rngs::StdRng;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::ai_service::{
    self, AIMessage, CompletionRequest, CompletionService, ConversationType,
};
use crate::app_config::AppConfig;
use crate::emotion::{classify_emotion, EmotionResult};
use crate::mock_reply::{self, MockReply, ReplyContext};
use crate::models::{Conversation, Message};
use crate::store::{ConversationStore, KeyValueStore};
use crate::topic::{classify_topic, ClassificationResult};

/// Longest user message accepted, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4000;

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub history_window: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            model: "llama-3.3-70b-versatile".to_string(),
            max_tokens: 500,
            temperature: 0.7,
            history_window: 10,
        }
    }
}

impl From<&AppConfig> for EngineSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            history_window: config.history_window,
        }
    }
}

/// Result of a single user turn
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub conversation: Conversation,
    pub reply: Message,
    pub emotion: EmotionResult,
    pub topic: ClassificationResult,
    pub conversation_type: ConversationType,
    pub is_mock: bool,
    pub model: String,
    pub usage_tokens: Option<u32>,
}

struct Reply {
    text: String,
    model: String,
    usage_tokens: Option<u32>,
    is_mock: bool,
}

impl From<MockReply> for Reply {
    fn from(mock: MockReply) -> Self {
        Self {
            text: mock.content,
            model: mock.model,
            usage_tokens: Some(mock.usage.total_tokens),
            is_mock: mock.is_mock,
        }
    }
}

pub struct ChatEngine<S> {
    store: ConversationStore<S>,
    completion: Option<Arc<dyn CompletionService>>,
    rng: Mutex<StdRng>,
    settings: EngineSettings,
}

impl<S: KeyValueStore> ChatEngine<S> {
    /// `completion` of `None` means every reply comes from the mock generator.
    pub fn new(
        store: ConversationStore<S>,
        completion: Option<Arc<dyn CompletionService>>,
        settings: EngineSettings,
        rng: StdRng,
    ) -> Self {
        Self {
            store,
            completion,
            rng: Mutex::new(rng),
            settings,
        }
    }

    pub fn store(&self) -> &ConversationStore<S> {
        &self.store
    }

    pub fn has_live_model(&self) -> bool {
        self.completion.is_some()
    }

    /// Mock reply for `message` using the engine's random source.
    pub fn mock_reply(&self, message: &str, context: &ReplyContext) -> Result<MockReply> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| anyhow!("mock reply rng lock poisoned"))?;
        Ok(mock_reply::mock_reply(message, context, &mut *rng))
    }

    /// Handle one user message.
    ///
    /// A new conversation is started when `conversation_id` is `None`.
    /// Completion failures never surface here: they are logged and replaced
    /// by a mock reply.
    pub async fn send_message(
        &self,
        conversation_id: Option<&str>,
        content: &str,
    ) -> Result<ChatTurn> {
        let length = content.chars().count();
        if length > MAX_MESSAGE_CHARS {
            anyhow::bail!(
                "Message is {} characters; the limit is {}",
                length,
                MAX_MESSAGE_CHARS
            );
        }

        let mut conversation = match conversation_id {
            Some(id) => self
                .store
                .get(id)?
                .ok_or_else(|| anyhow!("Conversation {} not found", id))?,
            None => Conversation::new(),
        };

        let emotion = classify_emotion(content, &conversation.history);
        let topic = classify_topic(content, &conversation.history);

        let window_start = conversation
            .history
            .len()
            .saturating_sub(self.settings.history_window);
        let prior_messages: Vec<AIMessage> = conversation.history[window_start..]
            .iter()
            .map(AIMessage::from)
            .collect();

        conversation.history.push(Message::user(content).with_labels(
            emotion.emotion,
            topic.primary_topic,
            topic.confidence,
        ));

        let context = ReplyContext {
            conversation_type: ai_service::detect_conversation_type(content),
            expertise_level: ai_service::detect_expertise_level(content),
            emotional_tone: emotion.emotion,
        };

        let reply = self.generate_reply(content, prior_messages, &context).await?;

        let assistant = Message::assistant(reply.text);
        conversation.history.push(assistant.clone());
        conversation.last_active = Utc::now();
        self.store.save(&mut conversation)?;

        info!(
            conversation = %conversation.id,
            emotion = emotion.emotion.as_str(),
            topic = topic.primary_topic.as_str(),
            mock = reply.is_mock,
            "chat turn saved"
        );

        Ok(ChatTurn {
            conversation,
            reply: assistant,
            emotion,
            topic,
            conversation_type: context.conversation_type,
            is_mock: reply.is_mock,
            model: reply.model,
            usage_tokens: reply.usage_tokens,
        })
    }

    async fn generate_reply(
        &self,
        content: &str,
        prior_messages: Vec<AIMessage>,
        context: &ReplyContext,
    ) -> Result<Reply> {
        let Some(completion) = &self.completion else {
            return Ok(self.mock_reply(content, context)?.into());
        };

        let request = CompletionRequest {
            system_prompt: ai_service::system_prompt(
                context.conversation_type,
                context.expertise_level,
            ),
            prior_messages,
            user_message: content.to_string(),
            model: self.settings.model.clone(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        match completion.complete(request).await {
            Ok(done) => Ok(Reply {
                text: done.text,
                model: done.model,
                usage_tokens: done.usage_tokens,
                is_mock: false,
            }),
            Err(e) => {
                warn!("Completion failed, using mock reply: {:#}", e);
                Ok(self.mock_reply(content, context)?.into())
            }
        }
    }
}
