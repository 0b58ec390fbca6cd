use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::models::{Message, MessageRole};

pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AIMessage {
    pub role: String,
    pub content: String,
}

impl From<&Message> for AIMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role.as_str().to_string(),
            content: message.content.clone(),
        }
    }
}

/// Kind of conversation, used only to pick a system prompt.
///
/// Detected from its own small keyword lists, independent of the topic table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationType {
    Creative,
    Analytical,
    Supportive,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpertiseLevel {
    Beginner,
    Intermediate,
    Expert,
}

const CONVERSATION_TYPES: &[(ConversationType, &[&str])] = &[
    (
        ConversationType::Creative,
        &["write", "story", "poem", "creative", "imagine", "design", "art"],
    ),
    (
        ConversationType::Analytical,
        &[
            "analyze",
            "compare",
            "data",
            "explain",
            "calculate",
            "logic",
            "pros and cons",
        ],
    ),
    (
        ConversationType::Supportive,
        &[
            "feel",
            "sad",
            "stressed",
            "help me",
            "worried",
            "lonely",
            "struggling",
        ],
    ),
];

const EXPERTISE_LEVELS: &[(ExpertiseLevel, &[&str])] = &[
    (
        ExpertiseLevel::Beginner,
        &["beginner", "new to", "basics", "eli5", "simple terms"],
    ),
    (
        ExpertiseLevel::Expert,
        &["advanced", "in depth", "technical", "expert"],
    ),
];

pub fn detect_conversation_type(message: &str) -> ConversationType {
    let text = message.to_lowercase();
    CONVERSATION_TYPES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| text.contains(kw)))
        .map(|(kind, _)| *kind)
        .unwrap_or(ConversationType::Default)
}

pub fn detect_expertise_level(message: &str) -> ExpertiseLevel {
    let text = message.to_lowercase();
    EXPERTISE_LEVELS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| text.contains(kw)))
        .map(|(level, _)| *level)
        .unwrap_or(ExpertiseLevel::Intermediate)
}

pub fn system_prompt(kind: ConversationType, expertise: ExpertiseLevel) -> String {
    let base = match kind {
        ConversationType::Creative => {
            "You are AURA, an imaginative creative partner. Build on the user's ideas, \
             offer vivid suggestions and ask what direction excites them."
        }
        ConversationType::Analytical => {
            "You are AURA, a clear and rigorous analyst. Break problems into parts, \
             weigh evidence and explain your reasoning step by step."
        }
        ConversationType::Supportive => {
            "You are AURA, a warm and supportive companion. Listen carefully, \
             validate feelings and offer gentle, practical encouragement."
        }
        ConversationType::Default => {
            "You are AURA, a thoughtful and friendly AI assistant. Be helpful, \
             concise and curious about what the user needs."
        }
    };
    let level = match expertise {
        ExpertiseLevel::Beginner => " Use simple language and avoid jargon.",
        ExpertiseLevel::Intermediate => "",
        ExpertiseLevel::Expert => " The user is experienced; go into technical depth.",
    };
    format!("{base}{level}")
}

/// Everything one completion call needs
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub prior_messages: Vec<AIMessage>,
    pub user_message: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    /// System prompt first, then the prior window, then the new user turn.
    pub fn to_messages(&self) -> Vec<AIMessage> {
        let mut messages = Vec::with_capacity(self.prior_messages.len() + 2);
        messages.push(AIMessage {
            role: "system".to_string(),
            content: self.system_prompt.clone(),
        });
        messages.extend(self.prior_messages.iter().cloned());
        messages.push(AIMessage {
            role: MessageRole::User.as_str().to_string(),
            content: self.user_message.clone(),
        });
        messages
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub model: String,
    pub usage_tokens: Option<u32>,
}

/// A language-model completion backend
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion>;
}

#[derive(Debug, Serialize)]
struct GroqRequest {
    model: String,
    messages: Vec<AIMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GroqResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<GroqUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AIMessage,
}

#[derive(Debug, Deserialize)]
struct GroqUsage {
    total_tokens: u32,
}

/// Parse an OpenAI-compatible chat completion body.
pub fn parse_completion(body: &str, requested_model: &str) -> Result<Completion> {
    let response: GroqResponse =
        serde_json::from_str(body).context("Failed to parse completion response JSON")?;

    let text = response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("No AI response choices"))?;

    Ok(Completion {
        text,
        model: response.model.unwrap_or_else(|| requested_model.to_string()),
        usage_tokens: response.usage.map(|u| u.total_tokens),
    })
}

/// -----------------------------
/// AI Service (Groq / OpenAI compatible)
/// -----------------------------
pub struct AIService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl AIService {
    pub fn new(api_url: String, api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("aura-insight/0.1")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url,
            api_key: api_key.trim().to_string(),
        })
    }
}

#[async_trait]
impl CompletionService for AIService {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion> {
        let body = GroqRequest {
            model: request.model.clone(),
            messages: request.to_messages(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!(
            model = %body.model,
            messages = body.messages.len(),
            "sending completion request"
        );

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Completion request failed")?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            error!("Completion API error {}: {}", status, text);
            anyhow::bail!("Completion API failed: {}", status);
        }

        parse_completion(&text, &request.model)
    }
}
