use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// Emotional tone labels, in the canonical order used to break ties.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Distressed,
    Sad,
    Anxious,
    Excited,
    Confused,
    Grateful,
    Frustrated,
    Hopeful,
    Confident,
    Neutral,
}

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Distressed => "distressed",
            Emotion::Sad => "sad",
            Emotion::Anxious => "anxious",
            Emotion::Excited => "excited",
            Emotion::Confused => "confused",
            Emotion::Grateful => "grateful",
            Emotion::Frustrated => "frustrated",
            Emotion::Hopeful => "hopeful",
            Emotion::Confident => "confident",
            Emotion::Neutral => "neutral",
        }
    }
}

/// Topic labels, in the canonical order used to break ties.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Relationships,
    Career,
    MentalHealth,
    Education,
    Family,
    Health,
    Creativity,
    PersonalGrowth,
    Social,
    Finances,
    General,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Relationships => "relationships",
            Topic::Career => "career",
            Topic::MentalHealth => "mental_health",
            Topic::Education => "education",
            Topic::Family => "family",
            Topic::Health => "health",
            Topic::Creativity => "creativity",
            Topic::PersonalGrowth => "personal_growth",
            Topic::Social => "social",
            Topic::Finances => "finances",
            Topic::General => "general",
        }
    }

    /// Label with underscores replaced, for sentences shown to people.
    pub fn display_name(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

/// A single turn in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotional_tone: Option<Emotion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<Topic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            emotional_tone: None,
            topic: None,
            confidence: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Attach classifier output to a message before it is appended.
    pub fn with_labels(mut self, emotion: Emotion, topic: Topic, confidence: f32) -> Self {
        self.emotional_tone = Some(emotion);
        self.topic = Some(topic);
        self.confidence = Some(confidence);
        self
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}

/// Average message length bucket
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Depth {
    #[default]
    Surface,
    Moderate,
    Deep,
}

/// Values derived from a conversation's history at save time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMetadata {
    pub primary_topic: Option<Topic>,
    pub primary_emotion: Option<Emotion>,
    pub depth: Depth,
    pub engagement: u8,
    pub tags: Vec<String>,
}

/// Represents a conversation thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub history: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    #[serde(default)]
    pub metadata: ConversationMetadata,
}

impl Conversation {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: String::new(),
            history: Vec::new(),
            created_at: now,
            last_active: now,
            metadata: ConversationMetadata::default(),
        }
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_serialize_as_snake_case() {
        assert_eq!(
            serde_json::to_string(&Topic::MentalHealth).unwrap(),
            "\"mental_health\""
        );
        assert_eq!(serde_json::to_string(&Emotion::Sad).unwrap(), "\"sad\"");
        assert_eq!(Topic::PersonalGrowth.display_name(), "personal growth");
    }

    #[test]
    fn conversation_uses_camel_case_fields() {
        let mut conversation = Conversation::new();
        conversation
            .history
            .push(Message::user("hi").with_labels(Emotion::Neutral, Topic::General, 0.0));

        let json = serde_json::to_value(&conversation).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("lastActive").is_some());
        assert_eq!(json["history"][0]["emotionalTone"], "neutral");
        assert_eq!(json["metadata"]["primaryTopic"], serde_json::Value::Null);

        let back: Conversation = serde_json::from_value(json).unwrap();
        assert_eq!(back, conversation);
    }
}
