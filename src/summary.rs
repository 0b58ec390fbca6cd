//! Human-readable title, tags and summary for persisted conversations.

use crate::insights::{self, MIN_HISTORY_FOR_INSIGHTS};
use crate::models::{ConversationMetadata, Emotion, Message, Topic};

pub const MAX_TAGS: usize = 5;
pub const DEFAULT_TITLE: &str = "Open Conversation";
pub const BRIEF_SUMMARY: &str = "Brief conversation";

/// First user messages shorter than this get a quoted preview in the title.
const PREVIEW_THRESHOLD: usize = 50;
const PREVIEW_CHARS: usize = 30;

struct TitleTemplates {
    topic: Topic,
    by_emotion: &'static [(Emotion, &'static str)],
    fallback: &'static str,
}

const TITLES: &[TitleTemplates] = &[
    TitleTemplates {
        topic: Topic::Career,
        by_emotion: &[
            (Emotion::Excited, "Career Wins & Celebrations"),
            (Emotion::Anxious, "Navigating Work Stress"),
            (Emotion::Frustrated, "Working Through Career Frustrations"),
            (Emotion::Hopeful, "Career Hopes & Plans"),
        ],
        fallback: "Career Conversation",
    },
    TitleTemplates {
        topic: Topic::Relationships,
        by_emotion: &[
            (Emotion::Sad, "Healing Relationship Hurts"),
            (Emotion::Anxious, "Relationship Worries"),
            (Emotion::Grateful, "Appreciating Connections"),
        ],
        fallback: "Relationship Talk",
    },
    TitleTemplates {
        topic: Topic::MentalHealth,
        by_emotion: &[
            (Emotion::Distressed, "Support in a Difficult Moment"),
            (Emotion::Anxious, "Working Through Anxiety"),
            (Emotion::Hopeful, "Steps Toward Wellbeing"),
        ],
        fallback: "Mental Wellbeing Check-in",
    },
    TitleTemplates {
        topic: Topic::Education,
        by_emotion: &[
            (Emotion::Confused, "Untangling a Learning Challenge"),
            (Emotion::Excited, "Learning Breakthroughs"),
        ],
        fallback: "Learning Session",
    },
    TitleTemplates {
        topic: Topic::Creativity,
        by_emotion: &[
            (Emotion::Excited, "Creative Spark"),
            (Emotion::Frustrated, "Breaking Creative Blocks"),
        ],
        fallback: "Creative Exploration",
    },
    TitleTemplates {
        topic: Topic::PersonalGrowth,
        by_emotion: &[
            (Emotion::Hopeful, "Growth & New Beginnings"),
            (Emotion::Confident, "Building Momentum"),
        ],
        fallback: "Personal Growth Journey",
    },
    TitleTemplates {
        topic: Topic::Family,
        by_emotion: &[],
        fallback: "Family Matters",
    },
    TitleTemplates {
        topic: Topic::Health,
        by_emotion: &[(Emotion::Anxious, "Health Concerns")],
        fallback: "Health & Wellness",
    },
    TitleTemplates {
        topic: Topic::Social,
        by_emotion: &[],
        fallback: "Social Life",
    },
    TitleTemplates {
        topic: Topic::Finances,
        by_emotion: &[(Emotion::Anxious, "Money Worries")],
        fallback: "Financial Planning",
    },
];

fn title_template(topic: Option<Topic>, emotion: Option<Emotion>) -> &'static str {
    let Some(templates) = topic.and_then(|t| TITLES.iter().find(|entry| entry.topic == t)) else {
        return DEFAULT_TITLE;
    };
    emotion
        .and_then(|e| {
            templates
                .by_emotion
                .iter()
                .find(|(candidate, _)| *candidate == e)
        })
        .map(|(_, title)| *title)
        .unwrap_or(templates.fallback)
}

pub fn derive_title(history: &[Message]) -> String {
    let template = title_template(
        insights::dominant_topic(history),
        insights::dominant_emotion(history),
    );

    let first_user = history
        .iter()
        .find(|m| m.is_user())
        .map(|m| m.content.trim())
        .unwrap_or_default();
    let length = first_user.chars().count();

    if length == 0 || length >= PREVIEW_THRESHOLD {
        return template.to_string();
    }

    let mut preview: String = first_user.chars().take(PREVIEW_CHARS).collect();
    if length > PREVIEW_CHARS {
        preview.push_str("...");
    }
    format!("{template}: \"{preview}\"")
}

/// Distinct topic and tone labels in encounter order, at most five.
pub fn derive_tags(history: &[Message]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let labels = history.iter().flat_map(|m| {
        [
            m.topic.map(|t| t.as_str()),
            m.emotional_tone.map(|e| e.as_str()),
        ]
    });
    for label in labels.flatten() {
        if tags.len() == MAX_TAGS {
            break;
        }
        if !tags.iter().any(|t| t == label) {
            tags.push(label.to_string());
        }
    }
    tags
}

pub fn derive_summary(history: &[Message]) -> String {
    if history.len() < MIN_HISTORY_FOR_INSIGHTS {
        return BRIEF_SUMMARY.to_string();
    }

    let topics = first_distinct(history.iter().filter_map(|m| m.topic), 2);
    let emotions = first_distinct(history.iter().filter_map(|m| m.emotional_tone), 2);
    let user_messages = history.iter().filter(|m| m.is_user()).count();

    let topic_text = if topics.is_empty() {
        "various topics".to_string()
    } else {
        topics
            .iter()
            .map(|t| t.display_name())
            .collect::<Vec<_>>()
            .join(" and ")
    };
    let emotion_text = if emotions.is_empty() {
        "neutral".to_string()
    } else {
        emotions
            .iter()
            .map(|e| e.as_str())
            .collect::<Vec<_>>()
            .join(" and ")
    };

    format!("Discussed {topic_text} with {emotion_text} tones over {user_messages} messages.")
}

/// Recompute every derived metadata field from `history`.
pub fn derive_metadata(history: &[Message]) -> ConversationMetadata {
    ConversationMetadata {
        primary_topic: insights::dominant_topic(history),
        primary_emotion: insights::dominant_emotion(history),
        depth: insights::conversation_depth(history),
        engagement: insights::engagement_score(history),
        tags: derive_tags(history),
    }
}

fn first_distinct<T: PartialEq>(items: impl Iterator<Item = T>, limit: usize) -> Vec<T> {
    let mut out = Vec::with_capacity(limit);
    for item in items {
        if out.len() == limit {
            break;
        }
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
