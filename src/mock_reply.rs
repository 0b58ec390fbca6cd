//! Canned replies used when no completion service is reachable.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ai_service::{ConversationType, ExpertiseLevel};
use crate::lexicon::{self, Level};
use crate::models::Emotion;

pub const MOCK_MODEL: &str = "aura-assistant";

const HIGH_URGENCY_OPENER: &str =
    "I can hear how much you're carrying right now, and I'm here with you. ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyCategory {
    Greetings,
    Life,
    Career,
    Relationships,
    Creative,
    Decisions,
    Learning,
}

struct CategoryPatterns {
    category: ReplyCategory,
    patterns: &'static [&'static str],
    responses: &'static [&'static str],
}

const CATEGORIES: &[CategoryPatterns] = &[
    CategoryPatterns {
        category: ReplyCategory::Greetings,
        patterns: &[
            "hello",
            "hey",
            "good morning",
            "good afternoon",
            "good evening",
            "greetings",
            "howdy",
        ],
        responses: &[
            "Hello! I'm AURA. What's on your mind today?",
            "Hi there! It's good to see you. What would you like to talk about?",
            "Hey! I'm here and listening. Where would you like to start?",
        ],
    },
    CategoryPatterns {
        category: ReplyCategory::Life,
        patterns: &[
            "life",
            "meaning",
            "purpose",
            "happy",
            "happiness",
            "future",
            "feel",
        ],
        responses: &[
            "That's a big question. What does a good day look like for you right now?",
            "It sounds like you're reflecting on what matters most. What feels most important to you lately?",
            "Thank you for sharing that. Which part of this feels most pressing to you?",
        ],
    },
    CategoryPatterns {
        category: ReplyCategory::Career,
        patterns: &[
            "job",
            "career",
            "work",
            "boss",
            "promotion",
            "interview",
            "business",
        ],
        responses: &[
            "Work can take up so much of our energy. What part of it is on your mind?",
            "Let's think this through together. What outcome would you like in your career?",
            "That sounds like an important step. What options are you weighing?",
        ],
    },
    CategoryPatterns {
        category: ReplyCategory::Relationships,
        patterns: &[
            "relationship",
            "friend",
            "partner",
            "family",
            "love",
            "dating",
            "marriage",
        ],
        responses: &[
            "Relationships shape so much of how we feel. What's been happening?",
            "It sounds like this person matters to you. How are you feeling about it?",
            "That can be complicated. What would you like to be different?",
        ],
    },
    CategoryPatterns {
        category: ReplyCategory::Creative,
        patterns: &["creative", "write", "story", "art", "music", "idea", "design"],
        responses: &[
            "I love creative projects! Tell me more about what you're imagining.",
            "That's an interesting idea. What inspired it?",
            "Let's explore it together. What's the first piece you want to shape?",
        ],
    },
    CategoryPatterns {
        category: ReplyCategory::Decisions,
        patterns: &[
            "decide",
            "decision",
            "choice",
            "choose",
            "should i",
            "option",
            "dilemma",
        ],
        responses: &[
            "Decisions like this are hard. What matters most to you in the outcome?",
            "Let's lay out the options. What are the trade-offs you see?",
            "What would you advise a friend in the same situation?",
        ],
    },
    CategoryPatterns {
        category: ReplyCategory::Learning,
        patterns: &["learn", "study", "understand", "explain", "teach", "skill", "course"],
        responses: &[
            "Learning something new is exciting. Where would you like to begin?",
            "Happy to help you work through it. What do you already know about it?",
            "Let's break it down step by step. Which part feels least clear?",
        ],
    },
];

const GENERIC_RESPONSES: &[&str] = &[
    "Tell me more about that. I'd like to understand what you're thinking.",
    "That's interesting. What makes it important to you right now?",
    "I'm listening. How would you like to explore this?",
    "Could you share a bit more so I can help in the most useful way?",
];

/// Context the caller knows about the current turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyContext {
    pub conversation_type: ConversationType,
    pub expertise_level: ExpertiseLevel,
    pub emotional_tone: Emotion,
}

impl Default for ReplyContext {
    fn default() -> Self {
        Self {
            conversation_type: ConversationType::Default,
            expertise_level: ExpertiseLevel::Intermediate,
            emotional_tone: Emotion::Neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockReply {
    pub content: String,
    pub is_mock: bool,
    pub model: String,
    pub category: Option<ReplyCategory>,
    pub usage: Usage,
}

/// Category whose patterns match most often; earlier categories win ties.
pub fn match_category(message: &str) -> Option<ReplyCategory> {
    let text = message.to_lowercase();
    let mut best: Option<(ReplyCategory, usize)> = None;
    for entry in CATEGORIES {
        let matches = lexicon::count_matches(&text, entry.patterns);
        if matches > best.map_or(0, |(_, count)| count) {
            best = Some((entry.category, matches));
        }
    }
    best.map(|(category, _)| category)
}

/// Candidate responses for `category`, or the generic pool.
pub fn response_pool(category: Option<ReplyCategory>) -> &'static [&'static str] {
    category
        .and_then(|c| CATEGORIES.iter().find(|entry| entry.category == c))
        .map(|entry| entry.responses)
        .unwrap_or(GENERIC_RESPONSES)
}

pub fn mock_reply<R: Rng + ?Sized>(message: &str, context: &ReplyContext, rng: &mut R) -> MockReply {
    let category = match_category(message);
    let pool = response_pool(category);
    let choice = pool.choose(rng).copied().unwrap_or(GENERIC_RESPONSES[0]);

    let content = if lexicon::emotion_context(context.emotional_tone).urgency == Level::High {
        format!("{HIGH_URGENCY_OPENER}{choice}")
    } else {
        choice.to_string()
    };

    let prompt_tokens = estimate_tokens(message);
    let completion_tokens = estimate_tokens(&content);

    MockReply {
        content,
        is_mock: true,
        model: MOCK_MODEL.to_string(),
        category,
        usage: Usage {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        },
    }
}

/// Roughly one token per four characters.
fn estimate_tokens(text: &str) -> u32 {
    text.chars().count().div_ceil(4) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn empty_message_uses_generic_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        let reply = mock_reply("", &ReplyContext::default(), &mut rng);
        assert!(reply.is_mock);
        assert_eq!(reply.model, MOCK_MODEL);
        assert_eq!(reply.category, None);
        assert!(!reply.content.is_empty());
        assert!(GENERIC_RESPONSES.contains(&reply.content.as_str()));
    }

    #[test]
    fn greeting_is_one_of_the_greeting_responses() {
        let mut rng = StdRng::seed_from_u64(1);
        let reply = mock_reply("Hello there!", &ReplyContext::default(), &mut rng);
        assert_eq!(reply.category, Some(ReplyCategory::Greetings));
        assert!(response_pool(Some(ReplyCategory::Greetings)).contains(&reply.content.as_str()));
    }

    #[test]
    fn most_matches_wins_and_ties_keep_earlier() {
        // career (job, work) ties learning (learn, skill) and is declared first
        assert_eq!(
            match_category("Should I learn a new job skill for work?"),
            Some(ReplyCategory::Career)
        );
        // one match each for life and career: life is declared first
        assert_eq!(match_category("my future job"), Some(ReplyCategory::Life));
        assert_eq!(match_category("qwerty"), None);
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let ctx = ReplyContext::default();
        let a = mock_reply("tell me a story", &ctx, &mut StdRng::seed_from_u64(42));
        let b = mock_reply("tell me a story", &ctx, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn high_urgency_tone_adds_opener() {
        let ctx = ReplyContext {
            emotional_tone: Emotion::Distressed,
            ..ReplyContext::default()
        };
        let reply = mock_reply("hello", &ctx, &mut StdRng::seed_from_u64(3));
        assert!(reply.content.starts_with(HIGH_URGENCY_OPENER));
    }

    #[test]
    fn usage_is_estimated() {
        let reply = mock_reply("abcdefgh", &ReplyContext::default(), &mut StdRng::seed_from_u64(0));
        assert_eq!(reply.usage.prompt_tokens, 2);
        assert_eq!(
            reply.usage.total_tokens,
            reply.usage.prompt_tokens + reply.usage.completion_tokens
        );
    }
}
