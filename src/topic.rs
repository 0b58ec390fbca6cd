use serde::Serialize;
use tracing::debug;

use crate::lexicon::{self, Priority, RelationshipKind, Sensitivity, RELATIONSHIP_KINDS, TOPICS};
use crate::models::{Message, Topic};

const CONTINUITY_WINDOW: usize = 5;
const CONTINUITY_MIN_REPEATS: usize = 2;
const CONTINUITY_BOOST: f32 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub primary_topic: Topic,
    pub subcategory: Option<RelationshipKind>,
    pub confidence: f32,
    pub priority: Priority,
    pub sensitivity: Sensitivity,
    pub continuity: usize,
}

impl ClassificationResult {
    fn general() -> Self {
        Self {
            primary_topic: Topic::General,
            subcategory: None,
            confidence: 0.0,
            priority: Priority::Low,
            sensitivity: Sensitivity::Low,
            continuity: 0,
        }
    }
}

/// Classify the topic of `message`, rewarding topics that recur among the
/// last five topics recorded in `recent_history`.
pub fn classify_topic(message: &str, recent_history: &[Message]) -> ClassificationResult {
    let text = message.to_lowercase();

    let Some((index, ratio)) = lexicon::best_ratio(&text, TOPICS.iter().map(|p| p.keywords))
    else {
        return ClassificationResult::general();
    };

    let profile = &TOPICS[index];
    let continuity = recent_history
        .iter()
        .rev()
        .filter_map(|m| m.topic)
        .take(CONTINUITY_WINDOW)
        .filter(|t| *t == profile.topic)
        .count();

    let mut confidence = ratio;
    if continuity >= CONTINUITY_MIN_REPEATS {
        confidence = (confidence + CONTINUITY_BOOST).min(1.0);
    }

    let subcategory = match profile.topic {
        Topic::Relationships => relationship_kind(&text),
        _ => None,
    };

    debug!(
        topic = profile.topic.as_str(),
        ratio, confidence, continuity, "classified topic"
    );

    ClassificationResult {
        primary_topic: profile.topic,
        subcategory,
        confidence,
        priority: profile.priority,
        sensitivity: profile.sensitivity,
        continuity,
    }
}

fn relationship_kind(text: &str) -> Option<RelationshipKind> {
    RELATIONSHIP_KINDS
        .iter()
        .find(|(_, keywords)| lexicon::count_matches(text, keywords) > 0)
        .map(|(kind, _)| *kind)
}
