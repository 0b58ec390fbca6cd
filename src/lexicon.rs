//! Fixed keyword tables shared by the classifiers.
//!
//! Every table is an ordered slice. When two entries score the same, the one
//! declared first wins, so reordering entries changes classification output.

use serde::{Deserialize, Serialize};

use crate::models::{Emotion, Topic};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SupportType {
    ImmediateSupport,
    EmotionalSupport,
    Reassurance,
    Celebration,
    Clarification,
    Acknowledgment,
    ProblemSolving,
    Encouragement,
    Reinforcement,
    ActiveListening,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sensitivity {
    Low,
    Medium,
    High,
    VeryHigh,
}

/// Static context attached to an emotion label
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmotionContext {
    pub intensity: Level,
    pub urgency: Level,
    pub support_type: SupportType,
}

pub struct EmotionProfile {
    pub emotion: Emotion,
    pub keywords: &'static [&'static str],
    pub context: EmotionContext,
}

pub struct TopicProfile {
    pub topic: Topic,
    pub keywords: &'static [&'static str],
    pub priority: Priority,
    pub sensitivity: Sensitivity,
}

const fn ctx(intensity: Level, urgency: Level, support_type: SupportType) -> EmotionContext {
    EmotionContext {
        intensity,
        urgency,
        support_type,
    }
}

pub const NEUTRAL_CONTEXT: EmotionContext =
    ctx(Level::Low, Level::Low, SupportType::ActiveListening);

pub const EMOTIONS: &[EmotionProfile] = &[
    EmotionProfile {
        emotion: Emotion::Distressed,
        keywords: &[
            "overwhelmed",
            "can't cope",
            "breaking down",
            "desperate",
            "hopeless",
            "panic",
            "crisis",
            "falling apart",
        ],
        context: ctx(Level::High, Level::High, SupportType::ImmediateSupport),
    },
    EmotionProfile {
        emotion: Emotion::Sad,
        keywords: &[
            "sad",
            "depressed",
            "down",
            "lonely",
            "heartbroken",
            "miserable",
            "crying",
            "grief",
        ],
        context: ctx(Level::Medium, Level::Medium, SupportType::EmotionalSupport),
    },
    EmotionProfile {
        emotion: Emotion::Anxious,
        keywords: &[
            "anxious", "worried", "nervous", "stressed", "scared", "afraid", "uneasy", "tense",
        ],
        context: ctx(Level::Medium, Level::Medium, SupportType::Reassurance),
    },
    EmotionProfile {
        emotion: Emotion::Excited,
        keywords: &[
            "excited",
            "thrilled",
            "amazing",
            "awesome",
            "can't wait",
            "fantastic",
            "great news",
            "pumped",
        ],
        context: ctx(Level::High, Level::Low, SupportType::Celebration),
    },
    EmotionProfile {
        emotion: Emotion::Confused,
        keywords: &[
            "confused",
            "unsure",
            "don't understand",
            "lost",
            "unclear",
            "puzzled",
            "not sure",
            "mixed up",
        ],
        context: ctx(Level::Low, Level::Medium, SupportType::Clarification),
    },
    EmotionProfile {
        emotion: Emotion::Grateful,
        keywords: &["thank", "grateful", "appreciate", "thankful", "blessed", "glad"],
        context: ctx(Level::Medium, Level::Low, SupportType::Acknowledgment),
    },
    EmotionProfile {
        emotion: Emotion::Frustrated,
        keywords: &[
            "frustrated",
            "annoyed",
            "angry",
            "irritated",
            "fed up",
            "mad",
            "upset",
            "stuck",
        ],
        context: ctx(Level::Medium, Level::Medium, SupportType::ProblemSolving),
    },
    EmotionProfile {
        emotion: Emotion::Hopeful,
        keywords: &[
            "hope",
            "hopeful",
            "optimistic",
            "looking forward",
            "better",
            "positive",
            "brighter",
        ],
        context: ctx(Level::Medium, Level::Low, SupportType::Encouragement),
    },
    EmotionProfile {
        emotion: Emotion::Confident,
        keywords: &["confident", "ready", "capable", "proud", "determined", "strong"],
        context: ctx(Level::Medium, Level::Low, SupportType::Reinforcement),
    },
];

pub const TOPICS: &[TopicProfile] = &[
    TopicProfile {
        topic: Topic::Relationships,
        keywords: &[
            "relationship",
            "partner",
            "boyfriend",
            "girlfriend",
            "dating",
            "marriage",
            "breakup",
            "love",
            "friend",
            "coworker",
        ],
        priority: Priority::High,
        sensitivity: Sensitivity::High,
    },
    TopicProfile {
        topic: Topic::Career,
        keywords: &[
            "work",
            "job",
            "career",
            "boss",
            "promotion",
            "interview",
            "salary",
            "office",
            "colleague",
            "resume",
        ],
        priority: Priority::High,
        sensitivity: Sensitivity::Medium,
    },
    TopicProfile {
        topic: Topic::MentalHealth,
        keywords: &[
            "anxiety",
            "depression",
            "therapy",
            "mental health",
            "stress",
            "panic",
            "burnout",
            "counseling",
        ],
        priority: Priority::Critical,
        sensitivity: Sensitivity::VeryHigh,
    },
    TopicProfile {
        topic: Topic::Education,
        keywords: &[
            "school",
            "study",
            "exam",
            "class",
            "college",
            "university",
            "homework",
            "learn",
            "course",
        ],
        priority: Priority::Medium,
        sensitivity: Sensitivity::Low,
    },
    TopicProfile {
        topic: Topic::Family,
        keywords: &[
            "family", "mom", "dad", "parent", "sister", "brother", "child", "kids",
        ],
        priority: Priority::High,
        sensitivity: Sensitivity::High,
    },
    TopicProfile {
        topic: Topic::Health,
        keywords: &[
            "health", "doctor", "sick", "exercise", "diet", "sleep", "pain", "illness",
        ],
        priority: Priority::High,
        sensitivity: Sensitivity::High,
    },
    TopicProfile {
        topic: Topic::Creativity,
        keywords: &[
            "creative", "art", "write", "writing", "music", "paint", "design", "idea", "project",
        ],
        priority: Priority::Low,
        sensitivity: Sensitivity::Low,
    },
    TopicProfile {
        topic: Topic::PersonalGrowth,
        keywords: &[
            "growth",
            "goal",
            "improve",
            "habit",
            "motivation",
            "self",
            "confidence",
            "purpose",
        ],
        priority: Priority::Medium,
        sensitivity: Sensitivity::Medium,
    },
    TopicProfile {
        topic: Topic::Social,
        keywords: &[
            "party",
            "social",
            "people",
            "community",
            "event",
            "meet",
            "group",
            "club",
        ],
        priority: Priority::Low,
        sensitivity: Sensitivity::Low,
    },
    TopicProfile {
        topic: Topic::Finances,
        keywords: &[
            "money", "budget", "debt", "savings", "invest", "loan", "rent", "expense",
        ],
        priority: Priority::High,
        sensitivity: Sensitivity::Medium,
    },
];

/// Relationship subcategory, resolved only for the relationships topic
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    Family,
    Friends,
    Workplace,
    Romantic,
}

pub const RELATIONSHIP_KINDS: &[(RelationshipKind, &[&str])] = &[
    (
        RelationshipKind::Family,
        &["mom", "dad", "parent", "sister", "brother", "family"],
    ),
    (RelationshipKind::Friends, &["friend", "buddy", "pal"]),
    (
        RelationshipKind::Workplace,
        &["coworker", "boss", "colleague", "manager"],
    ),
    (
        RelationshipKind::Romantic,
        &["partner", "boyfriend", "girlfriend", "dating", "love", "marriage", "crush"],
    ),
];

pub const GROWTH_KEYWORDS: &[&str] = &[
    "learned",
    "understand",
    "realize",
    "insight",
    "perspective",
    "progress",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

pub fn polarity(emotion: Emotion) -> Polarity {
    match emotion {
        Emotion::Excited | Emotion::Grateful | Emotion::Hopeful | Emotion::Confident => {
            Polarity::Positive
        }
        Emotion::Sad | Emotion::Anxious | Emotion::Frustrated | Emotion::Distressed => {
            Polarity::Negative
        }
        Emotion::Confused | Emotion::Neutral => Polarity::Neutral,
    }
}

pub fn emotion_context(emotion: Emotion) -> EmotionContext {
    EMOTIONS
        .iter()
        .find(|p| p.emotion == emotion)
        .map(|p| p.context)
        .unwrap_or(NEUTRAL_CONTEXT)
}

/// Number of `keywords` occurring as substrings of `text`.
///
/// `text` must already be lower-cased. Matching ignores word boundaries, so
/// "sad" also matches "sadly".
pub fn count_matches(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|kw| text.contains(**kw)).count()
}

/// Index and ratio of the entry with the highest nonzero match ratio.
///
/// Strictly greater ratios replace the current best, which keeps the first
/// declared entry on exact ties.
pub fn best_ratio<'a, I>(text: &str, tables: I) -> Option<(usize, f32)>
where
    I: IntoIterator<Item = &'a [&'static str]>,
{
    let mut best: Option<(usize, f32)> = None;
    for (index, keywords) in tables.into_iter().enumerate() {
        if keywords.is_empty() {
            continue;
        }
        let ratio = count_matches(text, keywords) as f32 / keywords.len() as f32;
        if ratio > 0.0 && best.map_or(true, |(_, r)| ratio > r) {
            best = Some((index, ratio));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_follow_label_declaration_order() {
        let emotions: Vec<Emotion> = EMOTIONS.iter().map(|p| p.emotion).collect();
        assert_eq!(emotions.first(), Some(&Emotion::Distressed));
        assert_eq!(emotions.last(), Some(&Emotion::Confident));
        assert!(!emotions.contains(&Emotion::Neutral));

        let topics: Vec<Topic> = TOPICS.iter().map(|p| p.topic).collect();
        assert_eq!(topics.first(), Some(&Topic::Relationships));
        assert!(!topics.contains(&Topic::General));
    }

    #[test]
    fn substring_matching_ignores_word_boundaries() {
        assert_eq!(count_matches("sadly it rained", &["sad"]), 1);
        assert_eq!(count_matches("a nomad", &["mad"]), 1);
        assert_eq!(count_matches("", &["sad"]), 0);
    }

    #[test]
    fn exact_ties_keep_first_entry() {
        let tables: [&[&str]; 2] = [&["alpha", "beta"], &["gamma", "alpha"]];
        assert_eq!(best_ratio("alpha", tables), Some((0, 0.5)));
    }

    #[test]
    fn higher_ratio_beats_earlier_entry() {
        let tables: [&[&str]; 2] = [&["alpha", "beta", "delta"], &["alpha"]];
        assert_eq!(best_ratio("alpha", tables), Some((1, 1.0)));
    }

    #[test]
    fn polarity_sets() {
        assert_eq!(polarity(Emotion::Confident), Polarity::Positive);
        assert_eq!(polarity(Emotion::Distressed), Polarity::Negative);
        assert_eq!(polarity(Emotion::Confused), Polarity::Neutral);
    }
}
