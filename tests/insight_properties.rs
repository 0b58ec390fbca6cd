// tests/insight_properties.rs

use aura_insight::insights::engagement_score;
use aura_insight::{
    classify_emotion, classify_topic, derive_tags, summarize, Emotion, Message, Topic,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const EMOTIONS: [Emotion; 6] = [
    Emotion::Sad,
    Emotion::Hopeful,
    Emotion::Anxious,
    Emotion::Excited,
    Emotion::Grateful,
    Emotion::Neutral,
];

const TOPICS: [Topic; 5] = [
    Topic::Career,
    Topic::Creativity,
    Topic::Finances,
    Topic::Health,
    Topic::General,
];

fn random_history(rng: &mut StdRng, len: usize) -> Vec<Message> {
    (0..len)
        .map(|i| {
            let content = "x".repeat(rng.gen_range(0..400));
            if i % 2 == 1 {
                return Message::assistant(content);
            }
            let mut m = Message::user(content);
            if rng.gen_bool(0.8) {
                m.emotional_tone = EMOTIONS.choose(rng).copied();
            }
            if rng.gen_bool(0.8) {
                m.topic = TOPICS.choose(rng).copied();
            }
            m
        })
        .collect()
}

#[test]
fn engagement_is_always_within_bounds() {
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..200 {
        let len = rng.gen_range(1..60);
        let history = random_history(&mut rng, len);
        let score = engagement_score(&history);
        assert!(score <= 100, "score {score} out of range");
        if let Some(insights) = summarize(&history) {
            assert_eq!(insights.engagement, score);
        }
    }
}

#[test]
fn summarize_needs_four_messages_and_is_pure() {
    let mut rng = StdRng::seed_from_u64(7);
    for len in 0..12 {
        let history = random_history(&mut rng, len);
        let first = summarize(&history);
        assert_eq!(first.is_none(), len < 4);
        assert_eq!(first, summarize(&history));
    }
}

#[test]
fn tags_are_capped_and_verbatim() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..100 {
        let len = rng.gen_range(0..30);
        let history = random_history(&mut rng, len);
        let tags = derive_tags(&history);
        assert!(tags.len() <= 5);
        for tag in &tags {
            let seen = history.iter().any(|m| {
                m.topic.map(|t| t.as_str()) == Some(tag.as_str())
                    || m.emotional_tone.map(|e| e.as_str()) == Some(tag.as_str())
            });
            assert!(seen, "tag {tag} not present in history");
        }
    }
}

#[test]
fn keywordless_messages_get_defaults() {
    for message in ["", "qwerty", "zzz 123", "the weather is nice"] {
        let emotion = classify_emotion(message, &[]);
        let topic = classify_topic(message, &[]);
        assert_eq!(emotion.emotion, Emotion::Neutral);
        assert_eq!(emotion.confidence, 0.0);
        assert_eq!(topic.primary_topic, Topic::General);
        assert_eq!(topic.confidence, 0.0);
    }
}
