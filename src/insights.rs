//! Aggregate insights over a conversation history.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::lexicon::{self, Polarity, GROWTH_KEYWORDS};
use crate::models::{Depth, Emotion, Message, Topic};

/// Histories shorter than this carry too little signal to summarize.
pub const MIN_HISTORY_FOR_INSIGHTS: usize = 4;

const RECENT_WINDOW: usize = 10;
const TREND_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stability {
    Stable,
    Varied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Focus {
    Focused,
    Exploratory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthLevel {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionalJourney {
    pub dominant: Option<Emotion>,
    pub variability: usize,
    pub trend: Trend,
    pub stability: Stability,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicAnalysis {
    pub dominant: Option<Topic>,
    pub variability: usize,
    pub focus: Focus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthIndicators {
    pub mentions: usize,
    pub level: GrowthLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationInsights {
    pub emotional_journey: EmotionalJourney,
    pub topic_analysis: TopicAnalysis,
    pub conversation_depth: Depth,
    pub growth_indicators: GrowthIndicators,
    pub session_length: usize,
    pub engagement: u8,
}

/// Summarize a history, or `None` when it has fewer than four messages.
pub fn summarize(history: &[Message]) -> Option<ConversationInsights> {
    if history.len() < MIN_HISTORY_FOR_INSIGHTS {
        return None;
    }

    let recent = tail(history, RECENT_WINDOW);

    let emotional_variability = recent
        .iter()
        .filter_map(|m| m.emotional_tone)
        .collect::<HashSet<_>>()
        .len();
    let topic_variability = topic_changes(recent);

    Some(ConversationInsights {
        emotional_journey: EmotionalJourney {
            dominant: dominant_emotion(history),
            variability: emotional_variability,
            trend: emotional_trend(history),
            stability: if emotional_variability < 3 {
                Stability::Stable
            } else {
                Stability::Varied
            },
        },
        topic_analysis: TopicAnalysis {
            dominant: dominant_topic(history),
            variability: topic_variability,
            focus: if topic_variability < 3 {
                Focus::Focused
            } else {
                Focus::Exploratory
            },
        },
        conversation_depth: conversation_depth(history),
        growth_indicators: growth_indicators(history),
        session_length: history.len(),
        engagement: engagement_score(history),
    })
}

pub fn dominant_emotion(history: &[Message]) -> Option<Emotion> {
    most_frequent(history.iter().filter_map(|m| m.emotional_tone))
}

pub fn dominant_topic(history: &[Message]) -> Option<Topic> {
    most_frequent(history.iter().filter_map(|m| m.topic))
}

/// Most frequent label; on ties, the label that reached the maximum first
/// during a single left-to-right scan.
fn most_frequent<T, I>(labels: I) -> Option<T>
where
    T: Copy + Eq + Hash,
    I: IntoIterator<Item = T>,
{
    let mut counts: HashMap<T, usize> = HashMap::new();
    let mut best: Option<(T, usize)> = None;
    for label in labels {
        let count = counts.entry(label).or_insert(0);
        *count += 1;
        if best.map_or(true, |(_, max)| *count > max) {
            best = Some((label, *count));
        }
    }
    best.map(|(label, _)| label)
}

fn tail(history: &[Message], n: usize) -> &[Message] {
    &history[history.len().saturating_sub(n)..]
}

/// Number of switches between consecutive recorded topics.
fn topic_changes(messages: &[Message]) -> usize {
    let topics: Vec<Topic> = messages.iter().filter_map(|m| m.topic).collect();
    topics.windows(2).filter(|pair| pair[0] != pair[1]).count()
}

fn positive_count(messages: &[Message]) -> usize {
    messages
        .iter()
        .filter_map(|m| m.emotional_tone)
        .filter(|e| lexicon::polarity(*e) == Polarity::Positive)
        .count()
}

fn emotional_trend(history: &[Message]) -> Trend {
    let early = positive_count(&history[..TREND_WINDOW.min(history.len())]);
    let recent = positive_count(tail(history, TREND_WINDOW));
    match recent.cmp(&early) {
        std::cmp::Ordering::Greater => Trend::Improving,
        std::cmp::Ordering::Less => Trend::Declining,
        std::cmp::Ordering::Equal => Trend::Stable,
    }
}

fn average_length(history: &[Message]) -> f64 {
    if history.is_empty() {
        return 0.0;
    }
    let total: usize = history.iter().map(|m| m.content.chars().count()).sum();
    total as f64 / history.len() as f64
}

pub fn conversation_depth(history: &[Message]) -> Depth {
    let avg = average_length(history);
    if avg > 100.0 {
        Depth::Deep
    } else if avg > 50.0 {
        Depth::Moderate
    } else {
        Depth::Surface
    }
}

fn growth_indicators(history: &[Message]) -> GrowthIndicators {
    let mentions = history
        .iter()
        .filter(|m| lexicon::count_matches(&m.content.to_lowercase(), GROWTH_KEYWORDS) > 0)
        .count();
    let level = if mentions > 2 {
        GrowthLevel::High
    } else if mentions > 0 {
        GrowthLevel::Moderate
    } else {
        GrowthLevel::Low
    };
    GrowthIndicators { mentions, level }
}

/// Weighted engagement score in `0..=100`; 0 for an empty history.
pub fn engagement_score(history: &[Message]) -> u8 {
    if history.is_empty() {
        return 0;
    }
    let n = history.len() as f64;

    let length_factor = (n / 20.0).min(1.0) * 30.0;
    let avg_len_factor = (average_length(history) / 100.0).min(1.0) * 25.0;

    let distinct_emotions = history
        .iter()
        .filter_map(|m| m.emotional_tone)
        .collect::<HashSet<_>>()
        .len();
    let variety_factor = (distinct_emotions as f64 / 5.0).min(1.0) * 20.0;

    let specific_topics = history
        .iter()
        .filter(|m| matches!(m.topic, Some(t) if t != Topic::General))
        .count();
    let topic_factor = specific_topics as f64 / n * 25.0;

    let score = length_factor + avg_len_factor + variety_factor + topic_factor;
    score.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(content: &str, emotion: Option<Emotion>, topic: Option<Topic>) -> Message {
        let mut m = Message::user(content);
        m.emotional_tone = emotion;
        m.topic = topic;
        m
    }

    #[test]
    fn short_histories_have_no_insights() {
        let history: Vec<Message> = (0..3).map(|_| Message::user("hello")).collect();
        for len in 0..=3 {
            assert!(summarize(&history[..len]).is_none());
        }
    }

    #[test]
    fn alternating_topics_are_exploratory() {
        let history: Vec<Message> = (0..10)
            .map(|i| {
                let topic = if i % 2 == 0 {
                    Topic::Career
                } else {
                    Topic::Creativity
                };
                msg("working on it", None, Some(topic))
            })
            .collect();

        let insights = summarize(&history).unwrap();
        assert_eq!(insights.topic_analysis.focus, Focus::Exploratory);
        assert_eq!(insights.topic_analysis.variability, 9);
        assert_eq!(insights.topic_analysis.dominant, Some(Topic::Career));
    }

    #[test]
    fn dominant_ties_go_to_first_to_reach_max() {
        let history = vec![
            msg("a", Some(Emotion::Sad), None),
            msg("b", Some(Emotion::Hopeful), None),
            msg("c", Some(Emotion::Hopeful), None),
            msg("d", Some(Emotion::Sad), None),
        ];
        assert_eq!(dominant_emotion(&history), Some(Emotion::Hopeful));
        assert_eq!(dominant_topic(&history), None);
    }

    #[test]
    fn trend_compares_first_and_last_three() {
        let mut history = vec![
            msg("a", Some(Emotion::Sad), None),
            msg("b", Some(Emotion::Anxious), None),
            msg("c", None, None),
        ];
        history.push(msg("d", Some(Emotion::Hopeful), None));
        history.push(msg("e", Some(Emotion::Grateful), None));
        history.push(msg("f", None, None));
        assert_eq!(emotional_trend(&history), Trend::Improving);

        history.reverse();
        assert_eq!(emotional_trend(&history), Trend::Declining);

        let flat: Vec<Message> = (0..4).map(|_| msg("x", None, None)).collect();
        assert_eq!(emotional_trend(&flat), Trend::Stable);
    }

    #[test]
    fn variability_and_stability() {
        let history = vec![
            msg("a", Some(Emotion::Sad), None),
            msg("b", Some(Emotion::Anxious), None),
            msg("c", Some(Emotion::Hopeful), None),
            msg("d", Some(Emotion::Sad), None),
        ];
        let insights = summarize(&history).unwrap();
        assert_eq!(insights.emotional_journey.variability, 3);
        assert_eq!(insights.emotional_journey.stability, Stability::Varied);
        assert_eq!(insights.session_length, 4);
    }

    #[test]
    fn depth_buckets_by_average_length() {
        let short = vec![Message::user("hi"); 4];
        assert_eq!(conversation_depth(&short), Depth::Surface);

        let medium = vec![Message::user("x".repeat(60)); 4];
        assert_eq!(conversation_depth(&medium), Depth::Moderate);

        let long = vec![Message::user("x".repeat(101)); 4];
        assert_eq!(conversation_depth(&long), Depth::Deep);
    }

    #[test]
    fn growth_mentions_count_messages_not_keywords() {
        let history = vec![
            Message::user("I learned and now understand"),
            Message::user("real progress"),
            Message::user("nothing here"),
            Message::user("New perspective!"),
        ];
        let insights = summarize(&history).unwrap();
        assert_eq!(insights.growth_indicators.mentions, 3);
        assert_eq!(insights.growth_indicators.level, GrowthLevel::High);
    }

    #[test]
    fn engagement_examples() {
        assert_eq!(engagement_score(&[]), 0);

        // 20 messages of 100 chars, 5 emotions, all topical: every factor maxed
        let emotions = [
            Emotion::Sad,
            Emotion::Hopeful,
            Emotion::Anxious,
            Emotion::Excited,
            Emotion::Grateful,
        ];
        let full: Vec<Message> = (0..20)
            .map(|i| msg(&"x".repeat(100), Some(emotions[i % 5]), Some(Topic::Career)))
            .collect();
        assert_eq!(engagement_score(&full), 100);

        // one 10-char message, no labels: 1.5 + 2.5 = 4
        let single = vec![Message::user("x".repeat(10))];
        assert_eq!(engagement_score(&single), 4);

        // general topics do not count towards topical depth
        let general = vec![msg("x", Some(Emotion::Neutral), Some(Topic::General)); 4];
        // 6 + 0.25 + 4 + 0 = 10.25
        assert_eq!(engagement_score(&general), 10);
    }

    #[test]
    fn unlabelled_replies_cap_topical_depth() {
        let emotions = [
            Emotion::Sad,
            Emotion::Anxious,
            Emotion::Excited,
            Emotion::Grateful,
            Emotion::Confused,
        ];
        let history: Vec<Message> = (0..10)
            .flat_map(|i| {
                [
                    msg(&"x".repeat(100), Some(emotions[i % 5]), Some(Topic::Career)),
                    Message::assistant("x".repeat(100)),
                ]
            })
            .collect();
        // 30 + 25 + 20 + 12.5
        assert_eq!(engagement_score(&history), 88);
    }

    #[test]
    fn summarize_is_pure() {
        let history = vec![
            msg("I learned a lot", Some(Emotion::Hopeful), Some(Topic::Education)),
            Message::assistant("Great to hear."),
            msg("exams soon", Some(Emotion::Anxious), Some(Topic::Education)),
            Message::assistant("You can do it."),
        ];
        assert_eq!(summarize(&history), summarize(&history));
    }
}
