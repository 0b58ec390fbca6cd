use serde::Serialize;
use tracing::debug;

use crate::lexicon::{self, EmotionContext, EMOTIONS, NEUTRAL_CONTEXT};
use crate::models::{Emotion, Message};

/// Recorded emotions inspected for the persistence boost
const PERSISTENCE_WINDOW: usize = 3;
const PERSISTENCE_MIN_REPEATS: usize = 2;
const PERSISTENCE_BOOST: f32 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionResult {
    pub emotion: Emotion,
    pub confidence: f32,
    pub context: EmotionContext,
    pub previous_emotions: Vec<Emotion>,
}

/// Classify the emotional tone of `message`.
///
/// The previous emotions are the last three tones recorded in
/// `recent_history`, oldest first. When at least two of them agree with the
/// keyword match, confidence is raised by 0.3 (capped at 1.0).
pub fn classify_emotion(message: &str, recent_history: &[Message]) -> EmotionResult {
    let previous_emotions = recent_emotions(recent_history, PERSISTENCE_WINDOW);
    let text = message.to_lowercase();

    let Some((index, ratio)) = lexicon::best_ratio(&text, EMOTIONS.iter().map(|p| p.keywords))
    else {
        return EmotionResult {
            emotion: Emotion::Neutral,
            confidence: 0.0,
            context: NEUTRAL_CONTEXT,
            previous_emotions,
        };
    };

    let profile = &EMOTIONS[index];
    let repeats = previous_emotions
        .iter()
        .filter(|e| **e == profile.emotion)
        .count();

    let mut confidence = ratio;
    if repeats >= PERSISTENCE_MIN_REPEATS {
        confidence = (confidence + PERSISTENCE_BOOST).min(1.0);
    }

    debug!(
        emotion = profile.emotion.as_str(),
        ratio, confidence, repeats, "classified emotion"
    );

    EmotionResult {
        emotion: profile.emotion,
        confidence,
        context: profile.context,
        previous_emotions,
    }
}

/// Last `n` recorded tones in `history`, oldest first.
fn recent_emotions(history: &[Message], n: usize) -> Vec<Emotion> {
    let mut emotions: Vec<Emotion> = history
        .iter()
        .rev()
        .filter_map(|m| m.emotional_tone)
        .take(n)
        .collect();
    emotions.reverse();
    emotions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::{Level, SupportType};

    fn tagged(content: &str, emotion: Emotion) -> Message {
        let mut m = Message::user(content);
        m.emotional_tone = Some(emotion);
        m
    }

    #[test]
    fn empty_message_is_neutral() {
        let result = classify_emotion("", &[]);
        assert_eq!(result.emotion, Emotion::Neutral);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.context.support_type, SupportType::ActiveListening);
    }

    #[test]
    fn no_keywords_is_neutral_even_with_history() {
        let history = vec![
            tagged("a", Emotion::Sad),
            tagged("b", Emotion::Sad),
            tagged("c", Emotion::Sad),
        ];
        let result = classify_emotion("I got a promotion at work today!", &history);
        assert_eq!(result.emotion, Emotion::Neutral);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.previous_emotions.len(), 3);
    }

    #[test]
    fn picks_highest_ratio() {
        // two of eight anxious keywords beat one of six grateful keywords
        let result = classify_emotion("So worried and nervous, thank you", &[]);
        assert_eq!(result.emotion, Emotion::Anxious);
        assert!((result.confidence - 0.25).abs() < f32::EPSILON);
        assert_eq!(result.context.urgency, Level::Medium);
    }

    #[test]
    fn matching_is_case_insensitive_and_substring_based() {
        let result = classify_emotion("SADLY it ended", &[]);
        assert_eq!(result.emotion, Emotion::Sad);
    }

    #[test]
    fn repeated_emotion_boosts_confidence() {
        let history = vec![
            tagged("I'm anxious", Emotion::Anxious),
            Message::assistant("That sounds hard."),
            tagged("still anxious", Emotion::Anxious),
            Message::assistant("I hear you."),
        ];
        let result = classify_emotion("I am anxious again", &history);
        assert_eq!(result.emotion, Emotion::Anxious);
        assert!((result.confidence - (0.125 + 0.3)).abs() < 1e-6);
        assert_eq!(
            result.previous_emotions,
            vec![Emotion::Anxious, Emotion::Anxious]
        );
    }

    #[test]
    fn boost_is_capped_at_one() {
        let history = vec![
            tagged("x", Emotion::Confident),
            tagged("y", Emotion::Confident),
        ];
        let msg = "confident ready capable proud determined strong";
        let result = classify_emotion(msg, &history);
        assert_eq!(result.emotion, Emotion::Confident);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn only_last_three_recorded_emotions_count() {
        let history = vec![
            tagged("a", Emotion::Sad),
            tagged("b", Emotion::Sad),
            tagged("c", Emotion::Excited),
            tagged("d", Emotion::Excited),
            tagged("e", Emotion::Excited),
        ];
        let result = classify_emotion("feeling sad", &history);
        assert_eq!(result.previous_emotions, vec![Emotion::Excited; 3]);
        assert!((result.confidence - 0.125).abs() < 1e-6);
    }
}
