//! Keyword-based emotion classifier for companion replies.
//!
//! Scans the reply text against an ordered keyword table and returns the
//! label of the first rule with a matching keyword. Matching is a
//! case-insensitive substring test, so precedence between overlapping rules
//! is decided purely by table order.

use dollsay_types::chat::Emotion;
use dollsay_types::config::{EmotionRule, default_emotion_rules};

/// Maps reply text to one of the five emotion labels.
#[derive(Debug, Clone)]
pub struct EmotionClassifier {
    /// (label, lowercased keywords), in priority order.
    table: Vec<(Emotion, Vec<String>)>,
}

impl EmotionClassifier {
    /// Build a classifier from an ordered rule table.
    ///
    /// Keywords are lowercased once here. Empty keywords are dropped since
    /// they would match every reply.
    pub fn new(rules: Vec<EmotionRule>) -> Self {
        let table = rules
            .into_iter()
            .map(|rule| {
                let keywords = rule
                    .keywords
                    .into_iter()
                    .filter(|k| !k.is_empty())
                    .map(|k| k.to_lowercase())
                    .collect();
                (rule.emotion, keywords)
            })
            .collect();

        Self { table }
    }

    /// Classify a reply. Total: every input yields exactly one label.
    pub fn classify(&self, reply: &str) -> Emotion {
        if reply.is_empty() {
            return Emotion::Neutral;
        }

        let lower = reply.to_lowercase();
        self.table
            .iter()
            .fold(None, |found, (emotion, keywords)| {
                found.or_else(|| {
                    keywords
                        .iter()
                        .any(|k| lower.contains(k.as_str()))
                        .then_some(*emotion)
                })
            })
            .unwrap_or(Emotion::Neutral)
    }
}

impl Default for EmotionClassifier {
    fn default() -> Self {
        Self::new(default_emotion_rules())
    }
}
