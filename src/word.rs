use serde::{Deserialize, Serialize};

/// One recognized token with absolute timing.
///
/// This is the canonical shape exchanged between every pipeline stage:
/// transcribers produce lists of it, post-processors transform lists of it.
/// `start` and `end` are seconds, absolute to the original audio file.
///
/// Consumers expect `start <= end` and non-decreasing `start` across a list
/// (post-processors treat adjacency as meaningful), but the pipeline core does
/// not enforce either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub word: String,
    pub start: f64,
    pub end: f64,
    /// Recognition confidence in [0, 1], when the engine provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Word {
    pub fn new(word: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            word: word.into(),
            start,
            end,
            confidence: None,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_json_shape() {
        let word = Word::new("hello", 0.5, 0.9);
        let json = serde_json::to_value(&word).unwrap();

        assert_eq!(json["word"], "hello");
        assert_eq!(json["start"], 0.5);
        assert_eq!(json["end"], 0.9);
        // Absent confidence is omitted entirely, not serialized as null
        assert!(json.get("confidence").is_none());
    }

    #[test]
    fn test_word_roundtrip_with_confidence() {
        let mut word = Word::new("hi", 1.0, 1.2);
        word.confidence = Some(0.87);

        let json = serde_json::to_string(&word).unwrap();
        let back: Word = serde_json::from_str(&json).unwrap();
        assert_eq!(back, word);
    }

    #[test]
    fn test_word_tolerates_unknown_fields() {
        let json = r#"{"word":"hi","start":0.0,"end":0.2,"speaker":"A"}"#;
        let word: Word = serde_json::from_str(json).unwrap();
        assert_eq!(word.word, "hi");
        assert_eq!(word.confidence, None);
    }

    #[test]
    fn test_duration() {
        let word = Word::new("x", 1.0, 1.25);
        assert!((word.duration() - 0.25).abs() < 1e-9);
    }
}
