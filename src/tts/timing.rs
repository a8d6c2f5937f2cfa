//! Per-word timing metadata sent alongside synthesized audio

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where the word timings came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingSource {
    /// Returned by the alignment provider
    Provider,
    /// Fixed per-word heuristic
    Estimate,
}

/// One estimated word window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordTiming {
    pub word: String,
    pub start_ms: u32,
    pub end_ms: u32,
}

/// Payload of the `X-Word-Timings` response header.
///
/// Provider words are passed through untouched, so they are kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTimings {
    pub source: TimingSource,
    pub words: Vec<Value>,
}

impl WordTimings {
    /// Spread the words of `text` evenly, `word_duration_ms` each
    pub fn estimate(text: &str, word_duration_ms: u32) -> Self {
        let words = text
            .split_whitespace()
            .zip(0u32..)
            .map(|(word, i)| WordTiming {
                word: word.to_string(),
                start_ms: i.saturating_mul(word_duration_ms),
                end_ms: (i + 1).saturating_mul(word_duration_ms),
            })
            .filter_map(|timing| serde_json::to_value(timing).ok())
            .collect();

        Self {
            source: TimingSource::Estimate,
            words,
        }
    }

    pub fn from_provider(words: Vec<Value>) -> Self {
        Self {
            source: TimingSource::Provider,
            words,
        }
    }

    /// Total duration of an estimate, 0 for provider timings
    pub fn estimated_duration_ms(&self) -> u32 {
        match self.source {
            TimingSource::Estimate => self
                .words
                .last()
                .and_then(|w| w.get("end_ms"))
                .and_then(Value::as_u64)
                .map(|ms| ms as u32)
                .unwrap_or(0),
            TimingSource::Provider => 0,
        }
    }

    /// Base64 of the JSON encoding, safe to use as a header value
    pub fn to_header_value(&self) -> serde_json::Result<String> {
        Ok(STANDARD.encode(serde_json::to_vec(self)?))
    }

    pub fn from_header_value(value: &str) -> Option<Self> {
        let bytes = STANDARD.decode(value).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_estimate_spreads_words() {
        let timings = WordTimings::estimate("  hello there\tworld ", 300);
        assert_eq!(timings.source, TimingSource::Estimate);
        assert_eq!(timings.words.len(), 3);
        assert_eq!(
            timings.words[1],
            json!({ "word": "there", "start_ms": 300, "end_ms": 600 })
        );
        assert_eq!(timings.estimated_duration_ms(), 900);
    }

    #[test]
    fn test_estimate_empty_text() {
        let timings = WordTimings::estimate("   ", 300);
        assert!(timings.words.is_empty());
        assert_eq!(timings.estimated_duration_ms(), 0);
    }

    #[test]
    fn test_header_value() {
        let words = vec![json!({ "text": "hi", "start": 0.0, "end": 0.21 })];
        let timings = WordTimings::from_provider(words);

        let header = timings.to_header_value().unwrap();
        assert!(header.is_ascii());

        let decoded: Value = serde_json::from_slice(&STANDARD.decode(&header).unwrap()).unwrap();
        assert_eq!(decoded["source"], "provider");
        assert_eq!(decoded["words"][0]["text"], "hi");
        assert_eq!(WordTimings::from_header_value(&header), Some(timings));
    }
}
