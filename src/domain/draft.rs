//! AI-drafted replies.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend identifier of a generated draft, used for approval feedback.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DraftId(pub String);

impl From<&str> for DraftId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DraftId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A generated reply draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftResult {
    pub content: String,
    /// Model confidence in `[0, 1]`.
    pub confidence_score: f64,
    pub rationale: String,
}

impl DraftResult {
    /// Confidence as a whole percentage for display.
    pub fn confidence_percent(&self) -> u8 {
        (self.confidence_score.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}
