use serde::{Deserialize, Serialize};
use std::fmt;

use crate::event::ClassificationLabel;

/// Classification value used for placeholder rows.
pub const ERROR_CLASSIFICATION: &str = "Error";

/// Confidence reported on placeholder rows.
pub const ERROR_CONFIDENCE: &str = "0%";

/// Confidence as reported by the model.
///
/// The line-prefix layout yields an integer percentage; the JSON layout keeps
/// the string the model produced (for example `"10%"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Confidence {
    Percent(u32),
    Reported(String),
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Percent(value) => write!(f, "{}%", value),
            Confidence::Reported(value) => f.write_str(value),
        }
    }
}

/// Parsed answer for a single event. Unset fields were absent from the response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub classification: Option<String>,
    pub confidence: Option<Confidence>,
    pub reasoning: Option<String>,
}

impl ClassificationResult {
    /// Placeholder produced when inference or parsing fails for one event.
    pub fn failed(error: &ClassifyError) -> Self {
        Self {
            classification: Some(ERROR_CLASSIFICATION.to_string()),
            confidence: Some(Confidence::Reported(ERROR_CONFIDENCE.to_string())),
            reasoning: Some(format!("Error processing event: {}", error)),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.classification.as_deref() == Some(ERROR_CLASSIFICATION)
    }

    /// Recognized label, if the model answered with one of the known categories.
    pub fn label(&self) -> Option<ClassificationLabel> {
        self.classification
            .as_deref()
            .and_then(ClassificationLabel::from_response)
    }
}

/// Failure taxonomy for a classification cycle.
#[derive(thiserror::Error, Debug)]
pub enum ClassifyError {
    #[error("missing API credential")]
    MissingCredential,
    #[error("transport failure: {0}")]
    Http(#[from] reqwest::Error),
    #[error("inference service returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("malformed inference response: {0}")]
    MalformedResponse(String),
    #[error("inference service returned no text")]
    EmptyResponse,
    #[error("response failed validation: {0}")]
    InvalidResponse(String),
}

pub type ClassifyResult<T> = Result<T, ClassifyError>;

/// A text-completion service: one prompt in, one string out.
pub trait CompletionClient: Send + Sync {
    fn complete(&self, prompt: &str) -> ClassifyResult<String>;
}

/// Strategy for turning raw completion text into a [`ClassificationResult`].
pub trait ResponseParser: Send + Sync {
    fn parse(&self, raw: &str) -> ClassifyResult<ClassificationResult>;
}
