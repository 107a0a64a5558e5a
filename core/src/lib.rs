//! Core model and inference plumbing for LLM-assisted particle event classification.
//!
//! Detector events are rendered into a prompt, sent to a text-completion
//! service, and the free-form answer is parsed back into a label, a confidence
//! and a reasoning string.

pub mod event;
pub mod inference;
pub mod parsing;
pub mod prelude;
pub mod prompt;
pub mod telemetry;

pub use prelude::{
    ClassificationResult, ClassifyError, ClassifyResult, CompletionClient, Confidence,
    ResponseParser,
};
