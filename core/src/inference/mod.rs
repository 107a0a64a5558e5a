pub mod anthropic;
pub mod config;

pub use anthropic::AnthropicClient;
pub use config::{ApiKey, InferenceConfig};
