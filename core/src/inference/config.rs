use crate::prelude::{ClassifyError, ClassifyResult};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";

/// Credential for the inference service. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> ClassifyResult<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ClassifyError::MissingCredential);
        }
        Ok(Self(key.trim().to_string()))
    }

    /// Accepts an optional value, e.g. from the environment.
    pub fn from_option(key: Option<String>) -> ClassifyResult<Self> {
        key.map(Self::new)
            .unwrap_or(Err(ClassifyError::MissingCredential))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Everything the inference client needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub api_key: ApiKey,
    pub model: String,
    pub max_tokens: u32,
    pub endpoint: String,
    /// Request timeout; `None` keeps the HTTP client's default.
    pub timeout: Option<Duration>,
}

impl InferenceConfig {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}
