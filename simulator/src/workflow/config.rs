use crate::generator::profile::GeneratorConfig;
use anyhow::Context;
use eventclass::inference::config::{DEFAULT_ENDPOINT, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use eventclass::inference::{ApiKey, InferenceConfig};
use eventclass::parsing::JsonExtraction;
use eventclass::prompt::PromptLayout;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_MAX_EVENTS: usize = 1000;

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub model: String,
    pub max_tokens: u32,
    pub endpoint: String,
    pub timeout_secs: Option<u64>,
    /// Upper bound on `num_events` for one request.
    pub max_events: usize,
    pub layout: PromptLayout,
    pub json_extraction: JsonExtraction,
    pub bind: SocketAddr,
    pub generator: GeneratorConfig,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: None,
            max_events: DEFAULT_MAX_EVENTS,
            layout: PromptLayout::default(),
            json_extraction: JsonExtraction::default(),
            bind: default_bind(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn to_inference_config(&self, api_key: ApiKey) -> InferenceConfig {
        InferenceConfig::new(api_key)
            .with_model(self.model.clone())
            .with_max_tokens(self.max_tokens)
            .with_endpoint(self.endpoint.clone())
            .with_timeout(self.timeout_secs.map(Duration::from_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_target_line_prefix_layout() {
        let cfg = WorkflowConfig::default();
        assert_eq!(cfg.layout, PromptLayout::LinePrefix);
        assert_eq!(cfg.max_tokens, 500);
        assert_eq!(cfg.bind.port(), 9000);
        assert_eq!(cfg.max_events, DEFAULT_MAX_EVENTS);
    }

    #[test]
    fn inference_config_carries_overrides() {
        let cfg = WorkflowConfig {
            model: "claude-test".into(),
            timeout_secs: Some(30),
            ..Default::default()
        };
        let inference = cfg.to_inference_config(ApiKey::new("key").unwrap());
        assert_eq!(inference.model, "claude-test");
        assert_eq!(inference.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"layout: json\njson_extraction: balanced\nmax_tokens: 300\nmax_events: 50\ngenerator:\n  seed: 42\n  position: false\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.layout, PromptLayout::Json);
        assert_eq!(cfg.json_extraction, JsonExtraction::Balanced);
        assert_eq!(cfg.max_tokens, 300);
        assert_eq!(cfg.max_events, 50);
        assert_eq!(cfg.generator.seed, Some(42));
        assert!(cfg.generator.pulse_shape);
        assert!(!cfg.generator.position);
        assert_eq!(cfg.model, DEFAULT_MODEL);
    }

    #[test]
    fn config_load_reports_missing_file() {
        let err = WorkflowConfig::load("/nonexistent/workflow.yaml").unwrap_err();
        assert!(err.to_string().contains("reading workflow config"));
    }
}
