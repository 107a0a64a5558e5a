use crate::inference::config::InferenceConfig;
use crate::prelude::{ClassifyError, ClassifyResult, CompletionClient};
use log::debug;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: MessageContent,
}

/// The service may return content as one string or as a list of typed blocks.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessageContent {
    fn into_text(self) -> String {
        match self {
            MessageContent::Text(text) => text,
            MessageContent::Blocks(blocks) => blocks
                .into_iter()
                .filter(|block| block.kind == "text")
                .filter_map(|block| block.text)
                .collect::<Vec<_>>()
                .join(""),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Blocking client for the Anthropic Messages API. One request per call, no retries.
pub struct AnthropicClient {
    http: Client,
    config: InferenceConfig,
}

impl AnthropicClient {
    pub fn new(config: InferenceConfig) -> ClassifyResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self { http, config })
    }
}

impl CompletionClient for AnthropicClient {
    fn complete(&self, prompt: &str) -> ClassifyResult<String> {
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: vec![RequestMessage {
                role: "user",
                content: prompt,
            }],
        };

        debug!(
            "requesting completion from {} (model {}, max_tokens {})",
            self.config.endpoint, self.config.model, self.config.max_tokens
        );
        let response = self
            .http
            .post(&self.config.endpoint)
            .header("x-api-key", self.config.api_key.expose())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()?;

        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(ClassifyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: MessagesResponse = serde_json::from_str(&body)
            .map_err(|err| ClassifyError::MalformedResponse(err.to_string()))?;
        let text = parsed.content.into_text();
        if text.trim().is_empty() {
            return Err(ClassifyError::EmptyResponse);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::config::ApiKey;
    use std::net::SocketAddr;
    use std::sync::mpsc;
    use std::thread;
    use warp::http::StatusCode;
    use warp::Filter;

    /// Serves `reply_body` with `status` on an ephemeral port for requests
    /// carrying the expected key, and returns the stub's messages URL.
    fn spawn_stub(status: u16, reply_body: &'static str) -> String {
        let (tx, rx) = mpsc::channel::<SocketAddr>();
        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let route = warp::path!("v1" / "messages")
                    .and(warp::post())
                    .and(warp::header::exact("x-api-key", "test-key"))
                    .and(warp::header::exact("anthropic-version", ANTHROPIC_VERSION))
                    .and(warp::body::json())
                    .map(move |body: serde_json::Value| {
                        assert_eq!(body["messages"][0]["role"], "user");
                        assert_eq!(body["max_tokens"], 500);
                        warp::reply::with_status(
                            reply_body,
                            StatusCode::from_u16(status).unwrap(),
                        )
                    });
                let (addr, server) =
                    warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
                tx.send(addr).unwrap();
                server.await;
            });
        });
        let addr = rx.recv().unwrap();
        format!("http://{}/v1/messages", addr)
    }

    fn client_for(endpoint: String) -> AnthropicClient {
        let config =
            InferenceConfig::new(ApiKey::new("test-key").unwrap()).with_endpoint(endpoint);
        AnthropicClient::new(config).unwrap()
    }

    #[test]
    fn content_blocks_are_joined() {
        let content: MessageContent = serde_json::from_str(
            r#"[{"type": "text", "text": "Classification: WIMP\n"}, {"type": "tool_use"}, {"type": "text", "text": "Confidence: 80%"}]"#,
        )
        .unwrap();
        assert_eq!(content.into_text(), "Classification: WIMP\nConfidence: 80%");
    }

    #[test]
    fn plain_string_content_is_used_verbatim() {
        let content: MessageContent = serde_json::from_str(r#""Classification: Background""#).unwrap();
        assert_eq!(content.into_text(), "Classification: Background");
    }

    #[test]
    fn completes_against_stub() {
        let endpoint = spawn_stub(
            200,
            r#"{"id": "msg_1", "content": [{"type": "text", "text": "Classification: WIMP"}]}"#,
        );
        let text = client_for(endpoint).complete("classify").unwrap();
        assert_eq!(text, "Classification: WIMP");
    }

    #[test]
    fn error_status_surfaces_api_message() {
        let endpoint = spawn_stub(
            401,
            r#"{"type": "error", "error": {"type": "authentication_error", "message": "invalid x-api-key"}}"#,
        );
        let err = client_for(endpoint).complete("classify").unwrap_err();
        match err {
            ClassifyError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid x-api-key");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn empty_content_is_an_error() {
        let endpoint = spawn_stub(200, r#"{"content": []}"#);
        let err = client_for(endpoint).complete("classify").unwrap_err();
        assert!(matches!(err, ClassifyError::EmptyResponse));
    }

    #[test]
    fn malformed_body_is_an_error() {
        let endpoint = spawn_stub(200, "not json");
        let err = client_for(endpoint).complete("classify").unwrap_err();
        assert!(matches!(err, ClassifyError::MalformedResponse(_)));
    }

    #[test]
    fn unreachable_service_is_a_transport_error() {
        let err = client_for("http://127.0.0.1:9/v1/messages".into())
            .complete("classify")
            .unwrap_err();
        assert!(matches!(err, ClassifyError::Http(_)));
    }
}
