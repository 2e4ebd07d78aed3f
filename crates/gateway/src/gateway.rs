//! The model gateway: one prompt in, one display string out.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::GatewayConfig;
use crate::messages::ChatMessage;
use crate::transport::{ReqwestTransport, Transport, TransportResponse};

/// Returned without any network activity when no API key is configured.
pub const NOT_CONFIGURED: &str =
    "OpenRouter API key not configured. Set OPENROUTER_API_KEY in environment.";

/// Raw bodies embedded in diagnostic strings are cut to this many chars.
const MAX_DIAGNOSTIC_CHARS: usize = 2000;

/// Anything that can answer a chat request with text.
///
/// Implementations must never fail: every problem is reported inside the
/// returned string. The task dispatcher depends on this contract.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn call(&self, model: &str, messages: &[ChatMessage]) -> String;
}

/// Gateway to an OpenAI-compatible `chat/completions` endpoint.
///
/// Single request per call: no retries, no backoff, no streaming.
pub struct ModelGateway {
    config: GatewayConfig,
    transport: Arc<dyn Transport>,
}

impl ModelGateway {
    /// Gateway using the production [`ReqwestTransport`].
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(config: GatewayConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Send `messages` to `model` and return the answer text.
    pub async fn call(&self, model: &str, messages: &[ChatMessage]) -> String {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return NOT_CONFIGURED.to_string();
        };

        let body = serde_json::json!({
            "model": model,
            "messages": messages,
        });

        tracing::debug!(model, messages = messages.len(), "Sending model request");

        match self
            .transport
            .post_json(&self.config.endpoint, api_key, &body, self.config.timeout)
            .await
        {
            Ok(response) => {
                let answer = interpret_response(&response);
                if !response.is_success() {
                    tracing::warn!(
                        model,
                        status = response.status,
                        "Model API returned an error status"
                    );
                }
                answer
            }
            Err(e) => {
                tracing::warn!(model, error = %e, "Model request failed");
                format!("API request failed: {e}")
            }
        }
    }
}

#[async_trait]
impl ChatModel for ModelGateway {
    async fn call(&self, model: &str, messages: &[ChatMessage]) -> String {
        ModelGateway::call(self, model, messages).await
    }
}

/// Turn a raw HTTP response into display text.
///
/// Shape is checked before any field access: a success answer wins, then
/// an `error` field, then the raw payload is embedded for diagnosis.
fn interpret_response(response: &TransportResponse) -> String {
    let value: Value = match serde_json::from_str(&response.body) {
        Ok(v) => v,
        Err(_) => {
            return format!(
                "API request failed: invalid JSON response (HTTP {}): {}",
                response.status,
                truncate(&response.body)
            );
        }
    };

    if let Some(answer) = value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
    {
        return answer.to_string();
    }

    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| match error {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });
        return format!("Model API error (HTTP {}): {message}", response.status);
    }

    format!(
        "Unexpected model response (HTTP {}): {}",
        response.status,
        truncate(&value.to_string())
    )
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_DIAGNOSTIC_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_DIAGNOSTIC_CHARS).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::transport::TransportError;

    /// Transport that counts calls and replays a scripted response.
    struct StubTransport {
        calls: AtomicUsize,
        response: Option<TransportResponse>,
        last_request: Mutex<Option<(String, String, Value)>>,
    }

    impl StubTransport {
        fn replying(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                response: Some(TransportResponse {
                    status,
                    body: body.to_string(),
                }),
                last_request: Mutex::new(None),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                response: None,
                last_request: Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn post_json(
            &self,
            url: &str,
            bearer: &str,
            body: &Value,
            _timeout: Duration,
        ) -> Result<TransportResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() =
                Some((url.to_string(), bearer.to_string(), body.clone()));
            self.response
                .clone()
                .ok_or_else(|| TransportError::Body("connection reset by peer".into()))
        }
    }

    fn configured() -> GatewayConfig {
        GatewayConfig::default().with_api_key("sk-test")
    }

    fn prompt() -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("You are an agricultural assistant."),
            ChatMessage::user("When should I sow wheat?"),
        ]
    }

    #[tokio::test]
    async fn unconfigured_gateway_makes_no_network_call() {
        let transport = StubTransport::replying(200, "{}");
        let gateway = ModelGateway::with_transport(GatewayConfig::default(), transport.clone());

        let answer = gateway.call("any-model", &prompt()).await;

        assert_eq!(answer, NOT_CONFIGURED);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn success_returns_content_unmodified() {
        let body =
            r#"{"choices":[{"message":{"role":"assistant","content":"  Sow in November.\n"}}]}"#;
        let transport = StubTransport::replying(200, body);
        let gateway = ModelGateway::with_transport(configured(), transport.clone());

        let answer = gateway.call("deepseek/deepseek-r1-0528:free", &prompt()).await;

        assert_eq!(answer, "  Sow in November.\n");
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn empty_success_content_is_not_replaced() {
        let transport = StubTransport::replying(200, r#"{"choices":[{"message":{"content":""}}]}"#);
        let gateway = ModelGateway::with_transport(configured(), transport);

        let answer = gateway.call("m", &prompt()).await;

        assert_eq!(answer, "");
    }

    #[tokio::test]
    async fn request_carries_model_messages_and_bearer() {
        let transport =
            StubTransport::replying(200, r#"{"choices":[{"message":{"content":"ok"}}]}"#);
        let gateway = ModelGateway::with_transport(configured(), transport.clone());

        gateway.call("vision-model", &prompt()).await;

        let (url, bearer, body) = transport.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(url, crate::config::DEFAULT_ENDPOINT);
        assert_eq!(bearer, "sk-test");
        assert_eq!(body["model"], "vision-model");
        assert_eq!(body["messages"][1]["content"], "When should I sow wheat?");
    }

    #[tokio::test]
    async fn error_payload_is_embedded() {
        let transport = StubTransport::replying(
            429,
            r#"{"error":{"message":"Rate limit exceeded","code":429}}"#,
        );
        let gateway = ModelGateway::with_transport(configured(), transport);

        let answer = gateway.call("m", &prompt()).await;

        assert_eq!(answer, "Model API error (HTTP 429): Rate limit exceeded");
    }

    #[tokio::test]
    async fn string_error_is_embedded() {
        let transport = StubTransport::replying(200, r#"{"error":"model overloaded"}"#);
        let gateway = ModelGateway::with_transport(configured(), transport);

        let answer = gateway.call("m", &prompt()).await;

        assert!(answer.contains("model overloaded"));
    }

    #[tokio::test]
    async fn unknown_shape_embeds_raw_response() {
        let transport =
            StubTransport::replying(200, r#"{"id":"gen-1","object":"chat.completion"}"#);
        let gateway = ModelGateway::with_transport(configured(), transport);

        let answer = gateway.call("m", &prompt()).await;

        assert!(answer.starts_with("Unexpected model response"));
        assert!(answer.contains("gen-1"));
    }

    #[tokio::test]
    async fn malformed_body_returns_non_empty_text() {
        let transport = StubTransport::replying(502, "<html>Bad Gateway</html>");
        let gateway = ModelGateway::with_transport(configured(), transport);

        let answer = gateway.call("m", &prompt()).await;

        assert!(answer.starts_with("API request failed"));
        assert!(answer.contains("502"));
    }

    #[tokio::test]
    async fn empty_error_body_returns_non_empty_text() {
        let transport = StubTransport::replying(500, "");
        let gateway = ModelGateway::with_transport(configured(), transport);

        let answer = gateway.call("m", &prompt()).await;

        assert!(!answer.is_empty());
    }

    #[tokio::test]
    async fn transport_failure_becomes_text() {
        let transport = StubTransport::failing();
        let gateway = ModelGateway::with_transport(configured(), transport.clone());

        let answer = gateway.call("m", &prompt()).await;

        assert!(answer.starts_with("API request failed:"));
        assert!(answer.contains("connection reset"));
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(MAX_DIAGNOSTIC_CHARS + 10);
        let text = interpret_response(&TransportResponse { status: 500, body });
        assert!(text.ends_with("..."));
        assert!(text.len() < MAX_DIAGNOSTIC_CHARS + 100);
    }
}
