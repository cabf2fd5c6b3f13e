//! OpenAI-compatible provider implementation.
//!
//! Works with DeepSeek and any endpoint that speaks the OpenAI
//! `chat/completions` protocol. Non-streaming only.
//!
//! Every failure is classified into a `ProviderError`:
//! - empty credential: `NotConfigured`, before any network call
//! - 401 / 429 / 5xx: `AuthenticationFailed` / `RateLimited` / `Unavailable`
//! - other non-2xx: `ApiError`, carrying the upstream `error.message`
//! - timeout / transport: `Timeout` / `Network`
//! - unusable body: `InvalidResponse`

use async_trait::async_trait;
use laozihao_core::error::ProviderError;
use laozihao_core::message::Message;
use laozihao_core::provider::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default bound on a single completion call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// An OpenAI-compatible chat completion provider.
pub struct OpenAiCompatProvider {
    name: String,
    endpoint: String,
    api_key: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new provider posting to `endpoint` (the full
    /// `.../chat/completions` URL).
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into().trim().to_string(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    /// Create a DeepSeek provider (convenience constructor).
    pub fn deepseek(api_key: impl Into<String>) -> Self {
        Self::new(
            "deepseek",
            "https://api.deepseek.com/v1/chat/completions",
            api_key,
        )
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Convert our Message types to OpenAI API format.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage<'_>> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: m.role.as_str(),
                content: &m.content,
            })
            .collect()
    }

    fn classify_transport(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl laozihao_core::Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::NotConfigured(
                "set DEEPSEEK_API_KEY to enable chat".into(),
            ));
        }

        let body = ApiRequest {
            model: &request.model,
            messages: Self::to_api_messages(&request.messages),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        };

        debug!(
            provider = %self.name,
            model = %request.model,
            messages = request.messages.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let err = self.classify_transport(e);
                warn!(provider = %self.name, error = %err, "Completion request failed");
                err
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %error_body, "Provider returned error");
            let message = upstream_error_message(&error_body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
            return Err(ProviderError::from_status(status.as_u16(), message));
        }

        let text = response
            .text()
            .await
            .map_err(|e| self.classify_transport(e))?;

        parse_completion(&text).inspect_err(|err| {
            warn!(provider = %self.name, error = %err, "Unusable completion body");
        })
    }
}

/// Extract `error.message` from an OpenAI-style error body, if present.
fn upstream_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value["error"]["message"]
        .as_str()
        .filter(|m| !m.is_empty())
        .map(String::from)
}

/// Parse a successful completion body into the first choice's trimmed text.
fn parse_completion(body: &str) -> Result<ProviderResponse, ProviderError> {
    let api_response: ApiResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("failed to parse body: {e}")))?;

    let choice = api_response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::InvalidResponse("no choices in response".into()))?;

    let content = choice
        .message
        .and_then(|m| m.content)
        .ok_or_else(|| ProviderError::InvalidResponse("first choice has no content".into()))?;

    let usage = api_response.usage.map(|u| Usage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    });

    Ok(ProviderResponse {
        content: content.trim().to_string(),
        model: api_response.model,
        usage,
    })
}

// --- Wire types ---

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    #[serde(default)]
    message: Option<ApiResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use laozihao_core::Provider;
    use std::sync::{Arc, Mutex};

    const OK_BODY: &str = r#"{
        "model": "deepseek-chat",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": "  同仁堂创立于1669年。\n"}}],
        "usage": {"prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20}
    }"#;

    /// Serve `app` on an ephemeral port and return the completions URL.
    async fn spawn_upstream(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1/chat/completions")
    }

    async fn upstream_returning(status: StatusCode, body: &'static str) -> String {
        spawn_upstream(Router::new().route(
            "/v1/chat/completions",
            post(move || async move { (status, body) }),
        ))
        .await
    }

    fn request() -> ProviderRequest {
        ProviderRequest {
            model: "deepseek-chat".into(),
            messages: vec![Message::system("你是老字号助手"), Message::user("同仁堂?")],
            temperature: 0.7,
            max_tokens: Some(2000),
            stream: false,
        }
    }

    async fn complete_against(status: StatusCode, body: &'static str) -> Result<ProviderResponse, ProviderError> {
        let url = upstream_returning(status, body).await;
        OpenAiCompatProvider::new("test", url, "sk-test")
            .complete(request())
            .await
    }

    #[test]
    fn deepseek_constructor() {
        let provider = OpenAiCompatProvider::deepseek("sk-test");
        assert_eq!(provider.name(), "deepseek");
        assert!(provider.endpoint.ends_with("/chat/completions"));
        assert_eq!(provider.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn message_conversion() {
        let messages = vec![Message::system("rules"), Message::user("Hello"), Message::assistant("Hi")];
        let api_messages = OpenAiCompatProvider::to_api_messages(&messages);
        let roles: Vec<_> = api_messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, ["system", "user", "assistant"]);
        assert_eq!(api_messages[1].content, "Hello");
    }

    #[test]
    fn upstream_error_message_extraction() {
        assert_eq!(
            upstream_error_message(r#"{"error":{"message":"Model Not Exist","type":"invalid_request_error"}}"#),
            Some("Model Not Exist".into())
        );
        assert_eq!(upstream_error_message("<html>bad gateway</html>"), None);
        assert_eq!(upstream_error_message(r#"{"error":{}}"#), None);
    }

    #[test]
    fn parse_completion_trims_first_choice() {
        let response = parse_completion(OK_BODY).unwrap();
        assert_eq!(response.content, "同仁堂创立于1669年。");
        assert_eq!(response.model, "deepseek-chat");
        assert_eq!(response.usage.unwrap().total_tokens, 20);

        let partial_usage = parse_completion(
            r#"{"model":"m","choices":[{"message":{"content":" 答案 "}}],"usage":{"prompt_tokens":5}}"#,
        )
        .unwrap();
        assert_eq!(partial_usage.content, "答案");
        let usage = partial_usage.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 5);
        assert_eq!(usage.completion_tokens, 0);
    }

    #[test]
    fn parse_completion_rejects_unusable_bodies() {
        for body in [
            "not json",
            r#"{"choices": []}"#,
            r#"{"object": "chat.completion"}"#,
            r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#,
            r#"{"choices": [{"finish_reason": "stop"}]}"#,
        ] {
            assert!(
                matches!(parse_completion(body), Err(ProviderError::InvalidResponse(_))),
                "accepted {body}"
            );
        }
    }

    #[tokio::test]
    async fn missing_key_is_a_configuration_error() {
        // Nothing listens on port 9; a network attempt would surface as Network.
        let provider = OpenAiCompatProvider::new("test", "http://127.0.0.1:9/v1/chat/completions", "  ");
        let err = provider.complete(request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn successful_completion() {
        let response = complete_against(StatusCode::OK, OK_BODY).await.unwrap();
        assert_eq!(response.content, "同仁堂创立于1669年。");
    }

    #[tokio::test]
    async fn sends_fixed_parameters_and_bearer_token() {
        let seen: Arc<Mutex<Option<(String, serde_json::Value)>>> = Arc::new(Mutex::new(None));
        let capture = seen.clone();
        let url = spawn_upstream(Router::new().route(
            "/v1/chat/completions",
            post(move |headers: HeaderMap, axum::Json(body): axum::Json<serde_json::Value>| {
                let capture = capture.clone();
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    *capture.lock().unwrap() = Some((auth, body));
                    OK_BODY
                }
            }),
        ))
        .await;

        OpenAiCompatProvider::new("test", url, "sk-test")
            .complete(request())
            .await
            .unwrap();

        let (auth, body) = seen.lock().unwrap().take().unwrap();
        assert_eq!(auth, "Bearer sk-test");
        assert_eq!(body["model"], "deepseek-chat");
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(body["stream"], false);
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "同仁堂?");
    }

    #[tokio::test]
    async fn status_401_is_invalid_credential() {
        let err = complete_against(StatusCode::UNAUTHORIZED, r#"{"error":{"message":"bad key"}}"#)
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::AuthenticationFailed);
    }

    #[tokio::test]
    async fn status_429_is_rate_limited() {
        let err = complete_against(StatusCode::TOO_MANY_REQUESTS, "").await.unwrap_err();
        assert_eq!(err, ProviderError::RateLimited);
    }

    #[tokio::test]
    async fn status_5xx_is_unavailable() {
        let err = complete_against(StatusCode::BAD_GATEWAY, "upstream down").await.unwrap_err();
        assert_eq!(err, ProviderError::Unavailable { status_code: 502 });
    }

    #[tokio::test]
    async fn other_status_carries_upstream_message() {
        let err = complete_against(
            StatusCode::PAYMENT_REQUIRED,
            r#"{"error":{"message":"Insufficient Balance"}}"#,
        )
        .await
        .unwrap_err();
        assert_eq!(
            err,
            ProviderError::ApiError {
                status_code: 402,
                message: "Insufficient Balance".into()
            }
        );

        let err = complete_against(StatusCode::BAD_REQUEST, "").await.unwrap_err();
        assert_eq!(
            err,
            ProviderError::ApiError {
                status_code: 400,
                message: "Bad Request".into()
            }
        );
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_format_error() {
        let err = complete_against(StatusCode::OK, r#"{"choices":[]}"#).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let url = spawn_upstream(Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                OK_BODY
            }),
        ))
        .await;

        let err = OpenAiCompatProvider::new("test", url, "sk-test")
            .with_timeout(Duration::from_millis(200))
            .complete(request())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Timeout { .. }));
    }

    #[tokio::test]
    async fn refused_connection_is_a_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = OpenAiCompatProvider::new("test", format!("http://{addr}/v1/chat/completions"), "sk-test")
            .complete(request())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Network(_)));
    }
}
