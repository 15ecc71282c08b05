/// LLM Client: the single point of entry for all Gemini API calls.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All model interactions go through `TextGenerator`.
///
/// Model: gemini-1.5-flash (hardcoded, do not make configurable to prevent drift)
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// The model used for every evaluation.
pub const MODEL: &str = "gemini-1.5-flash";
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model returned no text{}", .reason.as_deref().map(|r| format!(" ({r})")).unwrap_or_default())]
    EmptyContent { reason: Option<String> },
}

/// Produces model output for one (job description, résumé, instruction) triple.
///
/// Carried in `AppState` as `Arc<dyn TextGenerator>`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        job_description: &str,
        resume_text: &str,
        instruction: &str,
    ) -> Result<String, GenerationError>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Joins every text part of the first candidate.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn empty_reason(&self) -> Option<String> {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
            .or_else(|| self.candidates.first().and_then(|c| c.finish_reason.clone()))
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Gemini `generateContent` client. Makes exactly one request per call; no retries.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    api_base: String,
}

impl GeminiClient {
    pub fn new(api_key: String, api_base: String) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key,
            api_base,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{MODEL}:generateContent", self.api_base)
    }

    /// Makes a raw call to the Gemini API, returning the full response object.
    pub async fn call(
        &self,
        parts: &[&str],
    ) -> Result<GenerateContentResponse, GenerationError> {
        let request_body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: parts.iter().map(|&text| RequestPart { text }).collect(),
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "Gemini call succeeded: prompt_tokens={}, output_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        Ok(parsed)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        job_description: &str,
        resume_text: &str,
        instruction: &str,
    ) -> Result<String, GenerationError> {
        let response = self
            .call(&[job_description, resume_text, instruction])
            .await?;
        let reason = response.empty_reason();
        response
            .text()
            .ok_or(GenerationError::EmptyContent { reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured {
        requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    }

    /// Spawns a local stand-in for the Gemini endpoint that answers with `reply`.
    async fn spawn_stub(status: StatusCode, reply: Value) -> (String, Captured) {
        let captured = Captured::default();
        let app = Router::new()
            .route(
                "/v1beta/models/:call",
                post(
                    move |State(captured): State<Captured>,
                          headers: HeaderMap,
                          Json(body): Json<Value>| async move {
                        let key = headers
                            .get("x-goog-api-key")
                            .and_then(|v| v.to_str().ok())
                            .map(String::from);
                        captured.requests.lock().unwrap().push((key, body));
                        (status, Json(reply))
                    },
                ),
            )
            .with_state(captured.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), captured)
    }

    fn client(base: String) -> GeminiClient {
        GeminiClient::new("test-key".to_string(), base).unwrap()
    }

    #[tokio::test]
    async fn test_generate_sends_three_parts_once() {
        let (base, captured) = spawn_stub(
            StatusCode::OK,
            json!({
                "candidates": [{"content": {"parts": [{"text": "Strong "}, {"text": "match"}]}}],
                "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 2}
            }),
        )
        .await;

        let text = client(base)
            .generate("Senior Rust role", "Ten years of Rust", "Evaluate")
            .await
            .unwrap();
        assert_eq!(text, "Strong match");

        let requests = captured.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let (key, body) = &requests[0];
        assert_eq!(key.as_deref(), Some("test-key"));
        assert_eq!(
            body,
            &json!({"contents": [{"role": "user", "parts": [
                {"text": "Senior Rust role"},
                {"text": "Ten years of Rust"},
                {"text": "Evaluate"}
            ]}]})
        );
    }

    #[tokio::test]
    async fn test_api_error_message_extracted() {
        let (base, captured) = spawn_stub(
            StatusCode::BAD_REQUEST,
            json!({"error": {"code": 400, "message": "API key not valid"}}),
        )
        .await;

        let err = client(base).generate("jd", "cv", "go").await.unwrap_err();
        match err {
            GenerationError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // No retries, even on failure.
        assert_eq!(captured.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let (base, captured) =
            spawn_stub(StatusCode::SERVICE_UNAVAILABLE, json!({"oops": true})).await;

        let err = client(base).generate("jd", "cv", "go").await.unwrap_err();
        assert!(matches!(err, GenerationError::Api { status: 503, .. }));
        assert_eq!(captured.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blocked_prompt_reports_reason() {
        let (base, _) = spawn_stub(
            StatusCode::OK,
            json!({"promptFeedback": {"blockReason": "SAFETY"}}),
        )
        .await;

        let err = client(base).generate("jd", "cv", "go").await.unwrap_err();
        assert!(matches!(
            &err,
            GenerationError::EmptyContent { reason: Some(r) } if r == "SAFETY"
        ));
        assert_eq!(err.to_string(), "model returned no text (SAFETY)");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(format!("http://{addr}"))
            .generate("jd", "cv", "go")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Http(_)));
    }

    #[test]
    fn test_response_text_skips_non_text_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "85%"}, {"inlineData": {}}]},
                            "finishReason": "STOP"}]
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("85%"));
    }

    #[test]
    fn test_empty_candidates_has_no_text() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": []})).unwrap();
        assert!(response.text().is_none());
        assert!(response.empty_reason().is_none());
    }

    #[test]
    fn test_endpoint_uses_pinned_model() {
        let c = client("http://localhost:1".to_string());
        assert_eq!(
            c.endpoint(),
            "http://localhost:1/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }
}
