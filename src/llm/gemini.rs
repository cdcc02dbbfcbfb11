use super::{LlmClient, types::StructuredRequest};
use crate::{Error, Result, credential::CredentialProvider};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tracing::{debug, warn};

/// Native Gemini `generateContent` client.
pub struct GeminiClient {
    http: Client,
    endpoint: String,
    model: String,
    credential: Arc<dyn CredentialProvider>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    status: Option<String>,
    #[serde(default)]
    details: Vec<Value>,
}

impl GeminiClient {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
        credential: Arc<dyn CredentialProvider>,
    ) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            credential,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate_structured(&self, request: StructuredRequest) -> Result<String> {
        let api_key = self.credential.api_key()?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: request.schema.to_gemini_schema(),
                temperature: request.temperature,
            },
        };

        debug!("Calling Gemini model {}", self.model);

        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &text));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::generation(format!("Malformed Gemini response: {}", e)))?;

        extract_text(payload)
    }
}

fn extract_text(payload: GenerateContentResponse) -> Result<String> {
    if let Some(reason) = payload.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(Error::generation(format!("Prompt blocked: {}", reason)));
    }

    let candidate = payload
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| Error::generation("Gemini returned no candidates"))?;

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter(|part| !part.thought)
        .filter_map(|part| part.text)
        .collect();

    if text.trim().is_empty() {
        return Err(Error::generation(format!(
            "Gemini returned no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(text)
}

/// Maps a non-2xx Gemini response to a credential or generation failure.
fn classify_failure(status: StatusCode, body: &str) -> Error {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let (message, api_status, reasons) = match &parsed {
        Some(envelope) => (
            envelope.error.message.clone(),
            envelope.error.status.clone().unwrap_or_default(),
            envelope
                .error
                .details
                .iter()
                .filter_map(|d| d.get("reason").and_then(Value::as_str))
                .map(str::to_string)
                .collect::<Vec<_>>(),
        ),
        None => (body.to_string(), String::new(), Vec::new()),
    };

    let credential_status = matches!(api_status.as_str(), "UNAUTHENTICATED" | "PERMISSION_DENIED");
    let credential_reason = reasons
        .iter()
        .any(|r| r == "API_KEY_INVALID" || r == "API_KEY_EXPIRED");
    // The key exists but has no access to the project or model
    let entity_not_found = status == StatusCode::NOT_FOUND && api_status == "NOT_FOUND";

    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        || credential_status
        || credential_reason
        || entity_not_found
    {
        warn!("Gemini rejected the credential with {}", status);
        return Error::credential(format!("Gemini returned {}: {}", status, message));
    }

    warn!("Gemini request failed with {}", status);
    Error::generation(format!("Gemini returned {}: {}", status, message))
}
