use super::{LlmClient, types::StructuredRequest};
use crate::{Error, Result, credential::CredentialProvider};
use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent,
        CreateChatCompletionRequestArgs, ResponseFormat, ResponseFormatJsonSchema,
    },
};
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use tracing::{debug, warn};

/// Client for OpenAI-compatible chat completion endpoints.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_base: String,
    model: String,
    credential: Arc<dyn CredentialProvider>,
}

impl OpenAiClient {
    pub fn new(
        api_base: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
        credential: Arc<dyn CredentialProvider>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            model: model.into(),
            credential,
        })
    }

    /// Builds a client bound to the key resolved for this call.
    fn client_for(&self, api_key: String) -> Client<OpenAIConfig> {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(self.api_base.clone());

        // The SDK retries 429 and 5xx responses unless told otherwise
        let no_retry = backoff::ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        Client::with_config(config)
            .with_http_client(self.http.clone())
            .with_backoff(no_retry)
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn generate_structured(&self, request: StructuredRequest) -> Result<String> {
        let client = self.client_for(self.credential.api_key()?);

        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Text(request.prompt))
            .build()
            .map_err(|e| Error::generation(format!("Failed to build user message: {}", e)))?;

        let messages: Vec<ChatCompletionRequestMessage> = vec![message.into()];

        let response_format = ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                description: None,
                name: request.schema.name.clone(),
                schema: Some(request.schema.to_json_schema()),
                strict: Some(true),
            },
        };

        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder
            .model(&self.model)
            .messages(messages)
            .response_format(response_format);

        if let Some(temperature) = request.temperature {
            request_builder.temperature(temperature);
        }

        let openai_request = request_builder.build().map_err(classify_failure)?;

        debug!("Calling OpenAI-compatible model {}", self.model);

        let response = client
            .chat()
            .create(openai_request)
            .await
            .map_err(classify_failure)?;

        let message = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| Error::generation("Completion returned no choices"))?;

        if let Some(refusal) = message.refusal {
            return Err(Error::generation(format!("Model refused: {}", refusal)));
        }

        message
            .content
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| Error::generation("Completion returned no content"))
    }
}

fn classify_failure(error: OpenAIError) -> Error {
    if let OpenAIError::ApiError(api) = &error {
        let code = api.code.as_deref().unwrap_or_default();
        let error_type = api.r#type.as_deref().unwrap_or_default();
        if code == "invalid_api_key"
            || matches!(error_type, "authentication_error" | "permission_error")
        {
            warn!("Completion endpoint rejected the credential: {}", api.message);
            return Error::credential(api.message.clone());
        }
    }
    Error::OpenAi(error)
}
