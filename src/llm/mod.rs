mod gemini;
mod openai;
mod types;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;
pub use types::*;

use crate::{
    Result,
    config::{LlmConfig, Provider},
    credential::CredentialProvider,
};
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use tracing::info;

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends one request and returns the model's raw JSON text.
    async fn generate_structured(&self, request: StructuredRequest) -> Result<String>;
}

pub fn create_llm_client(
    config: &LlmConfig,
    credential: Arc<dyn CredentialProvider>,
) -> Result<Arc<dyn LlmClient>> {
    let timeout = Duration::from_secs(config.timeout_secs);

    info!(
        "Using {:?} provider at {} with model {}",
        config.provider,
        config.endpoint(),
        config.model
    );

    let client: Arc<dyn LlmClient> = match config.provider {
        Provider::Gemini => Arc::new(GeminiClient::new(
            config.endpoint(),
            config.model.clone(),
            timeout,
            credential,
        )?),
        Provider::Openai => Arc::new(OpenAiClient::new(
            config.endpoint(),
            config.model.clone(),
            timeout,
            credential,
        )?),
    };

    Ok(client)
}
