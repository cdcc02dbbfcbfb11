use super::{
    prompt::{PromptTemplate, post_schema},
    types::{GenerationResponse, LectureInfo},
};
use crate::{
    Error, Result,
    llm::{LlmClient, StructuredRequest},
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Turns one `LectureInfo` into one pair of posts.
///
/// Input is not validated here; callers reject incomplete forms first.
/// Every call issues exactly one request and nothing is cached.
pub struct PostGenerator {
    client: Arc<dyn LlmClient>,
    template: PromptTemplate,
    temperature: Option<f32>,
}

impl PostGenerator {
    pub fn new(client: Arc<dyn LlmClient>, template: PromptTemplate) -> Self {
        Self {
            client,
            template,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    #[instrument(skip(self, info), fields(location = %info.location, topic = %info.topic))]
    pub async fn generate_posts(&self, info: &LectureInfo) -> Result<GenerationResponse> {
        let prompt = self.template.render(info)?;
        debug!("Rendered prompt with {} characters", prompt.chars().count());

        let request = StructuredRequest {
            prompt,
            schema: post_schema(),
            temperature: self.temperature,
        };

        let text = match self.client.generate_structured(request).await {
            Ok(text) => text,
            Err(e) => {
                error!("Generation request failed: {}", e);
                return Err(e);
            }
        };

        let response = parse_response(&text).inspect_err(|e| {
            error!("Generation response did not match the schema: {}", e);
        })?;

        info!(
            "Generated posts: instagram {} chars, blog {} chars",
            response.instagram.chars().count(),
            response.naver_blog.chars().count()
        );

        Ok(response)
    }
}

/// Decodes the model output, tolerating a Markdown code fence around the JSON.
pub fn parse_response(text: &str) -> Result<GenerationResponse> {
    let body = strip_code_fence(text.trim());
    if body.is_empty() {
        return Err(Error::generation("Empty response body"));
    }
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| Error::generation(format!("Response is not valid JSON: {}", e)))?;

    // Derived struct decoding would also take a positional array
    if !value.is_object() {
        return Err(Error::generation("Response is not a JSON object"));
    }

    serde_json::from_value(value)
        .map_err(|e| Error::generation(format!("Response does not match the post schema: {}", e)))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return text;
    };
    // Drop a language tag such as `json` on the opening line
    let inner = match inner.find('\n') {
        Some(idx) if inner[..idx].chars().all(char::is_alphanumeric) => &inner[idx + 1..],
        _ => inner,
    };
    inner.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    struct ScriptedClient {
        replies: Mutex<Vec<Result<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn generate_structured(&self, request: StructuredRequest) -> Result<String> {
            self.prompts.lock().unwrap().push(request.prompt);
            self.replies.lock().unwrap().remove(0)
        }
    }

    fn info() -> LectureInfo {
        LectureInfo {
            location: "대전".to_string(),
            topic: "에듀테크".to_string(),
            ..Default::default()
        }
    }

    fn generator(client: Arc<ScriptedClient>) -> PostGenerator {
        PostGenerator::new(client, PromptTemplate::builtin().unwrap())
    }

    #[tokio::test]
    async fn test_generate_posts_round_trip() {
        let client = Arc::new(ScriptedClient::new(vec![Ok(
            r#"{"instagram":"A","naverBlog":"B"}"#.to_string(),
        )]));

        let response = generator(client.clone()).generate_posts(&info()).await.unwrap();

        assert_eq!(
            response,
            GenerationResponse {
                instagram: "A".to_string(),
                naver_blog: "B".to_string(),
            }
        );
        let prompts = client.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("에듀테크"));
    }

    #[tokio::test]
    async fn test_missing_key_is_generation_error() {
        let client = Arc::new(ScriptedClient::new(vec![Ok(r#"{"instagram":"A"}"#.to_string())]));

        let err = generator(client).generate_posts(&info()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Generation);
        assert!(err.to_string().contains("naverBlog"));
    }

    #[tokio::test]
    async fn test_client_errors_pass_through() {
        let client = Arc::new(ScriptedClient::new(vec![Err(Error::credential("rejected"))]));

        let err = generator(client).generate_posts(&info()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Credential);
    }

    #[tokio::test]
    async fn test_identical_calls_are_independent() {
        let client = Arc::new(ScriptedClient::new(vec![
            Ok(r#"{"instagram":"first","naverBlog":"one"}"#.to_string()),
            Ok(r#"{"instagram":"second","naverBlog":"two"}"#.to_string()),
        ]));
        let generator = generator(client.clone());

        let first = generator.generate_posts(&info()).await.unwrap();
        let second = generator.generate_posts(&info()).await.unwrap();

        assert_eq!(first.instagram, "first");
        assert_eq!(second.instagram, "second");
        assert_eq!(client.prompts.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_parse_response_with_code_fence() {
        let fenced = "```json\n{\"instagram\":\"A\",\"naverBlog\":\"B\"}\n```";
        assert_eq!(parse_response(fenced).unwrap().naver_blog, "B");
    }

    #[test]
    fn test_parse_response_rejects_garbage() {
        assert!(parse_response("").is_err());
        assert!(parse_response("not json").is_err());
        assert!(parse_response(r#"{"instagram":null,"naverBlog":"B"}"#).is_err());
        assert!(parse_response(r#"["A","B"]"#).is_err());
        assert!(parse_response(r#""A""#).is_err());
    }

    #[tokio::test]
    async fn test_array_output_is_generation_error() {
        let client = Arc::new(ScriptedClient::new(vec![Ok(r#"["A","B"]"#.to_string())]));

        let err = generator(client).generate_posts(&info()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Generation);
    }
}
