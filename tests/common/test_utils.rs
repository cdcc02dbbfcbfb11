use lecture_posts::{
    Result,
    config::{Config, LlmConfig, LogsConfig, PromptConfig, Provider, ServerConfig},
    generation::LectureInfo,
};
use tempfile::TempDir;
use tokio::fs;

/// Create a test configuration pointing at the given endpoint
pub fn create_test_config(base_url: &str) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            logs: LogsConfig {
                level: "debug".to_string(),
            },
        },
        llm: LlmConfig {
            provider: Provider::Gemini,
            base_url: base_url.to_string(),
            model: "gemini-test".to_string(),
            api_key_env: "LECTURE_POSTS_TEST_UNSET_KEY".to_string(),
            api_key: Some("test-api-key".to_string()),
            temperature: None,
            timeout_secs: 5,
        },
        prompt: PromptConfig::default(),
    }
}

pub fn sample_lecture() -> LectureInfo {
    LectureInfo {
        location: "경기도교육연수원".to_string(),
        date_time: "2024년 11월 2일 오전 10시".to_string(),
        target: "신규 교사 60명".to_string(),
        topic: "생성형 AI로 여는 미술 수업".to_string(),
        reaction: "실습 시간에 환호성이 터졌어요".to_string(),
    }
}

/// Create a temporary directory for test files
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Write a file into the temp dir and return its path
pub async fn write_test_file(dir: &TempDir, name: &str, content: &str) -> Result<String> {
    let path = dir.path().join(name);
    fs::write(&path, content).await?;
    Ok(path.to_string_lossy().to_string())
}

pub const POSTS_JSON: &str = r#"{"instagram":"A","naverBlog":"B"}"#;

/// Sample configuration YAML for testing
pub const SAMPLE_CONFIG_YAML: &str = r#"
server:
  host: "127.0.0.1"
  port: 9090
  logs:
    level: "debug"

llm:
  provider: "gemini"
  model: "gemini-2.5-flash"
  api_key_env: "MY_GEMINI_KEY"
  temperature: 0.9
  timeout_secs: 30

prompt:
  template_path: "prompts/custom.hbs"
"#;

/// Configuration with an OpenAI-compatible endpoint and a fixed key
pub const SAMPLE_OPENAI_CONFIG_YAML: &str = r#"
llm:
  provider: "openai"
  base_url: "http://localhost:11434/v1"
  model: "llama3.1"
  api_key: "local"
"#;

/// Invalid configuration YAML for testing error cases
pub const INVALID_CONFIG_YAML: &str = r#"
server:
  port: "not-a-number"

llm:
  provider: "unknown"
"#;
