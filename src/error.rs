use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("OpenAI error: {0}")]
    OpenAi(#[from] async_openai::error::OpenAIError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// What the caller should do about a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Required field missing; fix the form.
    Input,
    /// Credential missing or rejected; re-activate it.
    Credential,
    /// Anything else; try again.
    Generation,
}

impl ErrorKind {
    pub fn user_message(self) -> &'static str {
        match self {
            Self::Input => "장소와 주제는 꼭 적어주셔야 제가 정성껏 쓸 수 있어요! 😊",
            Self::Credential => {
                "API 키가 활성화되지 않았어요. 키를 다시 연결한 뒤 시도해 주세요. 🔑"
            }
            Self::Generation => {
                "죄송해요, 글을 생성하는 중에 문제가 생겼어요. 다시 한 번 버튼을 눌러주시겠어요? 🙏"
            }
        }
    }
}

/// The user-facing view of an error: its kind and the message to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
    /// Only set for input errors; upstream detail never reaches the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Clone for Error {
    fn clone(&self) -> Self {
        match self {
            Self::Config(s) => Self::Config(s.clone()),
            Self::Input(s) => Self::Input(s.clone()),
            Self::Credential(s) => Self::Credential(s.clone()),
            Self::Generation(s) => Self::Generation(s.clone()),
            Self::Internal(s) => Self::Internal(s.clone()),
            // Wrapped library errors aren't Clone; keep the kind, drop the source
            Self::Template(e) => Self::Generation(format!("Template error: {}", e)),
            Self::Serialization(e) => Self::Generation(format!("Serialization error: {}", e)),
            Self::Yaml(e) => Self::Config(format!("YAML error: {}", e)),
            Self::Io(e) => Self::Internal(format!("IO error: {}", e)),
            Self::Network(e) => Self::Generation(format!("Network error: {}", e)),
            Self::AddrParse(e) => Self::Config(format!("Address parse error: {}", e)),
            Self::OpenAi(e) => Self::Generation(format!("OpenAI error: {}", e)),
        }
    }
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn credential(msg: impl Into<String>) -> Self {
        Self::Credential(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Input(_) => ErrorKind::Input,
            Self::Credential(_) => ErrorKind::Credential,
            _ => ErrorKind::Generation,
        }
    }

    pub fn user_message(&self) -> &'static str {
        self.kind().user_message()
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.user_message().to_string(),
            detail: match self {
                Self::Input(detail) => Some(detail.clone()),
                _ => None,
            },
        }
    }
}
