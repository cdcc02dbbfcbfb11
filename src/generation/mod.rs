mod prompt;
mod service;
mod types;

pub use prompt::{DEFAULT_TEMPLATE, PromptTemplate, post_schema};
pub use service::{PostGenerator, parse_response};
pub use types::{GenerationResponse, LectureInfo};
