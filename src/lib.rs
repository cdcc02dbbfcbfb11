pub mod config;
pub mod credential;
pub mod error;
pub mod generation;
pub mod llm;
pub mod server;
pub mod slot;

pub use error::{Error, ErrorKind, ErrorReport, Result};
