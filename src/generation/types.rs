use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// One lecture as entered in the form. All fields are free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LectureInfo {
    pub location: String,
    pub date_time: String,
    pub target: String,
    pub topic: String,
    pub reaction: String,
}

/// The two generated posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    pub instagram: String,
    pub naver_blog: String,
}

impl LectureInfo {
    /// Location and topic are required before anything is sent.
    pub fn validate(&self) -> Result<()> {
        if self.location.trim().is_empty() {
            return Err(Error::input("location is required"));
        }
        if self.topic.trim().is_empty() {
            return Err(Error::input("topic is required"));
        }
        Ok(())
    }
}
