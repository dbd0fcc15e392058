use serde::{Deserialize, Serialize};

/// Body of `POST /release_notes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseNotesRequest {
    pub notes: String,
    /// Reviewer chat. Falls back to the configured default chat when absent.
    #[serde(default)]
    pub chat_id: Option<i64>,
    pub target_language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseNotesResponse {
    pub translated_notes: String,
}
