use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A respondent's recorded interview submission, appended by the
/// automation engine's completion callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub id: String,
    pub form_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respondent: Option<String>,
    pub answers: serde_json::Value,
    pub submitted_at: DateTime<Utc>,
}

impl Response {
    pub fn new(
        id: String,
        form_id: String,
        respondent: Option<String>,
        answers: serde_json::Value,
    ) -> Self {
        Self {
            id,
            form_id,
            respondent,
            answers,
            submitted_at: Utc::now(),
        }
    }
}
