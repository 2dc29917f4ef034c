use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-owned container for interview forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(id: String, name: String, description: Option<String>, user_id: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            description,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }
}
