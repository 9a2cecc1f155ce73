use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A doctor account, created lazily on first scan-and-authenticate.
/// `anonymous_id` links the record to the identity provider's anonymous
/// subject; every authorization check compares against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub anonymous_id: Option<Uuid>,
    pub display_name: Option<String>,
    pub specialty: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Doctor {
    /// Display name with the fallback used in system messages.
    pub fn name_or_default(&self) -> String {
        self.display_name
            .clone()
            .unwrap_or_else(|| "Doctor".to_string())
    }
}
