use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ReferralStatus;

/// A single-use, session-scoped invitation code.
///
/// The code is only valid for the session it was minted in; status moves
/// `pending` → `accepted` exactly once and re-acceptance is a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Referral {
    pub id: Uuid,
    pub session_id: Uuid,
    pub created_by_doctor_id: Option<Uuid>,
    pub referral_code: String,
    pub target_specialty: Option<String>,
    pub notes: Option<String>,
    pub status: ReferralStatus,
    pub accepted_by_doctor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}
