use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{ParticipantRole, SessionStatus};
use super::snapshot::HealthSnapshot;

/// One consultation between a patient and one or more doctors.
///
/// Status only ever moves `active` → `closed`; the snapshot is captured
/// at creation and never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub created_by_doctor_id: Option<Uuid>,
    pub status: SessionStatus,
    pub health_snapshot: Option<HealthSnapshot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A doctor admitted into a session, either as the originating `primary`
/// doctor or via referral (`referred`). At most one row per
/// (session, doctor) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionParticipant {
    pub id: Uuid,
    pub session_id: Uuid,
    pub doctor_id: Uuid,
    pub role: ParticipantRole,
    pub joined_at: DateTime<Utc>,
}
