use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Medication reminder derived from AI-extracted entities in a voice
/// message. Created best-effort after the message commits; lifecycle
/// beyond creation belongs to the medication-tracking surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicineTodo {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub session_id: Option<Uuid>,
    pub message_id: Option<Uuid>,
    pub medicine_name: String,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub duration: Option<String>,
    pub instructions: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Follow-up reminder derived from a voice message's follow-up entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpReminder {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub session_id: Option<Uuid>,
    pub message_id: Option<Uuid>,
    pub reminder_text: String,
    pub trigger_condition: Option<String>,
    pub trigger_value: Option<String>,
    pub target_doctor_name: Option<String>,
    pub is_triggered: bool,
    pub created_at: DateTime<Utc>,
}
