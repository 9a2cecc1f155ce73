use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ai::VoiceAiProcessed;
use super::enums::{FileKind, MessageKind, SenderType, SystemEvent};

/// One medicine line inside a prescription message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescribedMedicine {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Polymorphic message payload, keyed by message type.
///
/// Stored as tagged JSON; consumers pattern-match exhaustively instead of
/// shape-sniffing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageContent {
    Text {
        text: String,
    },
    Voice {
        audio_url: String,
        duration_seconds: u32,
        #[serde(default)]
        transcription: Option<String>,
        #[serde(default)]
        language_detected: Option<String>,
    },
    Prescription {
        medicines: Vec<PrescribedMedicine>,
        #[serde(default)]
        instructions: Option<String>,
    },
    Referral {
        referral_id: Uuid,
        referral_code: String,
        #[serde(default)]
        target_specialty: Option<String>,
        #[serde(default)]
        notes: Option<String>,
        /// Redemption URL embedded in the QR code.
        qr_data: String,
    },
    Upload {
        file_url: String,
        file_kind: FileKind,
        file_name: String,
        #[serde(default)]
        extracted_text: Option<String>,
    },
    System {
        event: SystemEvent,
        #[serde(default)]
        actor_name: Option<String>,
        #[serde(default)]
        metadata: serde_json::Value,
    },
}

impl MessageContent {
    /// The message type string persisted alongside the payload.
    pub fn kind(&self) -> MessageKind {
        match self {
            MessageContent::Text { .. } => MessageKind::Text,
            MessageContent::Voice { .. } => MessageKind::Voice,
            MessageContent::Prescription { .. } => MessageKind::Prescription,
            MessageContent::Referral { .. } => MessageKind::Referral,
            MessageContent::Upload { .. } => MessageKind::Upload,
            MessageContent::System { .. } => MessageKind::System,
        }
    }
}

/// Append-only session log entry. `sender_id` is None for system messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub session_id: Uuid,
    pub sender_type: SenderType,
    pub sender_id: Option<Uuid>,
    pub content: MessageContent,
    pub ai_processed: Option<VoiceAiProcessed>,
    pub created_at: DateTime<Utc>,
}
