//! Structured entities returned by the external voice-processing service.
//!
//! The core treats these as opaque: it never validates their clinical
//! correctness, only their presence when deciding whether to create
//! medicine todos and follow-up reminders.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedMedicine {
    pub name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
}

/// Referral suggestion the AI heard in the recording. Informational only;
/// actual referrals are minted explicitly by a doctor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferralSuggestion {
    pub specialty: String,
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUpEntity {
    pub condition: String,
    pub timeframe: String,
    pub action: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedEntities {
    pub medicines: Vec<ExtractedMedicine>,
    pub conditions: Vec<String>,
    pub referral: Option<ReferralSuggestion>,
    pub follow_up: Option<FollowUpEntity>,
}

/// Full AI-processed block attached to a voice message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceAiProcessed {
    pub transcription: String,
    pub summary: String,
    pub language_detected: String,
    pub entities: ExtractedEntities,
}
