use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{BloodType, Gender};

/// Emergency contact stored inside a patient's personal details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
    pub relationship: String,
}

/// One current-medication entry in the medical profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationEntry {
    pub name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PastSurgery {
    pub name: String,
    #[serde(default)]
    pub year: Option<i32>,
}

/// Demographic block, owned and edited only by the patient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalDetails {
    pub dob: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub blood_type: Option<BloodType>,
    pub emergency_contact: Option<EmergencyContact>,
}

/// Medical profile block. Absent arrays deserialize as empty — callers
/// never see a missing-vs-empty distinction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicalProfile {
    pub allergies: Vec<String>,
    pub chronic_conditions: Vec<String>,
    pub current_meds: Vec<MedicationEntry>,
    pub past_surgeries: Vec<PastSurgery>,
}

/// A patient account. Identity id comes from the external identity
/// provider (non-anonymous, OAuth-backed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub onboarded: bool,
    pub personal_details: PersonalDetails,
    pub medical_profile: MedicalProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
