use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::patient::{MedicationEntry, Patient};

/// Emergency contact as captured into a snapshot (relationship dropped).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotContact {
    pub name: String,
    pub phone: String,
}

/// Point-in-time copy of a patient's profile, captured once at session
/// creation and never re-synced to later profile edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub name: String,
    pub age: u32,
    pub blood_type: Option<String>,
    pub allergies: Vec<String>,
    pub chronic_conditions: Vec<String>,
    pub current_medications: Vec<MedicationEntry>,
    #[serde(default)]
    pub recent_diagnoses: Vec<String>,
    pub emergency_contact: Option<SnapshotContact>,
    pub generated_at: DateTime<Utc>,
}

impl HealthSnapshot {
    /// Capture a snapshot from the patient's current profile.
    ///
    /// Age is computed from the date of birth at capture time (0 when
    /// absent); profile arrays are copied by value.
    pub fn capture(patient: &Patient, now: DateTime<Utc>) -> Self {
        let age = patient
            .personal_details
            .dob
            .map(|dob| age_from_dob(dob, now.date_naive()))
            .unwrap_or(0);

        HealthSnapshot {
            name: patient
                .full_name
                .clone()
                .unwrap_or_else(|| "Patient".to_string()),
            age,
            blood_type: patient
                .personal_details
                .blood_type
                .as_ref()
                .map(|b| b.as_str().to_string()),
            allergies: patient.medical_profile.allergies.clone(),
            chronic_conditions: patient.medical_profile.chronic_conditions.clone(),
            current_medications: patient.medical_profile.current_meds.clone(),
            recent_diagnoses: Vec::new(),
            emergency_contact: patient.personal_details.emergency_contact.as_ref().map(|c| {
                SnapshotContact {
                    name: c.name.clone(),
                    phone: c.phone.clone(),
                }
            }),
            generated_at: now,
        }
    }
}

/// Whole years between `dob` and `today`. 0 for a future date of birth.
pub fn age_from_dob(dob: NaiveDate, today: NaiveDate) -> u32 {
    today.years_since(dob).unwrap_or(0)
}
