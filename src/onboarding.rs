//! Patient onboarding and doctor profile setup.
//!
//! Patients arrive with a bare identity row and fill in their profile
//! once; doctors are created lazily from an anonymous identity and may
//! set a display name and specialty a single time.

use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use crate::db::repository::{
    get_doctor, get_doctor_by_anonymous_id, insert_doctor, update_doctor_profile,
    update_patient_profile,
};
use crate::error::ServiceError;
use crate::identity::CallerIdentity;
use crate::models::{
    BloodType, Doctor, EmergencyContact, Gender, MedicalProfile, MedicationEntry, PastSurgery,
    PersonalDetails,
};

/// Everything the onboarding form collects, pre-normalization.
#[derive(Debug, Clone, Default)]
pub struct OnboardingData {
    pub full_name: String,
    pub dob: Option<NaiveDate>,
    /// Free-form as submitted; normalized against [`Gender`] on save.
    pub gender: Option<String>,
    pub blood_type: Option<BloodType>,
    pub emergency_contact: Option<EmergencyContact>,
    pub allergies: Vec<String>,
    pub chronic_conditions: Vec<String>,
    pub current_medications: Vec<MedicationEntry>,
    pub past_surgeries: Vec<PastSurgery>,
}

/// Persist the onboarding form onto the caller's own patient row and mark
/// them onboarded. Only the patient themselves may do this.
pub fn save_onboarding(
    conn: &Connection,
    caller: &CallerIdentity,
    patient_id: &Uuid,
    data: OnboardingData,
) -> Result<(), ServiceError> {
    if caller.id != *patient_id {
        return Err(ServiceError::Unauthorized);
    }

    let personal_details = PersonalDetails {
        dob: data.dob,
        gender: data.gender.as_deref().and_then(parse_gender),
        blood_type: data.blood_type,
        emergency_contact: data.emergency_contact,
    };
    let medical_profile = MedicalProfile {
        allergies: data.allergies,
        chronic_conditions: data.chronic_conditions,
        current_meds: data.current_medications,
        past_surgeries: data.past_surgeries,
    };

    let updated = update_patient_profile(
        conn,
        patient_id,
        &data.full_name,
        &personal_details,
        &medical_profile,
        Utc::now(),
    )?;
    if !updated {
        return Err(ServiceError::PatientNotFound);
    }

    info!(patient_id = %patient_id, "onboarding saved");
    Ok(())
}

/// Resolve the caller's doctor record, creating one on first sight of the
/// anonymous identity. Registered (non-anonymous) callers are patients and
/// never get a doctor row.
pub fn register_doctor(
    conn: &Connection,
    caller: &CallerIdentity,
) -> Result<Doctor, ServiceError> {
    if !caller.is_anonymous {
        return Err(ServiceError::InvalidDoctor);
    }

    if let Some(doctor) = get_doctor_by_anonymous_id(conn, &caller.id)? {
        return Ok(doctor);
    }

    let doctor = Doctor {
        id: Uuid::new_v4(),
        anonymous_id: Some(caller.id),
        display_name: None,
        specialty: None,
        created_at: Utc::now(),
    };
    insert_doctor(conn, &doctor)?;
    info!(doctor_id = %doctor.id, "doctor record created");
    Ok(doctor)
}

/// Set the doctor's display name and specialty, once. A second call is a
/// no-op so a stale form resubmission cannot overwrite the profile.
pub fn complete_doctor_profile(
    conn: &Connection,
    caller: &CallerIdentity,
    doctor_id: &Uuid,
    display_name: &str,
    specialty: Option<&str>,
) -> Result<(), ServiceError> {
    let doctor = get_doctor(conn, doctor_id)?.ok_or(ServiceError::InvalidDoctor)?;
    if doctor.anonymous_id != Some(caller.id) {
        return Err(ServiceError::InvalidDoctor);
    }

    if doctor.display_name.is_some() {
        return Ok(());
    }

    update_doctor_profile(conn, doctor_id, display_name, specialty)?;
    Ok(())
}

/// Map a submitted gender string onto the stored vocabulary. Unknown
/// values are dropped rather than rejected.
fn parse_gender(raw: &str) -> Option<Gender> {
    let normalized = raw.trim().to_lowercase().replace(' ', "_");
    Gender::from_str(&normalized).ok()
}
