use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{MedicalProfile, Patient, PersonalDetails};

use super::{parse_json, parse_timestamp, parse_uuid, to_json};

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, full_name, onboarded, personal_details, medical_profile, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            patient.id.to_string(),
            patient.full_name,
            patient.onboarded,
            to_json(&patient.personal_details)?,
            to_json(&patient.medical_profile)?,
            patient.created_at.to_rfc3339(),
            patient.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, full_name, onboarded, personal_details, medical_profile, created_at, updated_at
         FROM patients WHERE id = ?1",
        params![id.to_string()],
        |row| {
            Ok(PatientRow {
                id: row.get(0)?,
                full_name: row.get(1)?,
                onboarded: row.get(2)?,
                personal_details: row.get(3)?,
                medical_profile: row.get(4)?,
                created_at: row.get(5)?,
                updated_at: row.get(6)?,
            })
        },
    );

    match result {
        Ok(row) => Ok(Some(patient_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Overwrite the patient's profile blocks and mark them onboarded.
/// Returns false when no such patient exists.
pub fn update_patient_profile(
    conn: &Connection,
    id: &Uuid,
    full_name: &str,
    personal_details: &PersonalDetails,
    medical_profile: &MedicalProfile,
    updated_at: DateTime<Utc>,
) -> Result<bool, DatabaseError> {
    let rows = conn.execute(
        "UPDATE patients
         SET full_name = ?1, personal_details = ?2, medical_profile = ?3, onboarded = 1, updated_at = ?4
         WHERE id = ?5",
        params![
            full_name,
            to_json(personal_details)?,
            to_json(medical_profile)?,
            updated_at.to_rfc3339(),
            id.to_string(),
        ],
    )?;
    Ok(rows > 0)
}

struct PatientRow {
    id: String,
    full_name: Option<String>,
    onboarded: bool,
    personal_details: String,
    medical_profile: String,
    created_at: String,
    updated_at: String,
}

fn patient_from_row(row: PatientRow) -> Result<Patient, DatabaseError> {
    Ok(Patient {
        id: parse_uuid(&row.id)?,
        full_name: row.full_name,
        onboarded: row.onboarded,
        personal_details: parse_json(&row.personal_details)?,
        medical_profile: parse_json(&row.medical_profile)?,
        created_at: parse_timestamp(&row.created_at)?,
        updated_at: parse_timestamp(&row.updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::{EmergencyContact, MedicationEntry};
    use chrono::NaiveDate;

    fn sample_patient() -> Patient {
        let now = Utc::now();
        Patient {
            id: Uuid::new_v4(),
            full_name: Some("Asha Verma".to_string()),
            onboarded: false,
            personal_details: PersonalDetails {
                dob: NaiveDate::from_ymd_opt(1988, 6, 15),
                gender: None,
                blood_type: None,
                emergency_contact: None,
            },
            medical_profile: MedicalProfile::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn insert_and_get_round_trip() {
        let conn = open_memory_database().unwrap();
        let patient = sample_patient();
        insert_patient(&conn, &patient).unwrap();

        let loaded = get_patient(&conn, &patient.id).unwrap().unwrap();
        assert_eq!(loaded.id, patient.id);
        assert_eq!(loaded.full_name.as_deref(), Some("Asha Verma"));
        assert!(!loaded.onboarded);
        assert_eq!(
            loaded.personal_details.dob,
            NaiveDate::from_ymd_opt(1988, 6, 15)
        );
        assert!(loaded.medical_profile.allergies.is_empty());
    }

    #[test]
    fn get_missing_patient_is_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_patient(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn update_profile_sets_onboarded() {
        let conn = open_memory_database().unwrap();
        let patient = sample_patient();
        insert_patient(&conn, &patient).unwrap();

        let details = PersonalDetails {
            dob: patient.personal_details.dob,
            gender: None,
            blood_type: None,
            emergency_contact: Some(EmergencyContact {
                name: "Ravi".to_string(),
                phone: "+91-98".to_string(),
                relationship: "spouse".to_string(),
            }),
        };
        let profile = MedicalProfile {
            allergies: vec!["Penicillin".to_string()],
            chronic_conditions: vec![],
            current_meds: vec![MedicationEntry {
                name: "Amlodipine".to_string(),
                dosage: Some("5mg".to_string()),
                frequency: None,
            }],
            past_surgeries: vec![],
        };

        let updated =
            update_patient_profile(&conn, &patient.id, "Asha V.", &details, &profile, Utc::now())
                .unwrap();
        assert!(updated);

        let loaded = get_patient(&conn, &patient.id).unwrap().unwrap();
        assert!(loaded.onboarded);
        assert_eq!(loaded.full_name.as_deref(), Some("Asha V."));
        assert_eq!(loaded.medical_profile.allergies, vec!["Penicillin"]);
        assert_eq!(loaded.medical_profile.current_meds.len(), 1);
    }

    #[test]
    fn update_missing_patient_returns_false() {
        let conn = open_memory_database().unwrap();
        let updated = update_patient_profile(
            &conn,
            &Uuid::new_v4(),
            "Nobody",
            &PersonalDetails::default(),
            &MedicalProfile::default(),
            Utc::now(),
        )
        .unwrap();
        assert!(!updated);
    }
}
