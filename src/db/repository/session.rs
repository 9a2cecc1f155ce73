use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Session, SessionStatus};

use super::{parse_json, parse_opt_uuid, parse_timestamp, parse_uuid, to_json};

pub fn insert_session(conn: &Connection, session: &Session) -> Result<(), DatabaseError> {
    let snapshot = session
        .health_snapshot
        .as_ref()
        .map(to_json)
        .transpose()?;
    conn.execute(
        "INSERT INTO sessions (id, patient_id, created_by_doctor_id, status, health_snapshot, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            session.id.to_string(),
            session.patient_id.to_string(),
            session.created_by_doctor_id.map(|id| id.to_string()),
            session.status.as_str(),
            snapshot,
            session.created_at.to_rfc3339(),
            session.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_session(conn: &Connection, id: &Uuid) -> Result<Option<Session>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, patient_id, created_by_doctor_id, status, health_snapshot, created_at, updated_at
         FROM sessions WHERE id = ?1",
        params![id.to_string()],
        session_row,
    );

    match result {
        Ok(row) => Ok(Some(session_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_sessions_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Session>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, created_by_doctor_id, status, health_snapshot, created_at, updated_at
         FROM sessions WHERE patient_id = ?1 ORDER BY created_at DESC",
    )?;

    let rows = stmt.query_map(params![patient_id.to_string()], session_row)?;

    let mut sessions = Vec::new();
    for row in rows {
        sessions.push(session_from_row(row?)?);
    }
    Ok(sessions)
}

/// Flip the session status. The snapshot column is deliberately not
/// touchable here — it is written once at insert.
pub fn set_session_status(
    conn: &Connection,
    id: &Uuid,
    status: &SessionStatus,
    updated_at: DateTime<Utc>,
) -> Result<bool, DatabaseError> {
    let rows = conn.execute(
        "UPDATE sessions SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), updated_at.to_rfc3339(), id.to_string()],
    )?;
    Ok(rows > 0)
}

struct SessionRow {
    id: String,
    patient_id: String,
    created_by_doctor_id: Option<String>,
    status: String,
    health_snapshot: Option<String>,
    created_at: String,
    updated_at: String,
}

fn session_row(row: &Row<'_>) -> rusqlite::Result<SessionRow> {
    Ok(SessionRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        created_by_doctor_id: row.get(2)?,
        status: row.get(3)?,
        health_snapshot: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn session_from_row(row: SessionRow) -> Result<Session, DatabaseError> {
    Ok(Session {
        id: parse_uuid(&row.id)?,
        patient_id: parse_uuid(&row.patient_id)?,
        created_by_doctor_id: parse_opt_uuid(row.created_by_doctor_id.as_deref())?,
        status: SessionStatus::from_str(&row.status)?,
        health_snapshot: row
            .health_snapshot
            .as_deref()
            .map(parse_json)
            .transpose()?,
        created_at: parse_timestamp(&row.created_at)?,
        updated_at: parse_timestamp(&row.updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::insert_patient;
    use crate::db::sqlite::open_memory_database;
    use crate::models::{HealthSnapshot, MedicalProfile, Patient, PersonalDetails};

    fn seeded_patient(conn: &Connection) -> Patient {
        let now = Utc::now();
        let patient = Patient {
            id: Uuid::new_v4(),
            full_name: Some("Asha".to_string()),
            onboarded: true,
            personal_details: PersonalDetails::default(),
            medical_profile: MedicalProfile {
                allergies: vec!["Penicillin".to_string()],
                ..MedicalProfile::default()
            },
            created_at: now,
            updated_at: now,
        };
        insert_patient(conn, &patient).unwrap();
        patient
    }

    fn sample_session(patient: &Patient) -> Session {
        let now = Utc::now();
        Session {
            id: Uuid::new_v4(),
            patient_id: patient.id,
            created_by_doctor_id: None,
            status: SessionStatus::Active,
            health_snapshot: Some(HealthSnapshot::capture(patient, now)),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn insert_and_get_with_snapshot() {
        let conn = open_memory_database().unwrap();
        let patient = seeded_patient(&conn);
        let session = sample_session(&patient);
        insert_session(&conn, &session).unwrap();

        let loaded = get_session(&conn, &session.id).unwrap().unwrap();
        assert_eq!(loaded.status, SessionStatus::Active);
        let snapshot = loaded.health_snapshot.unwrap();
        assert_eq!(snapshot.allergies, vec!["Penicillin"]);
    }

    #[test]
    fn insert_rejects_unknown_patient() {
        let conn = open_memory_database().unwrap();
        let now = Utc::now();
        let orphan = Session {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            created_by_doctor_id: None,
            status: SessionStatus::Active,
            health_snapshot: None,
            created_at: now,
            updated_at: now,
        };
        assert!(insert_session(&conn, &orphan).is_err());
    }

    #[test]
    fn status_update_does_not_touch_snapshot() {
        let conn = open_memory_database().unwrap();
        let patient = seeded_patient(&conn);
        let session = sample_session(&patient);
        insert_session(&conn, &session).unwrap();

        let changed =
            set_session_status(&conn, &session.id, &SessionStatus::Closed, Utc::now()).unwrap();
        assert!(changed);

        let loaded = get_session(&conn, &session.id).unwrap().unwrap();
        assert_eq!(loaded.status, SessionStatus::Closed);
        assert_eq!(
            loaded.health_snapshot.unwrap().allergies,
            vec!["Penicillin"]
        );
    }

    #[test]
    fn list_for_patient_most_recent_first() {
        let conn = open_memory_database().unwrap();
        let patient = seeded_patient(&conn);

        let mut first = sample_session(&patient);
        first.created_at = "2026-01-01T00:00:00Z".parse().unwrap();
        let mut second = sample_session(&patient);
        second.created_at = "2026-02-01T00:00:00Z".parse().unwrap();
        insert_session(&conn, &first).unwrap();
        insert_session(&conn, &second).unwrap();

        let sessions = list_sessions_for_patient(&conn, &patient.id).unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, second.id);
    }
}
