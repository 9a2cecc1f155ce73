use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Doctor;

use super::{parse_opt_uuid, parse_timestamp, parse_uuid};

pub fn insert_doctor(conn: &Connection, doctor: &Doctor) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO doctors (id, anonymous_id, display_name, specialty, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            doctor.id.to_string(),
            doctor.anonymous_id.map(|id| id.to_string()),
            doctor.display_name,
            doctor.specialty,
            doctor.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_doctor(conn: &Connection, id: &Uuid) -> Result<Option<Doctor>, DatabaseError> {
    query_single(
        conn,
        "SELECT id, anonymous_id, display_name, specialty, created_at
         FROM doctors WHERE id = ?1",
        &id.to_string(),
    )
}

/// Look up a doctor by the anonymous identity-provider subject linked to it.
pub fn get_doctor_by_anonymous_id(
    conn: &Connection,
    anonymous_id: &Uuid,
) -> Result<Option<Doctor>, DatabaseError> {
    query_single(
        conn,
        "SELECT id, anonymous_id, display_name, specialty, created_at
         FROM doctors WHERE anonymous_id = ?1",
        &anonymous_id.to_string(),
    )
}

/// Set display name and specialty. Returns false when no such doctor exists.
pub fn update_doctor_profile(
    conn: &Connection,
    id: &Uuid,
    display_name: &str,
    specialty: Option<&str>,
) -> Result<bool, DatabaseError> {
    let rows = conn.execute(
        "UPDATE doctors SET display_name = ?1, specialty = ?2 WHERE id = ?3",
        params![display_name, specialty, id.to_string()],
    )?;
    Ok(rows > 0)
}

fn query_single(
    conn: &Connection,
    sql: &str,
    key: &str,
) -> Result<Option<Doctor>, DatabaseError> {
    let result = conn.query_row(sql, params![key], doctor_row);

    match result {
        Ok(row) => Ok(Some(doctor_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

struct DoctorRow {
    id: String,
    anonymous_id: Option<String>,
    display_name: Option<String>,
    specialty: Option<String>,
    created_at: String,
}

fn doctor_row(row: &Row<'_>) -> rusqlite::Result<DoctorRow> {
    Ok(DoctorRow {
        id: row.get(0)?,
        anonymous_id: row.get(1)?,
        display_name: row.get(2)?,
        specialty: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn doctor_from_row(row: DoctorRow) -> Result<Doctor, DatabaseError> {
    Ok(Doctor {
        id: parse_uuid(&row.id)?,
        anonymous_id: parse_opt_uuid(row.anonymous_id.as_deref())?,
        display_name: row.display_name,
        specialty: row.specialty,
        created_at: parse_timestamp(&row.created_at)?,
    })
}
