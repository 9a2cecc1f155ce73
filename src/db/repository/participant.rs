use std::str::FromStr;

use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{ParticipantRole, SessionParticipant};

use super::{parse_opt_uuid, parse_timestamp, parse_uuid};

/// A participant row joined with its doctor's identity linkage.
///
/// This is the join-then-compare unit used by every doctor authorization
/// check: the caller's identity is compared against `anonymous_id`, never
/// against a client-supplied sender id alone.
#[derive(Debug, Clone)]
pub struct ParticipantIdentity {
    pub participant_id: Uuid,
    pub doctor_id: Uuid,
    pub anonymous_id: Option<Uuid>,
    pub display_name: Option<String>,
}

pub fn insert_participant(
    conn: &Connection,
    participant: &SessionParticipant,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO session_participants (id, session_id, doctor_id, role, joined_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            participant.id.to_string(),
            participant.session_id.to_string(),
            participant.doctor_id.to_string(),
            participant.role.as_str(),
            participant.joined_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_participant(
    conn: &Connection,
    session_id: &Uuid,
    doctor_id: &Uuid,
) -> Result<Option<SessionParticipant>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, session_id, doctor_id, role, joined_at
         FROM session_participants WHERE session_id = ?1 AND doctor_id = ?2",
        params![session_id.to_string(), doctor_id.to_string()],
        participant_row,
    );

    match result {
        Ok(row) => Ok(Some(participant_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Fetch the participant together with the linked doctor identity, as a
/// single optional value (one-to-one join normalized at this boundary).
pub fn get_participant_identity(
    conn: &Connection,
    session_id: &Uuid,
    doctor_id: &Uuid,
) -> Result<Option<ParticipantIdentity>, DatabaseError> {
    let result = conn.query_row(
        "SELECT p.id, p.doctor_id, d.anonymous_id, d.display_name
         FROM session_participants p
         JOIN doctors d ON d.id = p.doctor_id
         WHERE p.session_id = ?1 AND p.doctor_id = ?2",
        params![session_id.to_string(), doctor_id.to_string()],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        },
    );

    match result {
        Ok((participant_id, doctor_id, anonymous_id, display_name)) => {
            Ok(Some(ParticipantIdentity {
                participant_id: parse_uuid(&participant_id)?,
                doctor_id: parse_uuid(&doctor_id)?,
                anonymous_id: parse_opt_uuid(anonymous_id.as_deref())?,
                display_name,
            }))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_participants(
    conn: &Connection,
    session_id: &Uuid,
) -> Result<Vec<SessionParticipant>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, session_id, doctor_id, role, joined_at
         FROM session_participants WHERE session_id = ?1 ORDER BY joined_at ASC",
    )?;

    let rows = stmt.query_map(params![session_id.to_string()], participant_row)?;

    let mut participants = Vec::new();
    for row in rows {
        participants.push(participant_from_row(row?)?);
    }
    Ok(participants)
}

struct ParticipantRow {
    id: String,
    session_id: String,
    doctor_id: String,
    role: String,
    joined_at: String,
}

fn participant_row(row: &Row<'_>) -> rusqlite::Result<ParticipantRow> {
    Ok(ParticipantRow {
        id: row.get(0)?,
        session_id: row.get(1)?,
        doctor_id: row.get(2)?,
        role: row.get(3)?,
        joined_at: row.get(4)?,
    })
}

fn participant_from_row(row: ParticipantRow) -> Result<SessionParticipant, DatabaseError> {
    Ok(SessionParticipant {
        id: parse_uuid(&row.id)?,
        session_id: parse_uuid(&row.session_id)?,
        doctor_id: parse_uuid(&row.doctor_id)?,
        role: ParticipantRole::from_str(&row.role)?,
        joined_at: parse_timestamp(&row.joined_at)?,
    })
}
