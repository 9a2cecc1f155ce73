use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Referral, ReferralStatus};

use super::{parse_opt_timestamp, parse_opt_uuid, parse_timestamp, parse_uuid};

pub fn insert_referral(conn: &Connection, referral: &Referral) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO referrals (id, session_id, created_by_doctor_id, referral_code, target_specialty,
                                notes, status, accepted_by_doctor_id, created_at, accepted_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            referral.id.to_string(),
            referral.session_id.to_string(),
            referral.created_by_doctor_id.map(|id| id.to_string()),
            referral.referral_code,
            referral.target_specialty,
            referral.notes,
            referral.status.as_str(),
            referral.accepted_by_doctor_id.map(|id| id.to_string()),
            referral.created_at.to_rfc3339(),
            referral.accepted_at.map(|t| t.to_rfc3339()),
        ],
    )?;
    Ok(())
}

pub fn get_referral(conn: &Connection, id: &Uuid) -> Result<Option<Referral>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, session_id, created_by_doctor_id, referral_code, target_specialty,
                notes, status, accepted_by_doctor_id, created_at, accepted_at
         FROM referrals WHERE id = ?1",
        params![id.to_string()],
        referral_row,
    );

    match result {
        Ok(row) => Ok(Some(referral_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Resolve a code within one session. Codes are scoped by session: the
/// same string in another session never matches.
pub fn get_referral_by_code(
    conn: &Connection,
    session_id: &Uuid,
    code: &str,
) -> Result<Option<Referral>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, session_id, created_by_doctor_id, referral_code, target_specialty,
                notes, status, accepted_by_doctor_id, created_at, accepted_at
         FROM referrals WHERE session_id = ?1 AND referral_code = ?2",
        params![session_id.to_string(), code],
        referral_row,
    );

    match result {
        Ok(row) => Ok(Some(referral_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Mark a referral accepted, recording who redeemed it and when.
pub fn accept_referral(
    conn: &Connection,
    id: &Uuid,
    accepted_by_doctor_id: &Uuid,
    accepted_at: DateTime<Utc>,
) -> Result<bool, DatabaseError> {
    let rows = conn.execute(
        "UPDATE referrals
         SET status = 'accepted', accepted_by_doctor_id = ?1, accepted_at = ?2
         WHERE id = ?3",
        params![
            accepted_by_doctor_id.to_string(),
            accepted_at.to_rfc3339(),
            id.to_string(),
        ],
    )?;
    Ok(rows > 0)
}

struct ReferralRow {
    id: String,
    session_id: String,
    created_by_doctor_id: Option<String>,
    referral_code: String,
    target_specialty: Option<String>,
    notes: Option<String>,
    status: String,
    accepted_by_doctor_id: Option<String>,
    created_at: String,
    accepted_at: Option<String>,
}

fn referral_row(row: &Row<'_>) -> rusqlite::Result<ReferralRow> {
    Ok(ReferralRow {
        id: row.get(0)?,
        session_id: row.get(1)?,
        created_by_doctor_id: row.get(2)?,
        referral_code: row.get(3)?,
        target_specialty: row.get(4)?,
        notes: row.get(5)?,
        status: row.get(6)?,
        accepted_by_doctor_id: row.get(7)?,
        created_at: row.get(8)?,
        accepted_at: row.get(9)?,
    })
}

fn referral_from_row(row: ReferralRow) -> Result<Referral, DatabaseError> {
    Ok(Referral {
        id: parse_uuid(&row.id)?,
        session_id: parse_uuid(&row.session_id)?,
        created_by_doctor_id: parse_opt_uuid(row.created_by_doctor_id.as_deref())?,
        referral_code: row.referral_code,
        target_specialty: row.target_specialty,
        notes: row.notes,
        status: ReferralStatus::from_str(&row.status)?,
        accepted_by_doctor_id: parse_opt_uuid(row.accepted_by_doctor_id.as_deref())?,
        created_at: parse_timestamp(&row.created_at)?,
        accepted_at: parse_opt_timestamp(row.accepted_at.as_deref())?,
    })
}
