//! Session lifecycle: creation, referral-based admission, and closure.
//!
//! A session is pinned to one patient and carries an immutable health
//! snapshot captured at creation time. Doctors are admitted as
//! participants; the creating doctor is `primary`, anyone redeeming a
//! referral is `referred`. Admission is idempotent per (session, doctor).

use chrono::Utc;
use rusqlite::Connection;
use tracing::error;
use uuid::Uuid;

use crate::db::repository::{
    accept_referral, get_doctor, get_participant, get_patient, get_referral_by_code, get_session,
    insert_participant, insert_session, set_session_status,
};
use crate::error::ServiceError;
use crate::feed::MessageFeed;
use crate::identity::CallerIdentity;
use crate::messaging::append_system_message;
use crate::models::{
    Doctor, HealthSnapshot, ParticipantRole, ReferralStatus, Session, SessionParticipant,
    SessionStatus, SystemEvent,
};

/// Outcome of a doctor's attempt to view a session.
///
/// `Denied` is a navigation outcome, not an error: the caller simply has
/// no standing in this session and no valid code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAccess {
    /// Already a participant.
    Granted,
    /// Admitted just now by redeeming a referral code.
    JoinedViaReferral,
    Denied,
}

/// Create a session between a doctor and a patient.
///
/// The patient's profile is frozen into a health snapshot at this moment;
/// later profile edits never reach the session. The creating doctor is
/// recorded as the `primary` participant, but a failure there is logged
/// and tolerated: a session without its participant row is a legal
/// transient state and the doctor can still be admitted later.
pub fn create_session(
    conn: &Connection,
    feed: &MessageFeed,
    caller: &CallerIdentity,
    patient_id: &Uuid,
    doctor_id: &Uuid,
) -> Result<Uuid, ServiceError> {
    let doctor = require_doctor(conn, caller, doctor_id)?;
    let patient = get_patient(conn, patient_id)?.ok_or(ServiceError::PatientNotFound)?;

    let now = Utc::now();
    let session = Session {
        id: Uuid::new_v4(),
        patient_id: *patient_id,
        created_by_doctor_id: Some(*doctor_id),
        status: SessionStatus::Active,
        health_snapshot: Some(HealthSnapshot::capture(&patient, now)),
        created_at: now,
        updated_at: now,
    };
    insert_session(conn, &session)?;

    let participant = SessionParticipant {
        id: Uuid::new_v4(),
        session_id: session.id,
        doctor_id: *doctor_id,
        role: ParticipantRole::Primary,
        joined_at: now,
    };
    if let Err(e) = insert_participant(conn, &participant) {
        error!(
            session_id = %session.id,
            doctor_id = %doctor_id,
            error = %e,
            "failed to record primary participant at session creation"
        );
    }

    append_system_message(
        conn,
        feed,
        &session.id,
        SystemEvent::SessionCreated,
        Some(doctor.name_or_default()),
        serde_json::json!({
            "doctor_id": doctor_id,
            "patient_id": patient_id,
        }),
    )?;

    Ok(session.id)
}

/// Admit a doctor into a session, optionally by redeeming a referral code.
///
/// A code must resolve within this exact session. An already-accepted
/// referral short-circuits as success. The participant row and the
/// `doctor_joined` message are written only on first admission, so
/// repeated calls converge on one row and one message.
pub fn add_doctor_to_session(
    conn: &Connection,
    feed: &MessageFeed,
    caller: &CallerIdentity,
    session_id: &Uuid,
    doctor_id: &Uuid,
    referral_code: Option<&str>,
) -> Result<(), ServiceError> {
    let doctor = require_doctor(conn, caller, doctor_id)?;

    let mut via_referral = false;
    if let Some(code) = referral_code {
        let normalized = code.trim().to_ascii_uppercase();
        let referral = get_referral_by_code(conn, session_id, &normalized)?
            .ok_or(ServiceError::InvalidReferralCode)?;

        if referral.status == ReferralStatus::Accepted {
            return Ok(());
        }
        accept_referral(conn, &referral.id, doctor_id, Utc::now())?;
        via_referral = true;
    }

    if get_participant(conn, session_id, doctor_id)?.is_some() {
        return Ok(());
    }

    insert_participant(
        conn,
        &SessionParticipant {
            id: Uuid::new_v4(),
            session_id: *session_id,
            doctor_id: *doctor_id,
            role: ParticipantRole::Referred,
            joined_at: Utc::now(),
        },
    )?;

    append_system_message(
        conn,
        feed,
        session_id,
        SystemEvent::DoctorJoined,
        Some(doctor.name_or_default()),
        serde_json::json!({
            "doctor_id": doctor_id,
            "via_referral": via_referral,
        }),
    )?;

    Ok(())
}

/// Decide whether a doctor may view a session, admitting them on the way
/// when they present a valid referral code.
pub fn determine_access(
    conn: &Connection,
    feed: &MessageFeed,
    caller: &CallerIdentity,
    session_id: &Uuid,
    doctor_id: &Uuid,
    referral_code: Option<&str>,
) -> Result<SessionAccess, ServiceError> {
    require_doctor(conn, caller, doctor_id)?;

    if get_participant(conn, session_id, doctor_id)?.is_some() {
        return Ok(SessionAccess::Granted);
    }

    match referral_code {
        Some(code) => {
            match add_doctor_to_session(conn, feed, caller, session_id, doctor_id, Some(code)) {
                Ok(()) => Ok(SessionAccess::JoinedViaReferral),
                Err(ServiceError::InvalidReferralCode) => Ok(SessionAccess::Denied),
                Err(e) => Err(e),
            }
        }
        None => Ok(SessionAccess::Denied),
    }
}

/// Administrative closure. Closed is terminal; closing an already-closed
/// session is a no-op. No core flow invokes this.
pub fn close_session(
    conn: &Connection,
    feed: &MessageFeed,
    session_id: &Uuid,
) -> Result<(), ServiceError> {
    let session = get_session(conn, session_id)?.ok_or(ServiceError::SessionNotFound)?;
    if session.status == SessionStatus::Closed {
        return Ok(());
    }

    set_session_status(conn, session_id, &SessionStatus::Closed, Utc::now())?;
    append_system_message(
        conn,
        feed,
        session_id,
        SystemEvent::SessionClosed,
        None,
        serde_json::Value::Null,
    )?;
    Ok(())
}

/// Resolve the doctor and verify the caller is the identity behind it.
fn require_doctor(
    conn: &Connection,
    caller: &CallerIdentity,
    doctor_id: &Uuid,
) -> Result<Doctor, ServiceError> {
    let doctor = get_doctor(conn, doctor_id)?.ok_or(ServiceError::InvalidDoctor)?;
    if doctor.anonymous_id != Some(caller.id) {
        return Err(ServiceError::InvalidDoctor);
    }
    Ok(doctor)
}
