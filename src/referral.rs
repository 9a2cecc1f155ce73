//! Referral issuance.
//!
//! A participant doctor mints a short code scoped to one session. The
//! code travels out-of-band (QR or link) and is redeemed through
//! [`crate::session::add_doctor_to_session`]. Codes are not globally
//! unique; the (session, code) pair is.

use chrono::Utc;
use rand::Rng;
use rusqlite::Connection;
use tracing::info;
use uuid::Uuid;

use crate::db::repository::{get_participant_identity, get_session, insert_message, insert_referral};
use crate::error::ServiceError;
use crate::feed::MessageFeed;
use crate::identity::CallerIdentity;
use crate::models::{Message, MessageContent, Referral, ReferralStatus, SenderType};

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LENGTH: usize = 6;

/// A fresh 6-character uppercase alphanumeric code.
pub fn generate_referral_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// The link a specialist follows to land on the session with the code
/// attached.
pub fn redemption_url(base: &str, patient_id: &Uuid, session_id: &Uuid, code: &str) -> String {
    format!(
        "{}/{}/{}?ref={}",
        base.trim_end_matches('/'),
        patient_id,
        session_id,
        code
    )
}

/// Issue a referral out of a session.
///
/// The issuing doctor must already be a participant, verified against the
/// caller's identity. On success the pending referral row is written and a
/// `referral` message carrying the code and redemption URL is appended to
/// the transcript.
pub fn create_referral(
    conn: &Connection,
    feed: &MessageFeed,
    caller: &CallerIdentity,
    session_id: &Uuid,
    doctor_id: &Uuid,
    target_specialty: Option<&str>,
    notes: Option<&str>,
) -> Result<Message, ServiceError> {
    let session = get_session(conn, session_id)?.ok_or(ServiceError::SessionNotFound)?;

    let identity = get_participant_identity(conn, session_id, doctor_id)?
        .ok_or(ServiceError::Unauthorized)?;
    if identity.anonymous_id != Some(caller.id) {
        return Err(ServiceError::Unauthorized);
    }

    let now = Utc::now();
    let referral = Referral {
        id: Uuid::new_v4(),
        session_id: *session_id,
        created_by_doctor_id: Some(*doctor_id),
        referral_code: generate_referral_code(),
        target_specialty: target_specialty.map(str::to_string),
        notes: notes.map(str::to_string),
        status: ReferralStatus::Pending,
        accepted_by_doctor_id: None,
        created_at: now,
        accepted_at: None,
    };
    insert_referral(conn, &referral)?;

    let qr_data = redemption_url(
        &crate::config::base_url(),
        &session.patient_id,
        session_id,
        &referral.referral_code,
    );

    let message = Message {
        id: Uuid::new_v4(),
        session_id: *session_id,
        sender_type: SenderType::Doctor,
        sender_id: Some(*doctor_id),
        content: MessageContent::Referral {
            referral_id: referral.id,
            referral_code: referral.referral_code.clone(),
            target_specialty: referral.target_specialty.clone(),
            notes: referral.notes.clone(),
            qr_data,
        },
        ai_processed: None,
        created_at: now,
    };
    insert_message(conn, &message)?;
    feed.publish(&message);

    info!(
        session_id = %session_id,
        referral_id = %referral.id,
        specialty = ?target_specialty,
        "referral issued"
    );

    Ok(message)
}
