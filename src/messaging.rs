//! Message authorization and the append path.
//!
//! Every send resolves the session first, then authorizes the sender
//! against it. Patients must own the session; doctors are checked by
//! joining their participant row to the doctor's linked identity and
//! comparing that identity to the caller. The client-supplied sender id
//! is never trusted on its own.

use chrono::Utc;
use rusqlite::Connection;
use tracing::warn;
use uuid::Uuid;

use crate::db::repository::{
    get_doctor_by_anonymous_id, get_messages_by_session, get_participant_identity, get_session,
    insert_follow_up_reminder, insert_medicine_todos, insert_message,
};
use crate::db::DatabaseError;
use crate::error::ServiceError;
use crate::feed::MessageFeed;
use crate::identity::CallerIdentity;
use crate::models::{
    FollowUpReminder, MedicineTodo, Message, MessageContent, SenderType, Session, SystemEvent,
    VoiceAiProcessed,
};

/// Append a message to a session on behalf of the caller.
///
/// Voice messages with an AI block additionally fan out medicine todos
/// and follow-up reminders after the message row is committed. Those
/// inserts are best effort: a failure is logged and the send still
/// succeeds.
#[allow(clippy::too_many_arguments)]
pub fn send_message(
    conn: &Connection,
    feed: &MessageFeed,
    caller: &CallerIdentity,
    session_id: &Uuid,
    sender_id: &Uuid,
    sender_type: SenderType,
    content: MessageContent,
    ai_processed: Option<VoiceAiProcessed>,
) -> Result<Message, ServiceError> {
    let session = get_session(conn, session_id)?.ok_or(ServiceError::SessionNotFound)?;

    authorize_sender(conn, caller, &session, sender_id, sender_type)?;

    let message = Message {
        id: Uuid::new_v4(),
        session_id: *session_id,
        sender_type,
        sender_id: Some(*sender_id),
        content,
        ai_processed,
        created_at: Utc::now(),
    };
    insert_message(conn, &message)?;
    feed.publish(&message);

    if let Some(processed) = &message.ai_processed {
        record_extracted_actions(conn, &session, &message, processed);
    }

    Ok(message)
}

/// Plain text from a patient or a doctor.
pub fn send_text_message(
    conn: &Connection,
    feed: &MessageFeed,
    caller: &CallerIdentity,
    session_id: &Uuid,
    sender_id: &Uuid,
    sender_type: SenderType,
    text: &str,
) -> Result<Message, ServiceError> {
    send_message(
        conn,
        feed,
        caller,
        session_id,
        sender_id,
        sender_type,
        MessageContent::Text {
            text: text.to_string(),
        },
        None,
    )
}

/// A voice note, optionally carrying the AI-processed block. The
/// transcription and detected language are copied into the content so
/// the transcript renders without unpacking the full block.
#[allow(clippy::too_many_arguments)]
pub fn send_voice_message(
    conn: &Connection,
    feed: &MessageFeed,
    caller: &CallerIdentity,
    session_id: &Uuid,
    sender_id: &Uuid,
    sender_type: SenderType,
    audio_url: &str,
    duration_seconds: u32,
    processed: Option<VoiceAiProcessed>,
) -> Result<Message, ServiceError> {
    let content = MessageContent::Voice {
        audio_url: audio_url.to_string(),
        duration_seconds,
        transcription: processed.as_ref().map(|p| p.transcription.clone()),
        language_detected: processed
            .as_ref()
            .filter(|p| !p.language_detected.is_empty())
            .map(|p| p.language_detected.clone()),
    };
    send_message(
        conn,
        feed,
        caller,
        session_id,
        sender_id,
        sender_type,
        content,
        processed,
    )
}

/// The session transcript in insertion order, gated by the same access
/// rules as sending.
pub fn list_messages(
    conn: &Connection,
    caller: &CallerIdentity,
    session_id: &Uuid,
) -> Result<Vec<Message>, ServiceError> {
    let session = get_session(conn, session_id)?.ok_or(ServiceError::SessionNotFound)?;

    if !can_read_session(conn, caller, &session)? {
        return Err(ServiceError::Unauthorized);
    }
    Ok(get_messages_by_session(conn, session_id)?)
}

/// Append a system message. Internal only; system rows have no sender id
/// and bypass caller authorization.
pub(crate) fn append_system_message(
    conn: &Connection,
    feed: &MessageFeed,
    session_id: &Uuid,
    event: SystemEvent,
    actor_name: Option<String>,
    metadata: serde_json::Value,
) -> Result<Message, DatabaseError> {
    let message = Message {
        id: Uuid::new_v4(),
        session_id: *session_id,
        sender_type: SenderType::System,
        sender_id: None,
        content: MessageContent::System {
            event,
            actor_name,
            metadata,
        },
        ai_processed: None,
        created_at: Utc::now(),
    };
    insert_message(conn, &message)?;
    feed.publish(&message);
    Ok(message)
}

fn authorize_sender(
    conn: &Connection,
    caller: &CallerIdentity,
    session: &Session,
    sender_id: &Uuid,
    sender_type: SenderType,
) -> Result<(), ServiceError> {
    match sender_type {
        SenderType::Patient => {
            if caller.id != session.patient_id || *sender_id != session.patient_id {
                return Err(ServiceError::Unauthorized);
            }
            Ok(())
        }
        SenderType::Doctor => {
            let identity = get_participant_identity(conn, &session.id, sender_id)?
                .ok_or(ServiceError::Unauthorized)?;
            if identity.anonymous_id != Some(caller.id) {
                return Err(ServiceError::Unauthorized);
            }
            Ok(())
        }
        // System rows are appended internally, never on behalf of a caller.
        SenderType::System => Err(ServiceError::Unauthorized),
    }
}

/// Can the caller read this session's transcript? True for the owning
/// patient and for any doctor participant linked to the caller.
fn can_read_session(
    conn: &Connection,
    caller: &CallerIdentity,
    session: &Session,
) -> Result<bool, ServiceError> {
    if caller.id == session.patient_id {
        return Ok(true);
    }
    let doctor = get_doctor_by_anonymous_id(conn, &caller.id)?;
    match doctor {
        Some(doctor) => Ok(get_participant_identity(conn, &session.id, &doctor.id)?.is_some()),
        None => Ok(false),
    }
}

/// Turn the AI block of a committed voice message into medicine todos and
/// a follow-up reminder. Failures are logged, never propagated.
fn record_extracted_actions(
    conn: &Connection,
    session: &Session,
    message: &Message,
    processed: &VoiceAiProcessed,
) {
    let now = Utc::now();

    if !processed.entities.medicines.is_empty() {
        let todos: Vec<MedicineTodo> = processed
            .entities
            .medicines
            .iter()
            .map(|medicine| MedicineTodo {
                id: Uuid::new_v4(),
                patient_id: session.patient_id,
                session_id: Some(session.id),
                message_id: Some(message.id),
                medicine_name: medicine.name.clone(),
                dosage: medicine.dosage.clone(),
                frequency: medicine.frequency.clone(),
                duration: medicine.duration.clone(),
                instructions: None,
                is_active: true,
                created_at: now,
            })
            .collect();

        if let Err(e) = insert_medicine_todos(conn, &todos) {
            warn!(
                session_id = %session.id,
                message_id = %message.id,
                error = %e,
                "failed to record medicine todos from voice message"
            );
        }
    }

    if let Some(follow_up) = &processed.entities.follow_up {
        let reminder = FollowUpReminder {
            id: Uuid::new_v4(),
            patient_id: session.patient_id,
            session_id: Some(session.id),
            message_id: Some(message.id),
            reminder_text: follow_up.action.clone(),
            trigger_condition: Some(follow_up.condition.clone()),
            trigger_value: Some(follow_up.timeframe.clone()),
            target_doctor_name: processed
                .entities
                .referral
                .as_ref()
                .and_then(|r| r.doctor_name.clone()),
            is_triggered: false,
            created_at: now,
        };

        if let Err(e) = insert_follow_up_reminder(conn, &reminder) {
            warn!(
                session_id = %session.id,
                message_id = %message.id,
                error = %e,
                "failed to record follow-up reminder from voice message"
            );
        }
    }
}
