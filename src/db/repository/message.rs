use std::str::FromStr;

use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Message, SenderType};

use super::{parse_json, parse_opt_uuid, parse_timestamp, parse_uuid, to_json};

pub fn insert_message(conn: &Connection, message: &Message) -> Result<(), DatabaseError> {
    let ai_processed = message
        .ai_processed
        .as_ref()
        .map(to_json)
        .transpose()?;
    conn.execute(
        "INSERT INTO messages (id, session_id, sender_type, sender_id, message_type, content, ai_processed, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            message.id.to_string(),
            message.session_id.to_string(),
            message.sender_type.as_str(),
            message.sender_id.map(|id| id.to_string()),
            message.content.kind().as_str(),
            to_json(&message.content)?,
            ai_processed,
            message.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// All messages of a session in creation order (rowid breaks timestamp
/// ties so the log order is stable).
pub fn get_messages_by_session(
    conn: &Connection,
    session_id: &Uuid,
) -> Result<Vec<Message>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, session_id, sender_type, sender_id, content, ai_processed, created_at
         FROM messages WHERE session_id = ?1 ORDER BY created_at ASC, rowid ASC",
    )?;

    let rows = stmt.query_map(params![session_id.to_string()], message_row)?;

    let mut messages = Vec::new();
    for row in rows {
        messages.push(message_from_row(row?)?);
    }
    Ok(messages)
}

struct MessageRow {
    id: String,
    session_id: String,
    sender_type: String,
    sender_id: Option<String>,
    content: String,
    ai_processed: Option<String>,
    created_at: String,
}

fn message_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        session_id: row.get(1)?,
        sender_type: row.get(2)?,
        sender_id: row.get(3)?,
        content: row.get(4)?,
        ai_processed: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn message_from_row(row: MessageRow) -> Result<Message, DatabaseError> {
    Ok(Message {
        id: parse_uuid(&row.id)?,
        session_id: parse_uuid(&row.session_id)?,
        sender_type: SenderType::from_str(&row.sender_type)?,
        sender_id: parse_opt_uuid(row.sender_id.as_deref())?,
        content: parse_json(&row.content)?,
        ai_processed: row.ai_processed.as_deref().map(parse_json).transpose()?,
        created_at: parse_timestamp(&row.created_at)?,
    })
}
