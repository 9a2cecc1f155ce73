use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{FollowUpReminder, MedicineTodo};

use super::{parse_opt_uuid, parse_timestamp, parse_uuid};

/// Batch-insert medicine todos extracted from one voice message.
pub fn insert_medicine_todos(
    conn: &Connection,
    todos: &[MedicineTodo],
) -> Result<usize, DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT INTO medicine_todos (id, patient_id, session_id, message_id, medicine_name,
                                     dosage, frequency, duration, instructions, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )?;

    for todo in todos {
        stmt.execute(params![
            todo.id.to_string(),
            todo.patient_id.to_string(),
            todo.session_id.map(|id| id.to_string()),
            todo.message_id.map(|id| id.to_string()),
            todo.medicine_name,
            todo.dosage,
            todo.frequency,
            todo.duration,
            todo.instructions,
            todo.is_active,
            todo.created_at.to_rfc3339(),
        ])?;
    }
    Ok(todos.len())
}

pub fn insert_follow_up_reminder(
    conn: &Connection,
    reminder: &FollowUpReminder,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO follow_up_reminders (id, patient_id, session_id, message_id, reminder_text,
                                          trigger_condition, trigger_value, target_doctor_name,
                                          is_triggered, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            reminder.id.to_string(),
            reminder.patient_id.to_string(),
            reminder.session_id.map(|id| id.to_string()),
            reminder.message_id.map(|id| id.to_string()),
            reminder.reminder_text,
            reminder.trigger_condition,
            reminder.trigger_value,
            reminder.target_doctor_name,
            reminder.is_triggered,
            reminder.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Active medicine todos for the patient's medication list, newest first.
pub fn list_medicine_todos_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<MedicineTodo>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, session_id, message_id, medicine_name, dosage, frequency,
                duration, instructions, is_active, created_at
         FROM medicine_todos
         WHERE patient_id = ?1 AND is_active = 1
         ORDER BY created_at DESC",
    )?;

    let rows = stmt.query_map(params![patient_id.to_string()], todo_row)?;

    let mut todos = Vec::new();
    for row in rows {
        todos.push(todo_from_row(row?)?);
    }
    Ok(todos)
}

pub fn list_follow_up_reminders_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<FollowUpReminder>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, session_id, message_id, reminder_text, trigger_condition,
                trigger_value, target_doctor_name, is_triggered, created_at
         FROM follow_up_reminders
         WHERE patient_id = ?1
         ORDER BY created_at DESC",
    )?;

    let rows = stmt.query_map(params![patient_id.to_string()], reminder_row)?;

    let mut reminders = Vec::new();
    for row in rows {
        reminders.push(reminder_from_row(row?)?);
    }
    Ok(reminders)
}

struct TodoRow {
    id: String,
    patient_id: String,
    session_id: Option<String>,
    message_id: Option<String>,
    medicine_name: String,
    dosage: Option<String>,
    frequency: Option<String>,
    duration: Option<String>,
    instructions: Option<String>,
    is_active: bool,
    created_at: String,
}

fn todo_row(row: &Row<'_>) -> rusqlite::Result<TodoRow> {
    Ok(TodoRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        session_id: row.get(2)?,
        message_id: row.get(3)?,
        medicine_name: row.get(4)?,
        dosage: row.get(5)?,
        frequency: row.get(6)?,
        duration: row.get(7)?,
        instructions: row.get(8)?,
        is_active: row.get(9)?,
        created_at: row.get(10)?,
    })
}

fn todo_from_row(row: TodoRow) -> Result<MedicineTodo, DatabaseError> {
    Ok(MedicineTodo {
        id: parse_uuid(&row.id)?,
        patient_id: parse_uuid(&row.patient_id)?,
        session_id: parse_opt_uuid(row.session_id.as_deref())?,
        message_id: parse_opt_uuid(row.message_id.as_deref())?,
        medicine_name: row.medicine_name,
        dosage: row.dosage,
        frequency: row.frequency,
        duration: row.duration,
        instructions: row.instructions,
        is_active: row.is_active,
        created_at: parse_timestamp(&row.created_at)?,
    })
}

struct ReminderRow {
    id: String,
    patient_id: String,
    session_id: Option<String>,
    message_id: Option<String>,
    reminder_text: String,
    trigger_condition: Option<String>,
    trigger_value: Option<String>,
    target_doctor_name: Option<String>,
    is_triggered: bool,
    created_at: String,
}

fn reminder_row(row: &Row<'_>) -> rusqlite::Result<ReminderRow> {
    Ok(ReminderRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        session_id: row.get(2)?,
        message_id: row.get(3)?,
        reminder_text: row.get(4)?,
        trigger_condition: row.get(5)?,
        trigger_value: row.get(6)?,
        target_doctor_name: row.get(7)?,
        is_triggered: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn reminder_from_row(row: ReminderRow) -> Result<FollowUpReminder, DatabaseError> {
    Ok(FollowUpReminder {
        id: parse_uuid(&row.id)?,
        patient_id: parse_uuid(&row.patient_id)?,
        session_id: parse_opt_uuid(row.session_id.as_deref())?,
        message_id: parse_opt_uuid(row.message_id.as_deref())?,
        reminder_text: row.reminder_text,
        trigger_condition: row.trigger_condition,
        trigger_value: row.trigger_value,
        target_doctor_name: row.target_doctor_name,
        is_triggered: row.is_triggered,
        created_at: parse_timestamp(&row.created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::insert_patient;
    use crate::db::sqlite::open_memory_database;
    use crate::models::{MedicalProfile, Patient, PersonalDetails};
    use chrono::Utc;

    fn seeded_patient(conn: &Connection) -> Uuid {
        let now = Utc::now();
        let patient = Patient {
            id: Uuid::new_v4(),
            full_name: None,
            onboarded: false,
            personal_details: PersonalDetails::default(),
            medical_profile: MedicalProfile::default(),
            created_at: now,
            updated_at: now,
        };
        insert_patient(conn, &patient).unwrap();
        patient.id
    }

    fn todo(patient_id: Uuid, name: &str, active: bool) -> MedicineTodo {
        MedicineTodo {
            id: Uuid::new_v4(),
            patient_id,
            session_id: None,
            message_id: None,
            medicine_name: name.to_string(),
            dosage: Some("500mg".to_string()),
            frequency: Some("twice daily".to_string()),
            duration: Some("3 days".to_string()),
            instructions: None,
            is_active: active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn batch_insert_and_list_active() {
        let conn = open_memory_database().unwrap();
        let patient_id = seeded_patient(&conn);

        let todos = vec![
            todo(patient_id, "Paracetamol", true),
            todo(patient_id, "Azithromycin", true),
            todo(patient_id, "Old med", false),
        ];
        assert_eq!(insert_medicine_todos(&conn, &todos).unwrap(), 3);

        let active = list_medicine_todos_for_patient(&conn, &patient_id).unwrap();
        assert_eq!(active.len(), 2);
        assert!(active.iter().all(|t| t.is_active));
    }

    #[test]
    fn empty_batch_is_noop() {
        let conn = open_memory_database().unwrap();
        assert_eq!(insert_medicine_todos(&conn, &[]).unwrap(), 0);
    }

    #[test]
    fn reminder_round_trip() {
        let conn = open_memory_database().unwrap();
        let patient_id = seeded_patient(&conn);

        let reminder = FollowUpReminder {
            id: Uuid::new_v4(),
            patient_id,
            session_id: None,
            message_id: None,
            reminder_text: "Return for review".to_string(),
            trigger_condition: Some("fever persists".to_string()),
            trigger_value: Some("3 days".to_string()),
            target_doctor_name: None,
            is_triggered: false,
            created_at: Utc::now(),
        };
        insert_follow_up_reminder(&conn, &reminder).unwrap();

        let loaded = list_follow_up_reminders_for_patient(&conn, &patient_id).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].reminder_text, "Return for review");
        assert!(!loaded[0].is_triggered);
    }
}
