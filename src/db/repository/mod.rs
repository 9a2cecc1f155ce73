//! Repository layer — entity-scoped database operations.
//!
//! Each sub-module owns one table family: equality-filtered reads return
//! `Option<T>` (the `.single()` contract), list reads are ordered by
//! creation timestamp. One-to-one joins are normalized to a single typed
//! value here, never at call sites.

mod doctor;
mod message;
mod participant;
mod patient;
mod referral;
mod session;
mod todo;

pub use doctor::*;
pub use message::*;
pub use participant::*;
pub use patient::*;
pub use referral::*;
pub use session::*;
pub use todo::*;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::DatabaseError;

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::MalformedValue(format!("uuid: {e}")))
}

pub(crate) fn parse_opt_uuid(s: Option<&str>) -> Result<Option<Uuid>, DatabaseError> {
    s.map(parse_uuid).transpose()
}

pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| DatabaseError::MalformedValue(format!("timestamp: {e}")))
}

pub(crate) fn parse_opt_timestamp(s: Option<&str>) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    s.map(parse_timestamp).transpose()
}

pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_str(s).map_err(|e| DatabaseError::MalformedValue(format!("json: {e}")))
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<String, DatabaseError> {
    serde_json::to_string(value).map_err(|e| DatabaseError::MalformedValue(format!("json: {e}")))
}
