//! Service-level error taxonomy.
//!
//! Authorization and not-found outcomes are returned as typed results so
//! the presentation layer can redirect or render inline; persistence
//! failures carry the store error for logging but surface to users as a
//! generic retry prompt.

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Identity, role, or membership check failed.
    #[error("Unauthorized")]
    Unauthorized,

    /// Doctor record missing, or its linked identity does not match the caller.
    #[error("Invalid doctor")]
    InvalidDoctor,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Session not found")]
    SessionNotFound,

    /// Referral code does not resolve within the given session.
    #[error("Invalid referral code")]
    InvalidReferralCode,

    #[error("Store operation failed: {0}")]
    Persistence(#[from] DatabaseError),
}

impl ServiceError {
    /// User-facing text. Store internals stay in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            ServiceError::Unauthorized => "You do not have access to this session",
            ServiceError::InvalidDoctor => "Invalid doctor",
            ServiceError::PatientNotFound => "Patient not found",
            ServiceError::SessionNotFound => "Session not found",
            ServiceError::InvalidReferralCode => "Invalid referral code",
            ServiceError::Persistence(_) => "Something went wrong. Please try again.",
        }
    }
}
