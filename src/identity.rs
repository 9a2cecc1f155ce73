//! Caller identity, passed explicitly into every core operation.
//!
//! The identity provider issues anonymous subjects for doctors and
//! OAuth-backed ones for patients. Operations never read an ambient
//! "current user"; the resolved identity is an argument, which keeps
//! every authorization check pure and testable.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ServiceError;

/// The authenticated identity behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub id: Uuid,
    pub is_anonymous: bool,
}

impl CallerIdentity {
    /// An anonymous subject (doctors pre-profile-completion).
    pub fn anonymous(id: Uuid) -> Self {
        Self {
            id,
            is_anonymous: true,
        }
    }

    /// A registered, OAuth-backed subject (patients).
    pub fn registered(id: Uuid) -> Self {
        Self {
            id,
            is_anonymous: false,
        }
    }
}

/// Boundary contract to the external identity provider.
pub trait IdentityProvider {
    /// The currently authenticated user, if any.
    fn current_user(&self) -> Option<CallerIdentity>;
}

/// Resolve the caller at the boundary or reject the request.
pub fn require_caller(provider: &dyn IdentityProvider) -> Result<CallerIdentity, ServiceError> {
    provider.current_user().ok_or(ServiceError::Unauthorized)
}
