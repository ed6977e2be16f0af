//! Rental domain errors

use thiserror::Error;

use core_kernel::{MoneyError, PortError};

/// Errors that can occur in the rental domain
#[derive(Debug, Error)]
pub enum RentalError {
    /// Entity is missing or belongs to another account
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The current user's role does not allow the operation
    #[error("User {user} is not allowed to {action}")]
    Forbidden { user: String, action: String },

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation conflicts with related records
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error(transparent)]
    Store(#[from] PortError),
}

impl RentalError {
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        RentalError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        RentalError::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        RentalError::Conflict(message.into())
    }

    pub fn invalid_transition(from: impl std::fmt::Display, to: impl std::fmt::Display) -> Self {
        RentalError::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}
