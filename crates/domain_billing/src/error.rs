//! Billing domain errors

use thiserror::Error;

use core_kernel::{PortError, ReadingId};

/// Errors that can occur in the utility billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// The requested reading does not exist in the supplied series
    #[error("Reading not found: {0}")]
    ReadingNotFound(ReadingId),

    /// No older reading exists to pair the target reading against
    #[error("Previous reading not found for {0}")]
    PreviousReadingNotFound(ReadingId),

    /// Fewer than two readings exist for the billing unit
    #[error("Insufficient readings to bill: found {found}, need at least 2")]
    InsufficientData {
        found: usize,
    },

    /// A reading failed validation before being recorded
    #[error("Invalid reading: {0}")]
    InvalidReading(String),

    /// The record store failed
    #[error(transparent)]
    Store(#[from] PortError),
}

impl BillingError {
    /// True for the "no valid pair exists" family of errors
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            BillingError::PreviousReadingNotFound(_) | BillingError::InsufficientData { .. }
        )
    }
}
