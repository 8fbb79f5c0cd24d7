//! Scheduler error types.

use thiserror::Error;

use crate::models::{Appointment, AppointmentError};
use crate::store::StoreError;
use crate::validation::ValidationError;

/// Result type for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Errors surfaced by [`crate::scheduler::Scheduler`].
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The candidate overlaps an existing appointment for the same provider.
    /// Report to the user; do not retry.
    #[error("appointment time conflicts with an existing appointment for {provider}: {existing}")]
    Conflict {
        provider: String,
        existing: Box<Appointment>,
    },

    /// The store failed. Never retried here; the caller decides.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Booking input failed boundary validation.
    #[error("invalid booking: {}", join_messages(.0))]
    Invalid(Vec<ValidationError>),

    /// The appointment itself could not be built.
    #[error(transparent)]
    Appointment(#[from] AppointmentError),
}

impl SchedulerError {
    /// Whether this is a double-booking rejection.
    pub fn is_conflict(&self) -> bool {
        matches!(self, SchedulerError::Conflict { .. })
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
