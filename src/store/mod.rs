//! Appointment persistence.
//!
//! The scheduler talks to storage only through [`AppointmentStore`], so the
//! backend can be swapped without touching the booking logic.
//!
//! | Store | Backing | Use |
//! |-------|---------|-----|
//! | [`MemoryStore`] | `Vec` in process | tests, throwaway sessions |
//! | [`SqliteStore`] | SQLite file via `rusqlite` | the CLI, anything durable |
//!
//! Stores return rows unordered; ordering is the scheduler's job.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use thiserror::Error;

use crate::models::{Appointment, AppointmentId};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend cannot be reached (closed handle, simulated outage).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// SQLite driver error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A persisted row could not be decoded back into an appointment.
    #[error("corrupt record: invalid {field} '{value}'")]
    Corrupt { field: &'static str, value: String },
}

/// Storage collaborator for the scheduler.
///
/// Implementations treat each call as atomic. They do not validate or
/// order appointments.
pub trait AppointmentStore {
    /// Idempotent schema setup. Called once at startup.
    fn initialize_schema(&mut self) -> StoreResult<()>;

    /// Persists one appointment.
    fn insert(&mut self, appointment: &Appointment) -> StoreResult<()>;

    /// Every stored appointment, in no particular order.
    fn fetch_all(&self) -> StoreResult<Vec<Appointment>>;

    /// Deletes the appointment with `id`. Returns whether a row was removed.
    fn delete(&mut self, id: AppointmentId) -> StoreResult<bool>;

    /// Inserts `appointment` unless `blocker` finds a reason not to.
    ///
    /// `blocker` sees the current contents and returns the appointment that
    /// prevents the insert, if any. The check and the insert form one unit:
    /// backends shared between processes must override this so no other
    /// writer can slip in between.
    fn insert_unless(
        &mut self,
        appointment: &Appointment,
        blocker: &dyn Fn(&[Appointment]) -> Option<Appointment>,
    ) -> StoreResult<Option<Appointment>> {
        let existing = self.fetch_all()?;
        if let Some(blocking) = blocker(existing.as_slice()) {
            return Ok(Some(blocking));
        }
        self.insert(appointment)?;
        Ok(None)
    }

    /// Releases the backend. Further calls fail with [`StoreError::Unavailable`].
    fn close(&mut self) -> StoreResult<()> {
        Ok(())
    }
}
