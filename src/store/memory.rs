//! In-memory appointment store.

use tracing::debug;

use super::{AppointmentStore, StoreError, StoreResult};
use crate::models::{Appointment, AppointmentId};

/// Keeps appointments in a `Vec`.
///
/// Can be switched offline with [`MemoryStore::set_available`] to exercise
/// store-failure paths.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    appointments: Vec<Appointment>,
    available: bool,
}

impl MemoryStore {
    /// Creates an empty, available store.
    pub fn new() -> Self {
        Self {
            appointments: Vec::new(),
            available: true,
        }
    }

    /// Creates a store pre-loaded with `appointments`, bypassing any checks.
    pub fn with_appointments(appointments: Vec<Appointment>) -> Self {
        Self {
            appointments,
            available: true,
        }
    }

    /// Toggles simulated availability.
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.available {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store is offline".to_string()))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AppointmentStore for MemoryStore {
    fn initialize_schema(&mut self) -> StoreResult<()> {
        self.ensure_available()
    }

    fn insert(&mut self, appointment: &Appointment) -> StoreResult<()> {
        self.ensure_available()?;
        self.appointments.push(appointment.clone());
        debug!(id = %appointment.id(), total = self.appointments.len(), "memory insert");
        Ok(())
    }

    fn fetch_all(&self) -> StoreResult<Vec<Appointment>> {
        self.ensure_available()?;
        Ok(self.appointments.clone())
    }

    fn delete(&mut self, id: AppointmentId) -> StoreResult<bool> {
        self.ensure_available()?;
        match self.appointments.iter().position(|a| a.id() == id) {
            Some(pos) => {
                self.appointments.remove(pos);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn close(&mut self) -> StoreResult<()> {
        self.available = false;
        Ok(())
    }
}
