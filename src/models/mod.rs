//! Appointment domain models.
//!
//! Value types shared by the scheduler, the stores, and the boundary
//! validation layer.
//!
//! | Type | Meaning |
//! |------|---------|
//! | `Appointment` | One booked slot: patient × provider × start × minutes |
//! | `AppointmentId` | Opaque delete key assigned at construction |
//! | `TimeSlot` | Half-open `[start, end)` interval |
//! | `Urgency` | How soon / how overdue an appointment is |

mod appointment;
mod slot;
mod urgency;

pub use appointment::{Appointment, AppointmentError, AppointmentId, TIME_FORMAT};
pub use slot::TimeSlot;
pub use urgency::Urgency;
