//! Conflict detection, canonical ordering, and booking orchestration.
//!
//! # Algorithm
//!
//! Conflict detection is the half-open interval intersection test,
//! scoped per provider. Ordering sorts by start time, then duration,
//! stably. [`Scheduler`] combines both over an [`crate::store::AppointmentStore`].
//!
//! Both `has_conflict` and `sort_appointments` are total functions: they
//! have no failure path.

mod booking;
mod conflict;
mod ordering;

pub use booking::Scheduler;
pub use conflict::{conflicting_pairs, find_conflict, has_conflict};
pub use ordering::{compare_appointments, is_sorted, sort_appointments};
