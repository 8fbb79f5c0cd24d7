//! Canonical appointment ordering.
//!
//! # Order
//! 1. `start` ascending
//! 2. `duration_minutes` ascending
//!
//! The sort is stable: appointments with equal keys keep their input order.
//! The same order defines the index space for positional removal.

use std::cmp::Ordering;

use crate::models::Appointment;

/// Compares two appointments by start time, then by duration.
#[inline]
pub fn compare_appointments(a: &Appointment, b: &Appointment) -> Ordering {
    a.start()
        .cmp(&b.start())
        .then_with(|| a.duration_minutes().cmp(&b.duration_minutes()))
}

/// Returns `appointments` in canonical order.
pub fn sort_appointments(mut appointments: Vec<Appointment>) -> Vec<Appointment> {
    appointments.sort_by(compare_appointments);
    appointments
}

/// Whether `appointments` is already in canonical order.
pub fn is_sorted(appointments: &[Appointment]) -> bool {
    appointments
        .windows(2)
        .all(|w| compare_appointments(&w[0], &w[1]) != Ordering::Greater)
}
