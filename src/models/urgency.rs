//! Urgency classification.
//!
//! Buckets an appointment by how far its start lies from "now". Front ends
//! map the buckets to whatever highlighting they use; this crate only
//! decides the bucket.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::Appointment;

/// How soon (or how long ago) an appointment starts relative to a reference time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Urgency {
    /// Starts more than 24 hours from now.
    Upcoming,
    /// Starts within the next 24 hours.
    Soon,
    /// Already started, earlier on the current calendar day.
    Today,
    /// Started before the current calendar day.
    Past,
}

impl Urgency {
    /// Classifies a start time against `now`.
    pub fn classify(start: NaiveDateTime, now: NaiveDateTime) -> Self {
        let until = start - now;
        if until > Duration::hours(24) {
            Urgency::Upcoming
        } else if until > Duration::zero() {
            Urgency::Soon
        } else if start.date() == now.date() {
            Urgency::Today
        } else {
            Urgency::Past
        }
    }

    /// Classifies an appointment against `now`.
    pub fn of(appointment: &Appointment, now: NaiveDateTime) -> Self {
        Self::classify(appointment.start(), now)
    }

    /// Short lowercase label.
    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Upcoming => "upcoming",
            Urgency::Soon => "soon",
            Urgency::Today => "today",
            Urgency::Past => "past",
        }
    }
}
