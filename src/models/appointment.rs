//! Appointment model.
//!
//! An appointment books one patient with one provider for a contiguous
//! slot of minutes. It is a value: once built it never changes. Field
//! formats (name letters, contact digits) are checked at the boundary by
//! [`crate::validation`], not here.

use std::fmt;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TimeSlot;

/// Display format for appointment times (`yyyy-MM-dd HH:mm`).
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Opaque appointment identifier.
///
/// Assigned at construction and used as the delete key, so two
/// appointments with identical fields remain individually addressable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(Uuid);

impl AppointmentId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses the hyphenated string form.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for AppointmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Construction errors for [`Appointment`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppointmentError {
    /// Duration must be at least one minute.
    #[error("appointment duration must be positive, got {0} minutes")]
    NonPositiveDuration(i64),

    /// The slot would end past the last representable time.
    #[error("appointment starting {start} for {minutes} minutes ends out of range")]
    EndOutOfRange { start: NaiveDateTime, minutes: u32 },
}

/// A booked appointment.
///
/// Occupies the half-open slot `[start, start + duration_minutes)` on the
/// provider's calendar. Conflict checks compare slots of appointments
/// sharing the exact same `provider` string.
///
/// Deserialization goes through [`Appointment::new`], so serialized input
/// is held to the same rules as constructed values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAppointment")]
pub struct Appointment {
    id: AppointmentId,
    patient_name: String,
    patient_contact: String,
    provider: String,
    start: NaiveDateTime,
    duration_minutes: u32,
}

impl Appointment {
    /// Creates a new appointment with a freshly generated id.
    ///
    /// Seconds and sub-second parts of `start` are dropped; the scheduler
    /// works at minute precision.
    ///
    /// # Errors
    /// - [`AppointmentError::NonPositiveDuration`] if `duration_minutes <= 0`.
    /// - [`AppointmentError::EndOutOfRange`] if the slot would end past
    ///   `NaiveDateTime::MAX`.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use u_appointment::models::Appointment;
    ///
    /// let start = NaiveDate::from_ymd_opt(2024, 1, 10)
    ///     .unwrap()
    ///     .and_hms_opt(9, 0, 0)
    ///     .unwrap();
    /// let appt = Appointment::new("Jane Doe", "555-123-4567", "Dr. A", start, 30).unwrap();
    /// assert_eq!(
    ///     appt.to_string(),
    ///     "Provider: Dr. A | Patient: Jane Doe | Contact: 555-123-4567 | Duration: 30 minutes | Time: 2024-01-10 09:00"
    /// );
    /// ```
    pub fn new(
        patient_name: impl Into<String>,
        patient_contact: impl Into<String>,
        provider: impl Into<String>,
        start: NaiveDateTime,
        duration_minutes: i64,
    ) -> Result<Self, AppointmentError> {
        let duration_minutes = u32::try_from(duration_minutes)
            .ok()
            .filter(|&d| d > 0)
            .ok_or(AppointmentError::NonPositiveDuration(duration_minutes))?;
        let start = truncate_to_minute(start);
        TimeSlot::checked_from_minutes(start, duration_minutes).ok_or(
            AppointmentError::EndOutOfRange {
                start,
                minutes: duration_minutes,
            },
        )?;

        Ok(Self {
            id: AppointmentId::new(),
            patient_name: patient_name.into(),
            patient_contact: patient_contact.into(),
            provider: provider.into(),
            start,
            duration_minutes,
        })
    }

    /// Replaces the id. Used by stores when rehydrating persisted rows.
    pub fn with_id(mut self, id: AppointmentId) -> Self {
        self.id = id;
        self
    }

    /// Unique identifier.
    #[inline]
    pub fn id(&self) -> AppointmentId {
        self.id
    }

    /// Patient's name.
    pub fn patient_name(&self) -> &str {
        &self.patient_name
    }

    /// Patient's contact number.
    pub fn patient_contact(&self) -> &str {
        &self.patient_contact
    }

    /// Provider the appointment is booked with.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Start time.
    #[inline]
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Duration in minutes (always > 0).
    #[inline]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    /// End time (exclusive).
    pub fn end(&self) -> NaiveDateTime {
        self.slot().end
    }

    /// The slot this appointment occupies.
    pub fn slot(&self) -> TimeSlot {
        TimeSlot::from_minutes(self.start, self.duration_minutes)
    }

    /// Whether this appointment and `other` double-book the same provider.
    pub fn conflicts_with(&self, other: &Self) -> bool {
        self.provider == other.provider && self.slot().overlaps(&other.slot())
    }
}

impl fmt::Display for Appointment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Provider: {} | Patient: {} | Contact: {} | Duration: {} minutes | Time: {}",
            self.provider,
            self.patient_name,
            self.patient_contact,
            self.duration_minutes,
            self.start.format(TIME_FORMAT)
        )
    }
}

/// Wire shape of [`Appointment`], checked on the way in.
#[derive(Deserialize)]
struct RawAppointment {
    id: AppointmentId,
    patient_name: String,
    patient_contact: String,
    provider: String,
    start: NaiveDateTime,
    duration_minutes: i64,
}

impl TryFrom<RawAppointment> for Appointment {
    type Error = AppointmentError;

    fn try_from(raw: RawAppointment) -> Result<Self, Self::Error> {
        Appointment::new(
            raw.patient_name,
            raw.patient_contact,
            raw.provider,
            raw.start,
            raw.duration_minutes,
        )
        .map(|a| a.with_id(raw.id))
    }
}

fn truncate_to_minute(t: NaiveDateTime) -> NaiveDateTime {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}
