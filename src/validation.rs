//! Boundary validation for booking input.
//!
//! Checks what the scheduler itself does not: the shape of the strings a
//! person typed and the bounds a clinic places on durations. Detects:
//! - Empty or non-alphabetic patient names
//! - Contact numbers with anything but digits and hyphens
//! - Durations that are non-positive, outside the configured range, or
//!   not a multiple of the configured step
//! - Providers missing from the configured roster
//!
//! Also audits an already-stored set for duplicate ids and double-bookings
//! that bypassed the scheduler.

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDateTime;

use crate::models::{Appointment, AppointmentError};
use crate::scheduler::conflicting_pairs;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Patient name is blank.
    EmptyPatientName,
    /// Patient name contains something other than letters and spaces.
    InvalidPatientName,
    /// Contact number is blank.
    EmptyContact,
    /// Contact number contains something other than digits and hyphens.
    InvalidContact,
    /// Duration is zero or negative.
    NonPositiveDuration,
    /// Duration falls outside the configured bounds.
    DurationOutOfRange,
    /// Duration is not a multiple of the configured step.
    DurationOffStep,
    /// Provider is not in the configured roster.
    UnknownProvider,
    /// Two stored appointments share an id.
    DuplicateId,
    /// Two stored appointments double-book a provider.
    Overlap,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Limits applied to incoming bookings.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRules {
    /// Accepted providers. Empty = any provider.
    pub providers: Vec<String>,
    /// Shortest bookable duration (minutes).
    pub min_duration_minutes: i64,
    /// Longest bookable duration (minutes).
    pub max_duration_minutes: i64,
    /// Durations must be a multiple of this (minutes). `None` = any.
    pub duration_step_minutes: Option<i64>,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            min_duration_minutes: 1,
            max_duration_minutes: i64::MAX,
            duration_step_minutes: None,
        }
    }
}

impl ValidationRules {
    /// Restricts bookings to the given providers.
    pub fn with_providers<I, S>(mut self, providers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.providers = providers.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the inclusive duration bounds (minutes).
    pub fn with_duration_range(mut self, min: i64, max: i64) -> Self {
        self.min_duration_minutes = min;
        self.max_duration_minutes = max;
        self
    }

    /// Requires durations in multiples of `step` minutes.
    pub fn with_duration_step(mut self, step: i64) -> Self {
        self.duration_step_minutes = Some(step);
        self
    }
}

/// Raw booking input, as typed.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    /// Patient's name.
    pub patient_name: String,
    /// Patient's contact number.
    pub patient_contact: String,
    /// Provider to book.
    pub provider: String,
    /// Requested start.
    pub start: NaiveDateTime,
    /// Requested length (minutes).
    pub duration_minutes: i64,
}

impl BookingRequest {
    /// Creates a request. Surrounding whitespace is trimmed from the text fields.
    pub fn new(
        patient_name: impl AsRef<str>,
        patient_contact: impl AsRef<str>,
        provider: impl AsRef<str>,
        start: NaiveDateTime,
        duration_minutes: i64,
    ) -> Self {
        Self {
            patient_name: patient_name.as_ref().trim().to_string(),
            patient_contact: patient_contact.as_ref().trim().to_string(),
            provider: provider.as_ref().trim().to_string(),
            start,
            duration_minutes,
        }
    }

    /// Builds the appointment this request describes.
    pub fn to_appointment(&self) -> Result<Appointment, AppointmentError> {
        Appointment::new(
            &self.patient_name,
            &self.patient_contact,
            &self.provider,
            self.start,
            self.duration_minutes,
        )
    }
}

/// Validates a booking request against `rules`.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_request(request: &BookingRequest, rules: &ValidationRules) -> ValidationResult {
    let mut errors = Vec::new();

    let name = request.patient_name.as_str();
    if name.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyPatientName,
            "Patient's name cannot be empty",
        ));
    } else if !name.chars().all(|c| c.is_ascii_alphabetic() || c == ' ') {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidPatientName,
            format!("Patient's name should only contain letters and spaces: '{name}'"),
        ));
    }

    let contact = request.patient_contact.as_str();
    if contact.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyContact,
            "Patient's contact number cannot be empty",
        ));
    } else if !contact.chars().all(|c| c.is_ascii_digit() || c == '-') {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidContact,
            format!("Patient's contact number can only contain numbers and hyphens: '{contact}'"),
        ));
    }

    let duration = request.duration_minutes;
    if duration <= 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::NonPositiveDuration,
            format!("Duration must be positive, got {duration} minutes"),
        ));
    } else if duration < rules.min_duration_minutes || duration > rules.max_duration_minutes {
        errors.push(ValidationError::new(
            ValidationErrorKind::DurationOutOfRange,
            format!(
                "Duration must be between {} and {} minutes, got {duration}",
                rules.min_duration_minutes, rules.max_duration_minutes
            ),
        ));
    } else if let Some(step) = rules.duration_step_minutes.filter(|&s| s > 0) {
        if duration % step != 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::DurationOffStep,
                format!("Duration must be a multiple of {step} minutes, got {duration}"),
            ));
        }
    }

    if !rules.providers.is_empty() && !rules.providers.iter().any(|p| *p == request.provider) {
        errors.push(ValidationError::new(
            ValidationErrorKind::UnknownProvider,
            format!("Unknown provider '{}'", request.provider),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Audits a stored set of appointments.
///
/// Checks:
/// 1. No two appointments share an id
/// 2. No provider is double-booked
pub fn validate_existing(appointments: &[Appointment]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut ids = HashSet::new();
    for a in appointments {
        if !ids.insert(a.id()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate appointment ID: {}", a.id()),
            ));
        }
    }

    for (i, j) in conflicting_pairs(appointments) {
        errors.push(ValidationError::new(
            ValidationErrorKind::Overlap,
            format!(
                "Double-booked {}: [{}] overlaps [{}]",
                appointments[i].provider(),
                appointments[i],
                appointments[j]
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
