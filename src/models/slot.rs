//! Time slot model.
//!
//! A slot is the stretch of wall-clock time an appointment occupies.
//!
//! # Time Model
//! All times are `NaiveDateTime` on a single implicit local clock.
//! No time zone is attached; the consumer decides what "local" means.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A time interval [start, end).
///
/// Half-open interval: includes start, excludes end. Two slots that merely
/// touch (one ends exactly when the other starts) do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Interval start (inclusive).
    pub start: NaiveDateTime,
    /// Interval end (exclusive).
    pub end: NaiveDateTime,
}

impl TimeSlot {
    /// Creates a slot from explicit bounds.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Creates a slot starting at `start` and lasting `minutes`, or `None`
    /// if the end falls past the last representable time.
    pub fn checked_from_minutes(start: NaiveDateTime, minutes: u32) -> Option<Self> {
        start
            .checked_add_signed(Duration::minutes(i64::from(minutes)))
            .map(|end| Self { start, end })
    }

    /// Creates a slot starting at `start` and lasting `minutes`.
    ///
    /// The end is clamped to `NaiveDateTime::MAX`.
    pub fn from_minutes(start: NaiveDateTime, minutes: u32) -> Self {
        Self::checked_from_minutes(start, minutes).unwrap_or(Self {
            start,
            end: NaiveDateTime::MAX,
        })
    }

    /// Whether two slots overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && self.end > other.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_slot_bounds() {
        let s = TimeSlot::from_minutes(at(9, 0), 30);
        assert_eq!(s.end, at(9, 30));
        assert_eq!(TimeSlot::checked_from_minutes(at(9, 0), 30), Some(s));
    }

    #[test]
    fn test_slot_end_clamped_at_max() {
        let last = NaiveDateTime::MAX;
        assert_eq!(TimeSlot::checked_from_minutes(last, 30), None);

        let s = TimeSlot::from_minutes(last, 30);
        assert_eq!(s.start, last);
        assert_eq!(s.end, NaiveDateTime::MAX);
        assert!(!s.overlaps(&TimeSlot::from_minutes(at(9, 0), 30)));
    }

    #[test]
    fn test_slot_overlap() {
        let a = TimeSlot::from_minutes(at(9, 0), 30);
        let b = TimeSlot::from_minutes(at(9, 15), 30);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));

        let c = TimeSlot::from_minutes(at(9, 30), 30); // touching
        assert!(!a.overlaps(&c));
        assert!(!c.overlaps(&a));
    }

    #[test]
    fn test_slot_containment_overlaps() {
        let outer = TimeSlot::new(at(8, 0), at(12, 0));
        let inner = TimeSlot::new(at(9, 0), at(9, 5));
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }
}
