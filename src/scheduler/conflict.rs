//! Per-provider conflict detection.
//!
//! # Algorithm
//!
//! A candidate `[S, S+D)` conflicts with an existing appointment
//! `[Sa, Sa+Da)` of the same provider iff `S < Sa+Da && S+D > Sa`.
//! Touching endpoints do not conflict.
//!
//! # Complexity
//! O(n) over the existing set; no index is kept at this scale.

use chrono::NaiveDateTime;

use crate::models::{Appointment, TimeSlot};

/// Returns the first existing appointment for `provider` whose slot
/// overlaps `[start, start + duration_minutes)`.
pub fn find_conflict<'a>(
    existing: &'a [Appointment],
    provider: &str,
    start: NaiveDateTime,
    duration_minutes: u32,
) -> Option<&'a Appointment> {
    let candidate = TimeSlot::from_minutes(start, duration_minutes);
    existing
        .iter()
        .filter(|a| a.provider() == provider)
        .find(|a| candidate.overlaps(&a.slot()))
}

/// Whether booking `provider` for `[start, start + duration_minutes)` would
/// double-book them against `existing`.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_appointment::models::Appointment;
/// use u_appointment::scheduler::has_conflict;
///
/// let day = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
/// let existing = vec![
///     Appointment::new("Jane Doe", "555-0100", "Dr. A", day.and_hms_opt(9, 0, 0).unwrap(), 30).unwrap(),
/// ];
///
/// assert!(has_conflict(&existing, "Dr. A", day.and_hms_opt(9, 15, 0).unwrap(), 30));
/// assert!(!has_conflict(&existing, "Dr. A", day.and_hms_opt(9, 30, 0).unwrap(), 30));
/// assert!(!has_conflict(&existing, "Dr. B", day.and_hms_opt(9, 15, 0).unwrap(), 30));
/// ```
pub fn has_conflict(
    existing: &[Appointment],
    provider: &str,
    start: NaiveDateTime,
    duration_minutes: u32,
) -> bool {
    find_conflict(existing, provider, start, duration_minutes).is_some()
}

/// Every same-provider pair in `appointments` whose slots overlap.
///
/// Used to audit sets that reached the store without going through the
/// scheduler (hand-edited databases, imports). Pairs are reported as
/// `(i, j)` indices into `appointments` with `i < j`.
pub fn conflicting_pairs(appointments: &[Appointment]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (i, a) in appointments.iter().enumerate() {
        for (j, b) in appointments.iter().enumerate().skip(i + 1) {
            if a.conflicts_with(b) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn appt(provider: &str, start: NaiveDateTime, minutes: i64) -> Appointment {
        Appointment::new("Jane Doe", "555-0100", provider, start, minutes).unwrap()
    }

    #[test]
    fn test_dr_a_scenario() {
        let existing = vec![appt("Dr. A", at(9, 0), 30)];

        // Overlaps the second half of the existing slot
        assert!(has_conflict(&existing, "Dr. A", at(9, 15), 30));
        // Starts exactly when the existing one ends
        assert!(!has_conflict(&existing, "Dr. A", at(9, 30), 30));
        // Same time, different provider
        assert!(!has_conflict(&existing, "Dr. B", at(9, 15), 30));
    }

    #[test]
    fn test_touching_before_is_free() {
        let existing = vec![appt("Dr. A", at(9, 0), 30)];
        assert!(!has_conflict(&existing, "Dr. A", at(8, 30), 30));
        assert!(has_conflict(&existing, "Dr. A", at(8, 31), 30));
    }

    #[test]
    fn test_enclosing_and_enclosed() {
        let existing = vec![appt("Dr. A", at(9, 0), 60)];
        assert!(has_conflict(&existing, "Dr. A", at(9, 15), 15));
        assert!(has_conflict(&existing, "Dr. A", at(8, 0), 180));
        assert!(has_conflict(&existing, "Dr. A", at(9, 0), 60));
    }

    #[test]
    fn test_empty_set_never_conflicts() {
        assert!(!has_conflict(&[], "Dr. A", at(9, 0), 30));
    }

    #[test]
    fn test_end_of_calendar_is_total() {
        let last = NaiveDateTime::MAX;
        assert!(!has_conflict(&[], "Dr. A", last, 30));

        let late = appt("Dr. A", last - Duration::minutes(60), 30);
        let existing = vec![late.clone()];
        assert!(!has_conflict(&existing, "Dr. A", last, 30));
        assert!(has_conflict(&existing, "Dr. A", late.start(), u32::MAX));
    }

    #[test]
    fn test_provider_match_is_exact() {
        let existing = vec![appt("Dr. A", at(9, 0), 30)];
        assert!(!has_conflict(&existing, "dr. a", at(9, 0), 30));
        assert!(!has_conflict(&existing, "Dr. A ", at(9, 0), 30));
    }

    #[test]
    fn test_find_conflict_returns_first_match() {
        let existing = vec![
            appt("Dr. B", at(9, 0), 120),
            appt("Dr. A", at(8, 0), 30),
            appt("Dr. A", at(9, 0), 30),
            appt("Dr. A", at(9, 20), 30),
        ];
        let hit = find_conflict(&existing, "Dr. A", at(9, 10), 20).unwrap();
        assert_eq!(hit.id(), existing[2].id());
        assert!(find_conflict(&existing, "Dr. A", at(10, 0), 30).is_none());
    }

    #[test]
    fn test_matches_interval_formula() {
        // Randomized against the textbook predicate on raw minute offsets.
        let mut rng = SmallRng::seed_from_u64(42);
        let base = at(0, 0);
        for _ in 0..2000 {
            let s1: i64 = rng.random_range(0..600);
            let d1: i64 = rng.random_range(1..120);
            let s2: i64 = rng.random_range(0..600);
            let d2: i64 = rng.random_range(1..120);
            let same_provider = rng.random_bool(0.7);

            let existing = vec![appt("Dr. A", base + Duration::minutes(s1), d1)];
            let provider = if same_provider { "Dr. A" } else { "Dr. B" };
            let got = has_conflict(&existing, provider, base + Duration::minutes(s2), d2 as u32);
            let expected = same_provider && s1 < s2 + d2 && s2 < s1 + d1;
            assert_eq!(got, expected, "s1={s1} d1={d1} s2={s2} d2={d2} same={same_provider}");
        }
    }

    #[test]
    fn test_conflicting_pairs() {
        let set = vec![
            appt("Dr. A", at(9, 0), 30),
            appt("Dr. B", at(9, 0), 30),
            appt("Dr. A", at(9, 15), 30),
            appt("Dr. A", at(9, 45), 15),
            appt("Dr. B", at(9, 30), 30),
        ];
        // 2 and 3 only touch at 9:45
        assert_eq!(conflicting_pairs(&set), vec![(0, 2)]);
        assert!(conflicting_pairs(&[]).is_empty());
    }
}
