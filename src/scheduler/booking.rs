//! Booking orchestration over a store.
//!
//! # Algorithm
//!
//! - **add**: fetch the current set, reject on a same-provider overlap,
//!   otherwise insert. Check and insert run as one store call
//!   ([`AppointmentStore::insert_unless`]).
//! - **remove_at**: fetch, sort, pick the appointment at `index`, delete
//!   it by id. An out-of-range index removes nothing.
//! - **list**: fetch, sort.
//!
//! Nothing is cached between calls; every operation re-reads the store.

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use super::conflict::{find_conflict, has_conflict};
use super::ordering::sort_appointments;
use crate::error::{SchedulerError, SchedulerResult};
use crate::models::{Appointment, AppointmentError, AppointmentId, TimeSlot};
use crate::store::AppointmentStore;
use crate::validation::{validate_existing, validate_request, BookingRequest, ValidationRules};

/// Books and cancels appointments while keeping every provider's
/// calendar free of overlaps.
///
/// Owns its store. Mutating operations take `&mut self`, so a single
/// scheduler never interleaves a conflict check with another write.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_appointment::models::Appointment;
/// use u_appointment::scheduler::Scheduler;
/// use u_appointment::store::MemoryStore;
///
/// let day = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
/// let mut scheduler = Scheduler::open(MemoryStore::new()).unwrap();
///
/// let first = Appointment::new("Jane Doe", "555-0100", "Dr. A", day.and_hms_opt(9, 0, 0).unwrap(), 30).unwrap();
/// scheduler.add(first).unwrap();
///
/// let clash = Appointment::new("John Roe", "555-0101", "Dr. A", day.and_hms_opt(9, 15, 0).unwrap(), 30).unwrap();
/// assert!(scheduler.add(clash).unwrap_err().is_conflict());
///
/// assert_eq!(scheduler.list().unwrap().len(), 1);
/// ```
#[derive(Debug)]
pub struct Scheduler<S: AppointmentStore> {
    store: S,
}

impl<S: AppointmentStore> Scheduler<S> {
    /// Wraps a store whose schema is already initialized.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Initializes the store schema and wraps it.
    pub fn open(mut store: S) -> SchedulerResult<Self> {
        store.initialize_schema()?;
        Ok(Self { store })
    }

    /// Closes the store and hands it back.
    pub fn close(mut self) -> SchedulerResult<S> {
        self.store.close()?;
        Ok(self.store)
    }

    /// All appointments in canonical order (start, then duration).
    pub fn list(&self) -> SchedulerResult<Vec<Appointment>> {
        let appointments = self.store.fetch_all()?;
        debug!(count = appointments.len(), "listing appointments");
        Ok(sort_appointments(appointments))
    }

    /// Whether booking `provider` at `[start, start + duration_minutes)`
    /// would conflict with what is currently stored.
    ///
    /// # Errors
    /// [`AppointmentError::EndOutOfRange`] (wrapped) if the slot cannot be
    /// represented, or any store failure.
    pub fn check(
        &self,
        provider: &str,
        start: NaiveDateTime,
        duration_minutes: u32,
    ) -> SchedulerResult<bool> {
        TimeSlot::checked_from_minutes(start, duration_minutes).ok_or(
            AppointmentError::EndOutOfRange {
                start,
                minutes: duration_minutes,
            },
        )?;
        let existing = self.store.fetch_all()?;
        Ok(has_conflict(&existing, provider, start, duration_minutes))
    }

    /// Books `candidate` unless it overlaps an existing appointment for
    /// the same provider.
    ///
    /// # Errors
    /// - [`SchedulerError::Conflict`] naming the appointment in the way.
    /// - [`SchedulerError::Store`] if the store fails.
    pub fn add(&mut self, candidate: Appointment) -> SchedulerResult<AppointmentId> {
        let provider = candidate.provider().to_string();
        let start = candidate.start();
        let minutes = candidate.duration_minutes();

        let blocker = |existing: &[Appointment]| {
            find_conflict(existing, &provider, start, minutes).cloned()
        };

        if let Some(existing) = self.store.insert_unless(&candidate, &blocker)? {
            warn!(
                provider = %provider,
                requested = %candidate,
                existing = %existing,
                "rejected double-booking"
            );
            return Err(SchedulerError::Conflict {
                provider,
                existing: Box::new(existing),
            });
        }

        info!(id = %candidate.id(), "booked {candidate}");
        Ok(candidate.id())
    }

    /// Validates raw input against `rules`, then books it.
    ///
    /// # Errors
    /// [`SchedulerError::Invalid`] with every failed check, or any error
    /// from [`Scheduler::add`].
    pub fn add_validated(
        &mut self,
        request: &BookingRequest,
        rules: &ValidationRules,
    ) -> SchedulerResult<Appointment> {
        validate_request(request, rules).map_err(SchedulerError::Invalid)?;
        let appointment = request.to_appointment()?;
        self.add(appointment.clone())?;
        Ok(appointment)
    }

    /// Removes the appointment at `index` in the canonical order.
    ///
    /// Returns the removed appointment, or `None` when `index` is past the
    /// end (nothing is removed and no error is raised).
    pub fn remove_at(&mut self, index: usize) -> SchedulerResult<Option<Appointment>> {
        let ordered = self.list()?;
        let Some(target) = ordered.into_iter().nth(index) else {
            warn!(index, "remove index out of range; nothing removed");
            return Ok(None);
        };

        if self.store.delete(target.id())? {
            info!(id = %target.id(), index, "removed {target}");
            Ok(Some(target))
        } else {
            // Deleted by someone else between the fetch and the delete.
            warn!(id = %target.id(), index, "appointment vanished before removal");
            Ok(None)
        }
    }

    /// Removes the appointment with `id`. Returns whether it existed.
    pub fn remove(&mut self, id: AppointmentId) -> SchedulerResult<bool> {
        let removed = self.store.delete(id)?;
        if removed {
            info!(%id, "removed appointment");
        } else {
            debug!(%id, "no appointment with this id");
        }
        Ok(removed)
    }

    /// Checks the stored set for duplicate ids and double-bookings that
    /// reached the store without going through [`Scheduler::add`].
    pub fn audit(&self) -> SchedulerResult<()> {
        let appointments = self.list()?;
        validate_existing(&appointments).map_err(SchedulerError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, SqliteStore, StoreError};
    use crate::validation::ValidationErrorKind;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn appt(name: &str, provider: &str, start: NaiveDateTime, minutes: i64) -> Appointment {
        Appointment::new(name, "555-0100", provider, start, minutes).unwrap()
    }

    fn memory_scheduler() -> Scheduler<MemoryStore> {
        Scheduler::open(MemoryStore::new()).unwrap()
    }

    #[test]
    fn test_dr_a_scenario() {
        let mut s = memory_scheduler();
        s.add(appt("Jane", "Dr. A", at(9, 0), 30)).unwrap();

        let err = s.add(appt("John", "Dr. A", at(9, 15), 30)).unwrap_err();
        match err {
            SchedulerError::Conflict { provider, existing } => {
                assert_eq!(provider, "Dr. A");
                assert_eq!(existing.patient_name(), "Jane");
            }
            other => panic!("expected conflict, got {other:?}"),
        }

        s.add(appt("Touch", "Dr. A", at(9, 30), 30)).unwrap();
        s.add(appt("Other", "Dr. B", at(9, 15), 30)).unwrap();
        assert_eq!(s.list().unwrap().len(), 3);
    }

    #[test]
    fn test_list_is_ordered() {
        let mut s = memory_scheduler();
        s.add(appt("Nine", "Dr. A", at(9, 0), 30)).unwrap();
        s.add(appt("Eight", "Dr. B", at(8, 0), 60)).unwrap();
        s.add(appt("EightShort", "Dr. C", at(8, 0), 15)).unwrap();

        let names: Vec<_> = s
            .list()
            .unwrap()
            .iter()
            .map(|a| a.patient_name().to_string())
            .collect();
        assert_eq!(names, ["EightShort", "Eight", "Nine"]);
    }

    #[test]
    fn test_added_appointment_lands_in_order() {
        let mut s = memory_scheduler();
        s.add(appt("A", "Dr. A", at(8, 0), 30)).unwrap();
        s.add(appt("C", "Dr. A", at(10, 0), 30)).unwrap();
        let id = s.add(appt("B", "Dr. A", at(9, 0), 30)).unwrap();

        let listed = s.list().unwrap();
        assert_eq!(listed[1].id(), id);
    }

    #[test]
    fn test_check_predicate() {
        let mut s = memory_scheduler();
        s.add(appt("Jane", "Dr. A", at(9, 0), 30)).unwrap();
        assert!(s.check("Dr. A", at(9, 15), 30).unwrap());
        assert!(!s.check("Dr. A", at(9, 30), 30).unwrap());
        assert!(!s.check("Dr. B", at(9, 15), 30).unwrap());
    }

    #[test]
    fn test_check_slot_past_max_is_error() {
        let s = memory_scheduler();
        let err = s.check("Dr. A", NaiveDateTime::MAX, 30).unwrap_err();
        assert!(matches!(
            err,
            SchedulerError::Appointment(AppointmentError::EndOutOfRange { minutes: 30, .. })
        ));
    }

    #[test]
    fn test_remove_at_past_end_is_noop() {
        let mut s = memory_scheduler();
        s.add(appt("A", "Dr. A", at(9, 0), 30)).unwrap();
        s.add(appt("B", "Dr. A", at(10, 0), 30)).unwrap();

        let before = s.list().unwrap();
        assert_eq!(s.remove_at(before.len()).unwrap(), None);
        assert_eq!(s.remove_at(usize::MAX).unwrap(), None);
        assert_eq!(s.list().unwrap(), before);
    }

    #[test]
    fn test_remove_at_uses_canonical_order() {
        let mut s = memory_scheduler();
        s.add(appt("Late", "Dr. A", at(11, 0), 30)).unwrap();
        s.add(appt("Early", "Dr. A", at(8, 0), 30)).unwrap();
        s.add(appt("Mid", "Dr. A", at(9, 0), 30)).unwrap();

        let removed = s.remove_at(1).unwrap().unwrap();
        assert_eq!(removed.patient_name(), "Mid");

        let names: Vec<_> = s
            .list()
            .unwrap()
            .iter()
            .map(|a| a.patient_name().to_string())
            .collect();
        assert_eq!(names, ["Early", "Late"]);
    }

    #[test]
    fn test_remove_at_removes_one_of_identical_twins() {
        // Bypass the conflict check to store two field-identical rows.
        let a = appt("Twin", "Dr. A", at(9, 0), 30);
        let b = appt("Twin", "Dr. A", at(9, 0), 30);
        let mut s = Scheduler::new(MemoryStore::with_appointments(vec![a.clone(), b.clone()]));

        let removed = s.remove_at(0).unwrap().unwrap();
        assert_eq!(removed.id(), a.id());
        assert_eq!(s.list().unwrap(), vec![b]);
    }

    #[test]
    fn test_remove_by_id() {
        let mut s = memory_scheduler();
        let id = s.add(appt("A", "Dr. A", at(9, 0), 30)).unwrap();
        assert!(s.remove(id).unwrap());
        assert!(!s.remove(id).unwrap());
        assert!(s.list().unwrap().is_empty());
    }

    #[test]
    fn test_store_failures_propagate() {
        let mut store = MemoryStore::new();
        store.set_available(false);
        let mut s = Scheduler::new(store);

        assert!(matches!(
            s.list(),
            Err(SchedulerError::Store(StoreError::Unavailable(_)))
        ));
        assert!(matches!(
            s.add(appt("A", "Dr. A", at(9, 0), 30)),
            Err(SchedulerError::Store(_))
        ));
        assert!(matches!(s.remove_at(0), Err(SchedulerError::Store(_))));
        assert!(matches!(s.remove(AppointmentId::new()), Err(SchedulerError::Store(_))));
        assert!(matches!(
            s.check("Dr. A", at(9, 0), 30),
            Err(SchedulerError::Store(_))
        ));
    }

    #[test]
    fn test_add_validated() {
        let mut s = memory_scheduler();
        let rules = ValidationRules::default().with_providers(["Dr. A"]);

        let ok = BookingRequest::new("Jane Doe", "555-0100", "Dr. A", at(9, 0), 30);
        let booked = s.add_validated(&ok, &rules).unwrap();
        assert_eq!(s.list().unwrap(), vec![booked]);

        let bad = BookingRequest::new("J4ne", "555-0100", "Dr. Q", at(11, 0), 30);
        match s.add_validated(&bad, &rules).unwrap_err() {
            SchedulerError::Invalid(errors) => {
                let kinds: Vec<_> = errors.into_iter().map(|e| e.kind).collect();
                assert_eq!(
                    kinds,
                    vec![
                        ValidationErrorKind::InvalidPatientName,
                        ValidationErrorKind::UnknownProvider
                    ]
                );
            }
            other => panic!("expected validation failure, got {other:?}"),
        }

        let clash = BookingRequest::new("John Roe", "555-0101", "Dr. A", at(9, 10), 30);
        assert!(s.add_validated(&clash, &rules).unwrap_err().is_conflict());
    }

    #[test]
    fn test_audit_flags_bypassed_overlap() {
        let s = Scheduler::new(MemoryStore::with_appointments(vec![
            appt("A", "Dr. A", at(9, 0), 30),
            appt("B", "Dr. A", at(9, 10), 30),
        ]));
        assert!(matches!(s.audit(), Err(SchedulerError::Invalid(_))));

        let clean = memory_scheduler();
        assert!(clean.audit().is_ok());
    }

    #[test]
    fn test_sqlite_backed_scheduler() {
        let mut s = Scheduler::open(SqliteStore::open_in_memory().unwrap()).unwrap();
        s.add(appt("Nine", "Dr. A", at(9, 0), 30)).unwrap();
        s.add(appt("Eight", "Dr. A", at(8, 0), 60)).unwrap();
        assert!(s.add(appt("Clash", "Dr. A", at(8, 30), 30)).unwrap_err().is_conflict());

        let listed = s.list().unwrap();
        assert_eq!(listed[0].patient_name(), "Eight");
        assert_eq!(listed[1].patient_name(), "Nine");

        assert_eq!(s.remove_at(2).unwrap(), None);
        assert_eq!(s.remove_at(0).unwrap().unwrap().patient_name(), "Eight");

        let store = s.close().unwrap();
        assert!(store.fetch_all().is_err());
    }
}
