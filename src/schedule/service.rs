// src/schedule/service.rs
//
// The one owner of mutable scheduling state. Constructed once at startup and
// shared behind an Arc; every mutation runs its whole check-then-commit
// sequence under the store write lock, so concurrent callers observe each
// operation entirely before or entirely after their own. Locks are acquired
// policy first, store second, and never held across an await point.

use std::sync::{PoisonError, RwLock};

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, info};
use uuid::Uuid;

use crate::schedule::conflict;
use crate::schedule::hhmm;
use crate::schedule::hours::{BusinessHoursConfig, BusinessHoursPolicy};
use crate::schedule::lifecycle;
use crate::schedule::store::{
    Appointment, AppointmentFilter, AppointmentPatch, AppointmentStatus, AppointmentStore,
    NewAppointment,
};
use crate::schedule::view::{self, DateRange, Granularity, ScheduleGrid};
use crate::schedule::ScheduleError;

#[derive(Debug)]
pub struct ScheduleService {
    policy: RwLock<BusinessHoursPolicy>,
    store: RwLock<AppointmentStore>,
}

// Writers keep both maps consistent at every return path, so a guard from a
// poisoned lock still holds usable state.
fn recover<G>(result: Result<G, PoisonError<G>>) -> G {
    result.unwrap_or_else(PoisonError::into_inner)
}

impl ScheduleService {
    pub fn new(config: BusinessHoursConfig) -> Result<Self, ScheduleError> {
        Ok(Self {
            policy: RwLock::new(BusinessHoursPolicy::new(config)?),
            store: RwLock::new(AppointmentStore::new()),
        })
    }

    pub fn hours(&self) -> BusinessHoursConfig {
        recover(self.policy.read()).config()
    }

    /// Validates and swaps the operating window wholesale. Readers see the
    /// old or the new config in full, never a mix. On failure the prior
    /// config stays active.
    pub fn set_hours(&self, config: BusinessHoursConfig) -> Result<(), ScheduleError> {
        let mut policy = recover(self.policy.write());
        policy.set_config(config)?;
        info!(
            "business hours set to {:02}:00-{:02}:00 every {} minutes",
            config.start_hour, config.end_hour, config.interval_minutes
        );
        Ok(())
    }

    pub fn slots(&self) -> Vec<NaiveTime> {
        recover(self.policy.read()).generate_slots()
    }

    /// Placement: policy (grid check) -> resolver (double-booking) -> store.
    pub fn create(&self, new: NewAppointment) -> Result<Appointment, ScheduleError> {
        let policy = recover(self.policy.read());
        let mut store = recover(self.store.write());

        if !policy.is_grid_slot(new.time) {
            return Err(ScheduleError::SlotInvalid(
                new.time.format(hhmm::FORMAT).to_string(),
            ));
        }
        conflict::can_place(&store, &new.provider, new.date, new.time, None)?;

        let appointment = store.create(new);
        info!(
            "appointment {} created for {} at {} {}",
            appointment.id, appointment.provider, appointment.date, appointment.time
        );
        Ok(appointment)
    }

    /// Full-field update. A change of (provider, date, time) re-runs the
    /// placement flow with the record itself excluded; a status change runs
    /// the lifecycle machine. All-or-nothing: any rejection leaves the
    /// record untouched.
    pub fn update(&self, id: Uuid, patch: AppointmentPatch) -> Result<Appointment, ScheduleError> {
        let policy = recover(self.policy.read());
        let mut store = recover(self.store.write());

        let current = store.get(id).cloned().ok_or(ScheduleError::NotFound(id))?;

        let date = patch.date.unwrap_or(current.date);
        let time = patch.time.unwrap_or(current.time);
        let provider = patch.provider.clone().unwrap_or_else(|| current.provider.clone());

        let slot_changed = (provider.as_str(), date, time)
            != (current.provider.as_str(), current.date, current.time);
        if slot_changed {
            if !policy.is_grid_slot(time) {
                return Err(ScheduleError::SlotInvalid(
                    time.format(hhmm::FORMAT).to_string(),
                ));
            }
            conflict::can_place(&store, &provider, date, time, Some(id))?;
        }

        if let Some(status) = patch.status {
            if status != current.status {
                lifecycle::validate(current.status, status)?;
            }
        }

        let updated = store.update(id, patch)?;
        info!("appointment {} updated", updated.id);
        Ok(updated)
    }

    /// The drag/drop operation: moving to the current slot is a no-op that
    /// returns the record unchanged; otherwise both fields commit together
    /// or not at all.
    pub fn move_appointment(
        &self,
        id: Uuid,
        new_date: NaiveDate,
        new_time: NaiveTime,
    ) -> Result<Appointment, ScheduleError> {
        let policy = recover(self.policy.read());
        let mut store = recover(self.store.write());

        let current = store.get(id).cloned().ok_or(ScheduleError::NotFound(id))?;
        if current.date == new_date && current.time == new_time {
            debug!("appointment {} move to its own slot, nothing to do", id);
            return Ok(current);
        }

        if !policy.is_grid_slot(new_time) {
            return Err(ScheduleError::SlotInvalid(
                new_time.format(hhmm::FORMAT).to_string(),
            ));
        }
        conflict::can_place(&store, &current.provider, new_date, new_time, Some(id))?;

        let moved = store.update(
            id,
            AppointmentPatch {
                date: Some(new_date),
                time: Some(new_time),
                ..Default::default()
            },
        )?;
        info!(
            "appointment {} moved to {} {}",
            moved.id, moved.date, moved.time
        );
        Ok(moved)
    }

    /// Status-only change through the lifecycle machine; never touches the
    /// slot index and bypasses the conflict resolver.
    pub fn transition(
        &self,
        id: Uuid,
        to: AppointmentStatus,
    ) -> Result<Appointment, ScheduleError> {
        let mut store = recover(self.store.write());

        let current = store.get(id).cloned().ok_or(ScheduleError::NotFound(id))?;
        lifecycle::validate(current.status, to)?;

        let updated = store.update(
            id,
            AppointmentPatch {
                status: Some(to),
                ..Default::default()
            },
        )?;
        info!("appointment {} is now {}", updated.id, updated.status);
        Ok(updated)
    }

    pub fn delete(&self, id: Uuid) -> Result<(), ScheduleError> {
        recover(self.store.write()).delete(id)?;
        info!("appointment {id} deleted");
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> Result<Appointment, ScheduleError> {
        recover(self.store.read())
            .get(id)
            .cloned()
            .ok_or(ScheduleError::NotFound(id))
    }

    pub fn list(&self, filter: &AppointmentFilter) -> Vec<Appointment> {
        recover(self.store.read()).list(filter)
    }

    /// Consistent read-only snapshot: both locks taken for the duration of
    /// the projection, nothing mutated.
    pub fn project(
        &self,
        range: DateRange,
        granularity: Granularity,
        provider: Option<&str>,
    ) -> ScheduleGrid {
        let policy = recover(self.policy.read());
        let store = recover(self.store.read());
        view::project(&store, &policy, range, granularity, provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn service(start: u8, end: u8, interval: u32) -> ScheduleService {
        ScheduleService::new(BusinessHoursConfig {
            start_hour: start,
            end_hour: end,
            interval_minutes: interval,
        })
        .unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn hhmm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn new_appointment(
        provider: &str,
        patient: &str,
        date: NaiveDate,
        time: NaiveTime,
    ) -> NewAppointment {
        NewAppointment {
            patient_id: patient.into(),
            date,
            time,
            duration_minutes: 30,
            provider: provider.into(),
            reason: "checkup".into(),
            notes: None,
            status: None,
        }
    }

    #[test]
    fn create_rejects_time_off_the_grid() {
        let svc = service(9, 17, 30);
        let err = svc.create(new_appointment("vet-a", "p1", day(10), hhmm(9, 15)));
        assert_eq!(err, Err(ScheduleError::SlotInvalid("09:15".into())));

        let err = svc.create(new_appointment("vet-a", "p1", day(10), hhmm(18, 0)));
        assert!(matches!(err, Err(ScheduleError::SlotInvalid(_))));
    }

    #[test]
    fn double_booking_same_provider_is_rejected() {
        let svc = service(9, 17, 30);
        let first = svc
            .create(new_appointment("vet-a", "p1", day(10), hhmm(9, 0)))
            .unwrap();

        let err = svc.create(new_appointment("vet-a", "p2", day(10), hhmm(9, 0)));
        assert_eq!(err, Err(ScheduleError::SlotOccupied(first.id)));

        // A different provider shares no slot constraint.
        assert!(svc
            .create(new_appointment("vet-b", "p2", day(10), hhmm(9, 0)))
            .is_ok());
    }

    #[test]
    fn move_to_same_slot_is_a_no_op() {
        let svc = service(9, 17, 30);
        let appt = svc
            .create(new_appointment("vet-a", "p1", day(10), hhmm(9, 0)))
            .unwrap();

        let unchanged = svc.move_appointment(appt.id, day(10), hhmm(9, 0)).unwrap();
        assert_eq!(unchanged.date, appt.date);
        assert_eq!(unchanged.time, appt.time);
    }

    #[test]
    fn rejected_move_changes_neither_date_nor_time() {
        let svc = service(9, 17, 30);
        let blocker = svc
            .create(new_appointment("vet-a", "p1", day(10), hhmm(10, 0)))
            .unwrap();
        let appt = svc
            .create(new_appointment("vet-a", "p2", day(10), hhmm(9, 0)))
            .unwrap();

        let err = svc.move_appointment(appt.id, day(10), hhmm(10, 0));
        assert_eq!(err, Err(ScheduleError::SlotOccupied(blocker.id)));

        let after = svc.get(appt.id).unwrap();
        assert_eq!(after.date, day(10));
        assert_eq!(after.time, hhmm(9, 0));
    }

    #[test]
    fn vacated_slot_is_immediately_reusable() {
        // 9-11 hourly: create, collide, move away, refill the vacated slot.
        let svc = service(9, 11, 60);
        let a = svc
            .create(new_appointment("vet-a", "p1", day(10), hhmm(9, 0)))
            .unwrap();

        assert_eq!(
            svc.create(new_appointment("vet-a", "p2", day(10), hhmm(9, 0))),
            Err(ScheduleError::SlotOccupied(a.id))
        );

        svc.move_appointment(a.id, day(10), hhmm(10, 0)).unwrap();

        assert!(svc
            .create(new_appointment("vet-a", "p2", day(10), hhmm(9, 0)))
            .is_ok());
    }

    #[test]
    fn cancelled_occupant_does_not_block_recreation() {
        let svc = service(9, 17, 30);
        let appt = svc
            .create(new_appointment("vet-a", "p1", day(10), hhmm(10, 0)))
            .unwrap();
        svc.transition(appt.id, AppointmentStatus::Cancelled).unwrap();

        assert!(svc
            .create(new_appointment("vet-a", "p2", day(10), hhmm(10, 0)))
            .is_ok());
    }

    #[test]
    fn terminal_states_reject_further_transitions() {
        let svc = service(9, 17, 30);
        let appt = svc
            .create(new_appointment("vet-a", "p1", day(10), hhmm(9, 0)))
            .unwrap();

        svc.transition(appt.id, AppointmentStatus::Completed).unwrap();
        assert_eq!(
            svc.transition(appt.id, AppointmentStatus::Cancelled),
            Err(ScheduleError::InvalidTransition {
                from: AppointmentStatus::Completed,
                to: AppointmentStatus::Cancelled,
            })
        );
    }

    #[test]
    fn generic_update_cannot_smuggle_an_invalid_transition() {
        let svc = service(9, 17, 30);
        let appt = svc
            .create(new_appointment("vet-a", "p1", day(10), hhmm(9, 0)))
            .unwrap();
        svc.transition(appt.id, AppointmentStatus::NoShow).unwrap();

        let err = svc.update(
            appt.id,
            AppointmentPatch {
                status: Some(AppointmentStatus::Scheduled),
                ..Default::default()
            },
        );
        assert_eq!(
            err,
            Err(ScheduleError::InvalidTransition {
                from: AppointmentStatus::NoShow,
                to: AppointmentStatus::Scheduled,
            })
        );
    }

    #[test]
    fn update_that_changes_provider_checks_the_target_slot() {
        let svc = service(9, 17, 30);
        let blocker = svc
            .create(new_appointment("vet-b", "p1", day(10), hhmm(9, 0)))
            .unwrap();
        let appt = svc
            .create(new_appointment("vet-a", "p2", day(10), hhmm(9, 0)))
            .unwrap();

        let err = svc.update(
            appt.id,
            AppointmentPatch {
                provider: Some("vet-b".into()),
                ..Default::default()
            },
        );
        assert_eq!(err, Err(ScheduleError::SlotOccupied(blocker.id)));
    }

    #[test]
    fn narrowing_hours_keeps_existing_appointments_valid() {
        let svc = service(9, 17, 30);
        let appt = svc
            .create(new_appointment("vet-a", "p1", day(10), hhmm(9, 30)))
            .unwrap();

        svc.set_hours(BusinessHoursConfig {
            start_hour: 10,
            end_hour: 17,
            interval_minutes: 60,
        })
        .unwrap();

        // Still readable, still listed; only new placements use the new grid.
        assert_eq!(svc.get(appt.id).unwrap().time, hhmm(9, 30));
        assert!(matches!(
            svc.create(new_appointment("vet-b", "p2", day(10), hhmm(9, 30))),
            Err(ScheduleError::SlotInvalid(_))
        ));
    }

    #[test]
    fn rejected_hours_update_keeps_previous_config() {
        let svc = service(9, 17, 30);
        let bad = BusinessHoursConfig {
            start_hour: 12,
            end_hour: 12,
            interval_minutes: 30,
        };
        assert!(svc.set_hours(bad).is_err());
        assert_eq!(svc.hours().start_hour, 9);
        assert_eq!(svc.slots().len(), 16);
    }

    #[test]
    fn concurrent_moves_into_one_slot_admit_exactly_one() {
        let svc = Arc::new(service(9, 17, 30));
        let a = svc
            .create(new_appointment("vet-a", "p1", day(10), hhmm(9, 0)))
            .unwrap();
        let b = svc
            .create(new_appointment("vet-a", "p2", day(10), hhmm(9, 30)))
            .unwrap();

        let handles: Vec<_> = [a.id, b.id]
            .into_iter()
            .map(|id| {
                let svc = Arc::clone(&svc);
                std::thread::spawn(move || svc.move_appointment(id, day(10), hhmm(14, 0)))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(ScheduleError::SlotOccupied(_)))));
    }
}
