// src/schedule/conflict.rs
//
// Double-booking is defined on the exact (provider, date, time) slot; only a
// *scheduled* occupant blocks. Appointment duration is informational and does
// not widen the check to neighboring slots. Moves run through
// `ScheduleService::move_appointment` so the check and the index re-key share
// one critical section.

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::schedule::store::{AppointmentStatus, AppointmentStore};
use crate::schedule::ScheduleError;

/// Ok when the slot is free for the candidate, `SlotOccupied` with the
/// conflicting id otherwise. `excluding` skips the record being moved so a
/// record never conflicts with itself.
pub fn can_place(
    store: &AppointmentStore,
    provider: &str,
    date: NaiveDate,
    time: NaiveTime,
    excluding: Option<Uuid>,
) -> Result<(), ScheduleError> {
    let Some(existing) = store.find_by_slot(provider, date, time) else {
        return Ok(());
    };

    if Some(existing.id) == excluding {
        return Ok(());
    }

    if existing.status == AppointmentStatus::Scheduled {
        warn!(
            "slot {} {} for {} already taken by appointment {}",
            date, time, provider, existing.id
        );
        return Err(ScheduleError::SlotOccupied(existing.id));
    }

    // A completed/cancelled/no-show occupant left in the slot does not block
    // reuse.
    debug!(
        "slot {} {} for {} held only by {} appointment {}",
        date, time, provider, existing.status, existing.id
    );
    Ok(())
}
