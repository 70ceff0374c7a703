// src/schedule/store.rs

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schedule::{hhmm, ScheduleError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Terminal statuses have no outgoing transitions and never block a slot.
    pub fn is_terminal(self) -> bool {
        !matches!(self, AppointmentStatus::Scheduled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no-show"),
        }
    }
}

/// (provider, date, time) — the unit of double-booking.
pub type SlotKey = (String, NaiveDate, NaiveTime);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
    #[serde(rename = "veterinarian")]
    pub provider: String,
    pub reason: String,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    pub fn slot_key(&self) -> SlotKey {
        (self.provider.clone(), self.date, self.time)
    }
}

/// Fields the caller supplies at creation; id, created_at and the default
/// status are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: u32,
    pub provider: String,
    pub reason: String,
    pub notes: Option<String>,
    pub status: Option<AppointmentStatus>,
}

/// Non-identity field updates. `notes` uses the double Option so a caller can
/// distinguish "leave as is" (None) from "set to null" (Some(None)).
#[derive(Debug, Clone, Default)]
pub struct AppointmentPatch {
    pub patient_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub duration_minutes: Option<u32>,
    pub provider: Option<String>,
    pub reason: Option<String>,
    pub notes: Option<Option<String>>,
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub provider: Option<String>,
    pub status: Option<AppointmentStatus>,
}

impl AppointmentFilter {
    fn matches(&self, appointment: &Appointment) -> bool {
        if let Some(from) = self.from {
            if appointment.date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if appointment.date > to {
                return false;
            }
        }
        if let Some(provider) = &self.provider {
            if appointment.provider != *provider {
                return false;
            }
        }
        if let Some(status) = self.status {
            if appointment.status != status {
                return false;
            }
        }
        true
    }
}

/// Authoritative in-memory collection of appointments.
///
/// Two indices: the primary map by id, and the slot index by
/// (provider, date, time). Index invariant: a `scheduled` appointment always
/// owns the index entry for its slot key; a terminal record may be displaced
/// from the index by a later occupant of the same slot and is then reachable
/// only through the primary map. Entries are removed with a guard (only when
/// they still point at the record being removed), so a displaced record can
/// never clobber the current occupant's entry.
#[derive(Debug, Default)]
pub struct AppointmentStore {
    by_id: HashMap<Uuid, Appointment>,
    by_slot: HashMap<SlotKey, Uuid>,
}

impl AppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new record into the primary map and the slot index.
    /// Conflict and grid checks happen upstream; this is the commit.
    pub fn create(&mut self, new: NewAppointment) -> Appointment {
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: new.patient_id,
            date: new.date,
            time: new.time,
            duration_minutes: new.duration_minutes,
            provider: new.provider,
            reason: new.reason,
            notes: new.notes,
            status: new.status.unwrap_or(AppointmentStatus::Scheduled),
            created_at: Utc::now(),
        };

        self.by_slot.insert(appointment.slot_key(), appointment.id);
        self.by_id.insert(appointment.id, appointment.clone());
        appointment
    }

    /// Merges non-identity fields. When the slot key changes the index is
    /// re-keyed in the same call; the maps are never left disagreeing.
    pub fn update(&mut self, id: Uuid, patch: AppointmentPatch) -> Result<Appointment, ScheduleError> {
        let current = self
            .by_id
            .get(&id)
            .cloned()
            .ok_or(ScheduleError::NotFound(id))?;

        let mut next = current.clone();
        if let Some(patient_id) = patch.patient_id {
            next.patient_id = patient_id;
        }
        if let Some(date) = patch.date {
            next.date = date;
        }
        if let Some(time) = patch.time {
            next.time = time;
        }
        if let Some(duration_minutes) = patch.duration_minutes {
            next.duration_minutes = duration_minutes;
        }
        if let Some(provider) = patch.provider {
            next.provider = provider;
        }
        if let Some(reason) = patch.reason {
            next.reason = reason;
        }
        if let Some(notes) = patch.notes {
            next.notes = notes;
        }
        if let Some(status) = patch.status {
            next.status = status;
        }

        if next.slot_key() != current.slot_key() {
            self.index_remove(&current);
            self.by_slot.insert(next.slot_key(), id);
        }
        self.by_id.insert(id, next.clone());
        Ok(next)
    }

    /// Removes the record from both maps. A second delete of the same id
    /// fails `NotFound`.
    pub fn delete(&mut self, id: Uuid) -> Result<(), ScheduleError> {
        let removed = self.by_id.remove(&id).ok_or(ScheduleError::NotFound(id))?;
        self.index_remove(&removed);
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> Option<&Appointment> {
        self.by_id.get(&id)
    }

    /// Filtered scan of the primary map. Order is meaningless; chronological
    /// callers sort by (date, time).
    pub fn list(&self, filter: &AppointmentFilter) -> Vec<Appointment> {
        self.by_id
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect()
    }

    /// O(1) slot lookup, the backbone of conflict checking.
    pub fn find_by_slot(
        &self,
        provider: &str,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Option<&Appointment> {
        let id = self.by_slot.get(&(provider.to_string(), date, time))?;
        self.by_id.get(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    fn index_remove(&mut self, appointment: &Appointment) {
        let key = appointment.slot_key();
        if self.by_slot.get(&key) == Some(&appointment.id) {
            self.by_slot.remove(&key);
        }
    }
}
