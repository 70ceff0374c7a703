// src/schedule/mod.rs
//
// Appointment scheduling core: business-hours policy, the in-memory
// appointment store with its slot index, conflict resolution, the status
// state machine and the day/week/month projection. `service::ScheduleService`
// is the only entry point the rest of the server talks to.

pub mod conflict;
pub mod hours;
pub mod lifecycle;
pub mod service;
pub mod store;
pub mod view;

use uuid::Uuid;

use crate::schedule::store::AppointmentStatus;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("{0}")]
    Validation(String),

    #[error("time {0} is not a bookable slot under the current business hours")]
    SlotInvalid(String),

    #[error("appointment {0} not found")]
    NotFound(Uuid),

    #[error("slot is already taken by appointment {0}")]
    SlotOccupied(Uuid),

    #[error("status cannot change from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
}

/// Slot times travel as "HH:MM" strings on the wire.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }

    pub mod vec {
        use chrono::NaiveTime;
        use serde::Serializer;

        pub fn serialize<S>(times: &[NaiveTime], serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.collect_seq(times.iter().map(|t| t.format(super::FORMAT).to_string()))
        }
    }
}
