// src/schedule/view.rs
//
// Read-only projection of the store for presentation. Day and week grids are
// (slot x day); month collapses each day into a single cell. Computed fresh
// from the store and the active slot grid on every call, mutating neither.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::schedule::hhmm;
use crate::schedule::hours::BusinessHoursPolicy;
use crate::schedule::store::{Appointment, AppointmentFilter, AppointmentStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotCell {
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub appointments: Vec<Appointment>,
}

/// One day of the grid. Day/week granularities populate `cells`; month puts
/// the whole day's appointments in `appointments` with no slot split.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleDay {
    pub date: NaiveDate,
    pub cells: Vec<SlotCell>,
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleGrid {
    pub granularity: Granularity,
    #[serde(with = "hhmm::vec")]
    pub slots: Vec<NaiveTime>,
    pub days: Vec<ScheduleDay>,
}

pub fn project(
    store: &AppointmentStore,
    policy: &BusinessHoursPolicy,
    range: DateRange,
    granularity: Granularity,
    provider: Option<&str>,
) -> ScheduleGrid {
    let filter = AppointmentFilter {
        from: Some(range.from),
        to: Some(range.to),
        provider: provider.map(str::to_string),
        status: None,
    };

    let mut appointments = store.list(&filter);
    appointments.sort_by(|a, b| {
        (a.date, a.time, a.provider.as_str()).cmp(&(b.date, b.time, b.provider.as_str()))
    });

    let mut by_date: BTreeMap<NaiveDate, Vec<Appointment>> = BTreeMap::new();
    for appointment in appointments {
        by_date.entry(appointment.date).or_default().push(appointment);
    }

    let slots = match granularity {
        Granularity::Month => Vec::new(),
        Granularity::Day | Granularity::Week => policy.generate_slots(),
    };

    let mut days = Vec::new();
    for date in range.from.iter_days().take_while(|d| *d <= range.to) {
        let day_appointments = by_date.remove(&date).unwrap_or_default();

        let day = match granularity {
            Granularity::Month => ScheduleDay {
                date,
                cells: Vec::new(),
                appointments: day_appointments,
            },
            Granularity::Day | Granularity::Week => {
                // Seed one cell per grid slot; a stored time the narrowed
                // grid no longer produces still lands in its own cell, so
                // the projection never drops an appointment.
                let mut cells: BTreeMap<NaiveTime, Vec<Appointment>> =
                    slots.iter().map(|t| (*t, Vec::new())).collect();
                for appointment in day_appointments {
                    cells.entry(appointment.time).or_default().push(appointment);
                }
                ScheduleDay {
                    date,
                    cells: cells
                        .into_iter()
                        .map(|(time, appointments)| SlotCell { time, appointments })
                        .collect(),
                    appointments: Vec::new(),
                }
            }
        };
        days.push(day);
    }

    ScheduleGrid {
        granularity,
        slots,
        days,
    }
}
