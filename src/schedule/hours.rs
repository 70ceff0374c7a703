// src/schedule/hours.rs

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::schedule::ScheduleError;

/// Appointment granularities the clinic can pick from.
pub const ALLOWED_INTERVALS: [u32; 3] = [15, 30, 60];

/// The operating window must cover at least this many hours.
pub const MIN_WINDOW_HOURS: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessHoursConfig {
    pub start_hour: u8,
    pub end_hour: u8,
    pub interval_minutes: u32,
}

impl Default for BusinessHoursConfig {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 17,
            interval_minutes: 30,
        }
    }
}

impl BusinessHoursConfig {
    /// Checks every configuration invariant; the error names the violated
    /// constraint so the caller can surface it verbatim.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.start_hour >= 24 {
            return Err(ScheduleError::Validation(
                "startHour must be between 0 and 23".into(),
            ));
        }
        if self.end_hour >= 24 {
            return Err(ScheduleError::Validation(
                "endHour must be between 0 and 23".into(),
            ));
        }
        if self.start_hour >= self.end_hour {
            return Err(ScheduleError::Validation(
                "startHour must be before endHour".into(),
            ));
        }
        if self.end_hour - self.start_hour < MIN_WINDOW_HOURS {
            return Err(ScheduleError::Validation(
                "operating window must span at least 2 hours".into(),
            ));
        }
        if !ALLOWED_INTERVALS.contains(&self.interval_minutes) {
            return Err(ScheduleError::Validation(
                "intervalMinutes must be one of 15, 30 or 60".into(),
            ));
        }
        Ok(())
    }
}

/// Holds the validated operating window and derives the bookable slot grid.
/// The active config is only ever replaced wholesale.
#[derive(Debug, Clone)]
pub struct BusinessHoursPolicy {
    config: BusinessHoursConfig,
}

impl BusinessHoursPolicy {
    pub fn new(config: BusinessHoursConfig) -> Result<Self, ScheduleError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> BusinessHoursConfig {
        self.config
    }

    /// Validates and swaps the active configuration. On failure the prior
    /// configuration stays in effect.
    pub fn set_config(&mut self, config: BusinessHoursConfig) -> Result<(), ScheduleError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// The ordered slot grid: slot k starts at `start_hour:00 + k * interval`.
    /// Recomputed on demand, never cached across config changes.
    pub fn generate_slots(&self) -> Vec<NaiveTime> {
        let open = u32::from(self.config.start_hour) * 60;
        let span = u32::from(self.config.end_hour - self.config.start_hour) * 60;
        let count = span / self.config.interval_minutes;

        (0..count)
            .map(|k| minutes_to_time(open + k * self.config.interval_minutes))
            .collect()
    }

    /// True iff `time` falls inside `[start_hour:00, end_hour:00)`.
    pub fn is_within_hours(&self, time: NaiveTime) -> bool {
        let minute_of_day = time.hour() * 60 + time.minute();
        let open = u32::from(self.config.start_hour) * 60;
        let close = u32::from(self.config.end_hour) * 60;
        (open..close).contains(&minute_of_day)
    }

    /// True iff `time` is a value `generate_slots` would produce right now.
    pub fn is_grid_slot(&self, time: NaiveTime) -> bool {
        if !self.is_within_hours(time) || time.second() != 0 {
            return false;
        }
        let minute_of_day = time.hour() * 60 + time.minute();
        let open = u32::from(self.config.start_hour) * 60;
        (minute_of_day - open) % self.config.interval_minutes == 0
    }
}

fn minutes_to_time(minutes: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).unwrap()
}
