// src/schedule/lifecycle.rs
//
// The status state machine: `scheduled` is the only state with outgoing
// edges; completed, cancelled and no-show are terminal.

use tracing::warn;

use crate::schedule::store::AppointmentStatus;
use crate::schedule::ScheduleError;

/// All statuses an appointment may move to from `from`.
pub fn valid_transitions(from: AppointmentStatus) -> &'static [AppointmentStatus] {
    match from {
        AppointmentStatus::Scheduled => &[
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::NoShow,
        ],
        AppointmentStatus::Completed
        | AppointmentStatus::Cancelled
        | AppointmentStatus::NoShow => &[],
    }
}

/// Rejects everything the table above does not allow, including same-state
/// and terminal-to-anything requests.
pub fn validate(from: AppointmentStatus, to: AppointmentStatus) -> Result<(), ScheduleError> {
    if valid_transitions(from).contains(&to) {
        Ok(())
    } else {
        warn!("rejected status transition {from} -> {to}");
        Err(ScheduleError::InvalidTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AppointmentStatus::*;

    #[test]
    fn scheduled_reaches_every_terminal_state() {
        for to in [Completed, Cancelled, NoShow] {
            assert!(validate(Scheduled, to).is_ok());
        }
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        for from in [Completed, Cancelled, NoShow] {
            assert!(valid_transitions(from).is_empty());
            for to in [Scheduled, Completed, Cancelled, NoShow] {
                assert_eq!(
                    validate(from, to),
                    Err(ScheduleError::InvalidTransition { from, to })
                );
            }
        }
    }

    #[test]
    fn same_state_is_rejected() {
        assert_eq!(
            validate(Scheduled, Scheduled),
            Err(ScheduleError::InvalidTransition {
                from: Scheduled,
                to: Scheduled
            })
        );
    }

    #[test]
    fn completed_then_cancelled_is_rejected() {
        assert!(validate(Scheduled, Completed).is_ok());
        assert_eq!(
            validate(Completed, Cancelled),
            Err(ScheduleError::InvalidTransition {
                from: Completed,
                to: Cancelled
            })
        );
    }
}
