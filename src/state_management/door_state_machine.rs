use tracing::{error, info};
use crate::models::DoorState;
use crate::services::DoorDatabase;

/// A state change accepted by the `DoorStateMachine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorStateTransition {
    pub previous: DoorState,
    pub current: DoorState,
}

/// Holds the believed physical state of one door and reconciles it against sensor reports.
///
/// Only changes are persisted. The write is best effort: the new state is adopted even if the database call fails,
/// so memory and database can drift until the next change is reported.
#[derive(Debug, Clone, Default)]
pub struct DoorStateMachine {
    state: DoorState,
}

impl DoorStateMachine {
    /// Creates a state machine from a configured state string; unrecognised strings start as `Unknown`.
    pub fn from_config(door_state: &str) -> Self {
        Self {
            state: DoorState::from_str_lossy(door_state),
        }
    }

    pub fn state(&self) -> DoorState {
        self.state
    }

    /// Applies a `DoorState` report.
    ///
    /// # Arguments
    ///
    /// * `door_id` - The door the report belongs to, passed through to the database
    /// * `payload` - The raw report; persisted verbatim when it changes the state
    /// * `db` - Where the change is recorded
    ///
    /// # Returns
    ///
    /// The transition if the report changed the state, `None` otherwise.
    pub async fn apply_report(&mut self, door_id: i32, payload: &str, db: &dyn DoorDatabase) -> Option<DoorStateTransition> {
        let candidate = DoorState::from_str_lossy(payload);
        if candidate == self.state {
            return None;
        }

        if let Err(e) = db.set_door_state(door_id, payload).await {
            error!(door_id, "Failed to persist door state {:?}: {:?}", payload, e);
        }

        let transition = DoorStateTransition {
            previous: self.state,
            current: candidate,
        };
        self.state = candidate;
        info!(door_id, "Door state {} -> {}", transition.previous, transition.current);
        Some(transition)
    }
}
