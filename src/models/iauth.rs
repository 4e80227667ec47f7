//! # Authorization Results

//! Rows returned by the credential-checking stored procedures, and the door bell rows used to build a bell roster.

use serde::{Deserialize, Serialize};
use sqlx_oldapi::FromRow;

/// The answer to an RFID check.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, FromRow)]
pub struct AuthorizationOutcome {
    /// Text to show on the door LCD
    pub display_message: String,
    /// Handle of the person the card belongs to, empty if unknown
    pub handle: String,
    /// Human readable time since the person was last seen
    pub last_seen: String,
    /// The access decision as returned by the procedure; only `1` grants entry
    pub access_result: i32,
    /// Non-empty when the check itself failed, as opposed to a legitimate denial
    pub error: Option<String>,
}

impl AuthorizationOutcome {
    pub const ACCESS_GRANTED: i32 = 1;

    pub fn access_granted(&self) -> bool {
        self.access_result == Self::ACCESS_GRANTED
    }

    /// Returns the internal failure text, if any. Empty strings do not count as failures.
    pub fn failure(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}

/// The answer to a keypad PIN check.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, FromRow)]
pub struct PinOutcome {
    pub display_message: String,
    pub handle: String,
    pub error: Option<String>,
}

/// An instruction to publish `message` on `topic` when the door button is pressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DoorBell {
    #[sqlx(rename = "bell_topic")]
    pub topic: String,
    #[sqlx(rename = "bell_message")]
    pub message: String,
}

impl DoorBell {
    pub fn new(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            message: message.into(),
        }
    }
}
