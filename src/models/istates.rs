//! # Door State Enums

//! This module defines the enums describing where a door is physically believed to be and which side of it a command
//! or reading belongs to. Both are parsed from bus strings with a total mapping: anything unrecognised falls back to a
//! catch-all variant instead of failing.

use serde::{Deserialize, Serialize};
use derive_more::Display;

/// Represents the believed physical state of the door.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Serialize, Deserialize, Display, Default)]
pub enum DoorState {
    /// The door sensor last reported the door as open.
    #[display("OPEN")]
    Open,
    /// The door sensor last reported the door as closed.
    #[display("CLOSED")]
    Closed,
    /// No usable report has been received.
    #[default]
    #[display("UNKNOWN")]
    Unknown,
}

impl DoorState {
    /// Maps a state string to a `DoorState`.
    ///
    /// Only the exact strings `"OPEN"` and `"CLOSED"` are recognised; every other input, including the empty string
    /// and differently-cased variants, maps to `DoorState::Unknown`.
    pub fn from_str_lossy(value: &str) -> Self {
        match value {
            "OPEN" => DoorState::Open,
            "CLOSED" => DoorState::Closed,
            _ => DoorState::Unknown,
        }
    }
}

impl From<&str> for DoorState {
    fn from(value: &str) -> Self {
        DoorState::from_str_lossy(value)
    }
}

/// Represents which half of a two-sided door a message relates to.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Serialize, Deserialize, Display, Default)]
pub enum DoorSide {
    #[display("A")]
    A,
    #[display("B")]
    B,
    /// No side given; display and buzzer commands go to both sides.
    #[default]
    #[display("Z")]
    Both,
}

impl DoorSide {
    /// The single character used for this side in topic names.
    pub fn as_char(&self) -> char {
        match self {
            DoorSide::A => 'A',
            DoorSide::B => 'B',
            DoorSide::Both => 'Z',
        }
    }

    /// Splits an optional `"A/"` or `"B/"` prefix off a message type.
    ///
    /// Returns the resolved side and the remaining type. A type without a recognised prefix is returned unchanged
    /// with `DoorSide::Both`.
    pub fn split_prefix(event_type: &str) -> (DoorSide, &str) {
        if let Some(rest) = event_type.strip_prefix("A/") {
            (DoorSide::A, rest)
        } else if let Some(rest) = event_type.strip_prefix("B/") {
            (DoorSide::B, rest)
        } else {
            (DoorSide::Both, event_type)
        }
    }
}
