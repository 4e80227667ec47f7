//! # Inbound Door Events

//! This module defines the `InboundEvent` delivered by the message bus to a door controller and the `EventKind`
//! routing key derived from its (side-stripped) type.

use serde::{Deserialize, Serialize};
use crate::models::DoorSide;

/// A message already demultiplexed to a single door.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// The door the message was addressed to
    pub door_id: i32,
    /// The message type, possibly carrying an `"A/"` or `"B/"` side prefix
    pub event_type: String,
    /// The raw message body; opaque until a handler interprets it
    pub payload: String,
}

impl InboundEvent {
    pub fn new(door_id: i32, event_type: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            door_id,
            event_type: event_type.into(),
            payload: payload.into(),
        }
    }
}

/// The handlers a door event can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Door sensor reported a state
    DoorState,
    /// Door bell button pressed
    DoorButton,
    /// Card presented to a reader
    Rfid,
    /// PIN entered on a keypad
    Keypad,
    /// Anything else; ignored
    Unhandled,
}

impl EventKind {
    /// Resolves a side-stripped message type. Matching is exact and case-sensitive.
    pub fn from_type(event_type: &str) -> Self {
        match event_type {
            "DoorState" => EventKind::DoorState,
            "DoorButton" => EventKind::DoorButton,
            "RFID" => EventKind::Rfid,
            "Keypad" => EventKind::Keypad,
            _ => EventKind::Unhandled,
        }
    }

    /// Splits the side prefix off `event_type` and resolves the remainder.
    pub fn resolve(event_type: &str) -> (DoorSide, EventKind) {
        let (side, stripped) = DoorSide::split_prefix(event_type);
        (side, EventKind::from_type(stripped))
    }
}
