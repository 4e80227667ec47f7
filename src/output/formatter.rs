//! # Door Output Formatting

//! Renders the topics and fixed-width payloads the door hardware expects for LCD text and buzzer tones.
//! The hardware reads payloads into fixed-size buffers, so every payload is capped at the buffer capacity
//! (which counts a terminating null) and silently truncated rather than rejected.

use crate::models::DoorSide;

/// LCD payload buffer, terminator included: 4 duration digits and a separator leave 31 bytes of text.
pub const DISPLAY_PAYLOAD_CAPACITY: usize = 37;

/// Buzzer payload buffer: `ttttt:dddd` plus a terminator.
pub const BUZZER_PAYLOAD_CAPACITY: usize = 11;

/// A topic/payload pair ready to be handed to the message bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub topic: String,
    pub payload: String,
}

/// Truncates `payload` so it fits a buffer of `capacity` bytes including the terminator.
///
/// Truncation never splits a UTF-8 character, so the result may be a few bytes shorter than the limit.
pub fn bounded(mut payload: String, capacity: usize) -> String {
    let limit = capacity.saturating_sub(1);
    if payload.len() > limit {
        let mut cut = limit;
        while !payload.is_char_boundary(cut) {
            cut -= 1;
        }
        payload.truncate(cut);
    }
    payload
}

/// Builds the outbound topics and payloads for one door.
#[derive(Debug, Clone, Default)]
pub struct OutputFormatter {
    base_topic: String,
    door_id: i32,
}

impl OutputFormatter {
    pub fn new(base_topic: impl Into<String>, door_id: i32) -> Self {
        Self {
            base_topic: base_topic.into(),
            door_id,
        }
    }

    /// `{base}/{id}/Unlock`
    pub fn unlock_topic(&self) -> String {
        format!("{}/{}/Unlock", self.base_topic, self.door_id)
    }

    /// `{base}/DoorButton`; shared by every door under the same base topic.
    pub fn door_button_topic(&self) -> String {
        format!("{}/DoorButton", self.base_topic)
    }

    fn side_topic(&self, side: DoorSide, leaf: &str) -> String {
        format!("{}/{}/{}/{}", self.base_topic, self.door_id, side.as_char(), leaf)
    }

    /// Renders an LCD message: `dddd:text`, at most 36 payload bytes.
    pub fn display(&self, side: DoorSide, message: &str, duration: u32) -> OutboundMessage {
        OutboundMessage {
            topic: self.side_topic(side, "Display"),
            payload: bounded(format!("{:04}:{}", duration, message), DISPLAY_PAYLOAD_CAPACITY),
        }
    }

    /// Renders a buzzer command: `ttttt:dddd`.
    pub fn buzzer(&self, side: DoorSide, tone: u32, duration: u32) -> OutboundMessage {
        OutboundMessage {
            topic: self.side_topic(side, "Buzzer"),
            payload: bounded(format!("{:05}:{:04}", tone, duration), BUZZER_PAYLOAD_CAPACITY),
        }
    }
}
