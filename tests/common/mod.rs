//! In-memory collaborators for door tests.
//!
//! `MockDatabase` and `MockBus` append to one shared `CallLog`, so tests can assert the order of side effects
//! across the database and the bus.

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gatekeeper_door::config::BuzzerSettings;
use gatekeeper_door::controllers::{DoorOptions, GatekeeperDoor};
use gatekeeper_door::errors::{GatekeeperError, GatekeeperResult};
use gatekeeper_door::models::{AuthorizationOutcome, DoorBell, PinOutcome};
use gatekeeper_door::services::{DoorDatabase, MessageBus};

pub const BASE_TOPIC: &str = "nh/gk";
pub const DOOR_ID: i32 = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Publish { topic: String, payload: String },
    GetDoorBells(i32),
    SetDoorState(i32, String),
    LogEvent(String, i32),
    CheckRfid(String, i32),
    CheckPin(String, i32),
}

pub fn publish(topic: &str, payload: &str) -> Call {
    Call::Publish { topic: topic.to_string(), payload: payload.to_string() }
}

#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    /// Calls recorded after configuration finished.
    pub fn calls_after_setup(&self) -> Vec<Call> {
        self.calls().into_iter().filter(|c| !matches!(c, Call::GetDoorBells(_))).collect()
    }

    pub fn publishes(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Publish { topic, payload } => Some((topic, payload)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

fn unavailable(what: &str) -> GatekeeperError {
    GatekeeperError::IoError(io::Error::new(io::ErrorKind::TimedOut, format!("{} unavailable", what)))
}

#[derive(Debug, Default)]
struct MockDatabaseInner {
    bells: Vec<DoorBell>,
    bells_fail: bool,
    writes_fail: bool,
    rfid: Option<AuthorizationOutcome>,
    pin: Option<PinOutcome>,
}

/// Mock access-control database.
#[derive(Debug, Clone)]
pub struct MockDatabase {
    log: CallLog,
    inner: Arc<Mutex<MockDatabaseInner>>,
}

impl MockDatabase {
    pub fn new(log: CallLog) -> Self {
        Self { log, inner: Arc::default() }
    }

    pub fn with_bells(self, bells: &[(&str, &str)]) -> Self {
        self.inner.lock().unwrap().bells = bells.iter().map(|(t, m)| DoorBell::new(*t, *m)).collect();
        self
    }

    pub fn with_failing_bells(self) -> Self {
        self.inner.lock().unwrap().bells_fail = true;
        self
    }

    pub fn with_failing_writes(self) -> Self {
        self.inner.lock().unwrap().writes_fail = true;
        self
    }

    /// Answer for RFID checks; without one the check itself fails.
    pub fn with_rfid(self, outcome: AuthorizationOutcome) -> Self {
        self.inner.lock().unwrap().rfid = Some(outcome);
        self
    }

    /// Answer for PIN checks; without one the check itself fails.
    pub fn with_pin(self, outcome: PinOutcome) -> Self {
        self.inner.lock().unwrap().pin = Some(outcome);
        self
    }
}

#[async_trait]
impl DoorDatabase for MockDatabase {
    async fn get_door_bells(&self, door_id: i32) -> GatekeeperResult<Vec<DoorBell>> {
        self.log.push(Call::GetDoorBells(door_id));
        let inner = self.inner.lock().unwrap();
        if inner.bells_fail {
            return Err(unavailable("bells"));
        }
        Ok(inner.bells.clone())
    }

    async fn set_door_state(&self, door_id: i32, state: &str) -> GatekeeperResult<()> {
        self.log.push(Call::SetDoorState(door_id, state.to_string()));
        if self.inner.lock().unwrap().writes_fail {
            return Err(unavailable("set_door_state"));
        }
        Ok(())
    }

    async fn log_event(&self, kind: &str, door_id: i32) -> GatekeeperResult<()> {
        self.log.push(Call::LogEvent(kind.to_string(), door_id));
        if self.inner.lock().unwrap().writes_fail {
            return Err(unavailable("log_event"));
        }
        Ok(())
    }

    async fn check_rfid(&self, card: &str, door_id: i32) -> GatekeeperResult<AuthorizationOutcome> {
        self.log.push(Call::CheckRfid(card.to_string(), door_id));
        self.inner.lock().unwrap().rfid.clone().ok_or_else(|| unavailable("check_rfid"))
    }

    async fn check_pin(&self, pin: &str, door_id: i32) -> GatekeeperResult<PinOutcome> {
        self.log.push(Call::CheckPin(pin.to_string(), door_id));
        self.inner.lock().unwrap().pin.clone().ok_or_else(|| unavailable("check_pin"))
    }
}

/// Mock message bus recording every publish.
#[derive(Debug, Clone)]
pub struct MockBus {
    log: CallLog,
    fail: bool,
}

impl MockBus {
    pub fn new(log: CallLog) -> Self {
        Self { log, fail: false }
    }

    pub fn failing(log: CallLog) -> Self {
        Self { log, fail: true }
    }
}

#[async_trait]
impl MessageBus for MockBus {
    async fn publish(&self, topic: &str, payload: &str) -> GatekeeperResult<()> {
        self.log.push(publish(topic, payload));
        if self.fail {
            return Err(unavailable("bus"));
        }
        Ok(())
    }
}

pub fn door_options(door_state: &str) -> DoorOptions {
    DoorOptions {
        id: DOOR_ID,
        base_topic: BASE_TOPIC.to_string(),
        short_name: "Inner".to_string(),
        entry_announce: "nh/gk/entry_announce".to_string(),
        read_timeout: 10,
        door_state: door_state.to_string(),
        display_duration: 2000,
        buzzer: BuzzerSettings { tone: 1000, duration: 250 },
    }
}

pub async fn configured_door(door_state: &str, db: MockDatabase, bus: MockBus) -> GatekeeperDoor {
    GatekeeperDoor::configured(door_options(door_state), Arc::new(db), Arc::new(bus))
        .await
        .expect("door configures")
}

pub fn granted(message: &str, handle: &str) -> AuthorizationOutcome {
    AuthorizationOutcome {
        display_message: message.to_string(),
        handle: handle.to_string(),
        last_seen: "2 days".to_string(),
        access_result: AuthorizationOutcome::ACCESS_GRANTED,
        error: None,
    }
}

pub fn denied(message: &str) -> AuthorizationOutcome {
    AuthorizationOutcome {
        display_message: message.to_string(),
        access_result: 0,
        ..AuthorizationOutcome::default()
    }
}
