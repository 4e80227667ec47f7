use std::sync::Arc;
use chrono::NaiveDateTime;
use tracing::{debug, error, info, warn};

use crate::config::{BuzzerSettings, DoorSettings, GatekeeperSettings};
use crate::errors::{GatekeeperError, GatekeeperResult};
use crate::models::{local_now, DoorBell, DoorSide, DoorState, EventKind, InboundEvent, PinOutcome};
use crate::output::{OutboundMessage, OutputFormatter};
use crate::services::{DoorDatabase, MessageBus};
use crate::state_management::DoorStateMachine;

/// Event kind logged when the door bell button is pressed
pub const DOORBELL_EVENT: &str = "DOORBELL";

/// Shown on the LCD when a card check could not be completed
pub const INTERNAL_ERROR_MESSAGE: &str = "Access Denied: internal error";

/// Everything a door needs to know about itself, gathered from the settings.
#[derive(Debug, Clone)]
pub struct DoorOptions {
    pub id: i32,
    pub base_topic: String,
    pub short_name: String,
    pub entry_announce: String,
    pub read_timeout: i32,
    /// Initial state string; anything other than "OPEN" or "CLOSED" starts the door as unknown
    pub door_state: String,
    pub display_duration: u32,
    pub buzzer: BuzzerSettings,
}

impl DoorOptions {
    pub fn from_settings(gatekeeper: &GatekeeperSettings, door: &DoorSettings) -> Self {
        Self {
            id: door.id,
            base_topic: gatekeeper.base_topic.clone(),
            short_name: door.short_name.clone(),
            entry_announce: gatekeeper.entry_announce.clone(),
            read_timeout: gatekeeper.read_timeout,
            door_state: door.door_state.clone(),
            display_duration: gatekeeper.display_duration,
            buzzer: gatekeeper.buzzer,
        }
    }
}

/// The database and bus a configured door talks to. Both outlive the door.
#[derive(Clone)]
struct Collaborators {
    db: Arc<dyn DoorDatabase>,
    bus: Arc<dyn MessageBus>,
}

/// The controller for a single access-controlled door.
///
/// A door starts out unconfigured and inert; `configure` binds its identity, topics and collaborators once, after
/// which `process_event` reacts to door sensor, door button, card reader and keypad messages.
#[derive(Default)]
pub struct GatekeeperDoor {
    id: i32,
    base_topic: String,
    short_name: String,
    entry_announce: String,
    read_timeout: i32,
    state_machine: DoorStateMachine,
    bell_roster: Vec<DoorBell>,
    last_valid_read: Option<NaiveDateTime>,
    current_handle: String,
    last_seen: String,
    formatter: OutputFormatter,
    display_duration: u32,
    buzzer: BuzzerSettings,
    collaborators: Option<Collaborators>,
}

impl GatekeeperDoor {
    /// Creates an unconfigured door; every event is ignored until `configure` is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and configures a door in one step.
    pub async fn configured(
        options: DoorOptions,
        db: Arc<dyn DoorDatabase>,
        bus: Arc<dyn MessageBus>,
    ) -> GatekeeperResult<Self> {
        let mut door = Self::new();
        door.configure(options, db, bus).await?;
        Ok(door)
    }

    /// Binds the door's identity and collaborators and loads its bell roster.
    ///
    /// A failure to load the bell roster is logged and leaves the roster empty; the door still works.
    ///
    /// # Returns
    ///
    /// * `Ok(())` once configured
    /// * `Err(GatekeeperError::ConfigError)` if the door was already configured
    pub async fn configure(
        &mut self,
        options: DoorOptions,
        db: Arc<dyn DoorDatabase>,
        bus: Arc<dyn MessageBus>,
    ) -> GatekeeperResult<()> {
        if self.collaborators.is_some() {
            return Err(GatekeeperError::ConfigError(format!("door {} is already configured", self.id)));
        }

        self.id = options.id;
        self.formatter = OutputFormatter::new(options.base_topic.clone(), options.id);
        self.base_topic = options.base_topic;
        self.short_name = options.short_name;
        self.entry_announce = options.entry_announce;
        self.read_timeout = options.read_timeout;
        self.display_duration = options.display_duration;
        self.buzzer = options.buzzer;

        self.bell_roster = match db.get_door_bells(self.id).await {
            Ok(bells) => bells,
            Err(e) => {
                error!(door = %self.short_name, id = self.id, "Failed to load door bells: {:?}", e);
                Vec::new()
            }
        };
        debug!(door = %self.short_name, "Door button will ring:");
        for bell in &self.bell_roster {
            debug!(door = %self.short_name, "\t{}\t{}", bell.topic, bell.message);
        }

        self.state_machine = DoorStateMachine::from_config(&options.door_state);
        self.collaborators = Some(Collaborators { db, bus });

        info!(door = %self.short_name, id = self.id, state = %self.state(), "Configured");
        Ok(())
    }

    /// Processes an event delivered to this door.
    pub async fn handle(&mut self, event: &InboundEvent) {
        self.process_event(&event.event_type, &event.payload).await
    }

    /// Reacts to one message addressed to this door.
    ///
    /// `event_type` may carry an `"A/"` or `"B/"` prefix naming the side of the door the message came from; display
    /// and buzzer output goes back to that side, or to both (`Z`) when no prefix is present. Unknown types are
    /// ignored. Collaborator failures are logged and never abort the remaining side effects.
    pub async fn process_event(&mut self, event_type: &str, payload: &str) {
        let Some(Collaborators { db, bus }) = self.collaborators.clone() else {
            return;
        };

        let (side, kind) = EventKind::resolve(event_type);
        debug!(door = %self.short_name, ?side, ?kind, %payload, "Processing event {}", event_type);

        match kind {
            EventKind::DoorState => {
                if self.state_machine.apply_report(self.id, payload, db.as_ref()).await.is_none() {
                    debug!(door = %self.short_name, "Door state unchanged: {}", payload);
                }
            }
            EventKind::DoorButton => self.ring_bells(db.as_ref(), bus.as_ref()).await,
            EventKind::Rfid => self.check_card(side, payload, db.as_ref(), bus.as_ref()).await,
            EventKind::Keypad => self.check_pin(payload, db.as_ref(), bus.as_ref()).await,
            EventKind::Unhandled => {}
        }
    }

    async fn ring_bells(&self, db: &dyn DoorDatabase, bus: &dyn MessageBus) {
        for bell in &self.bell_roster {
            self.send(bus, &bell.topic, &bell.message).await;
        }

        // Door name for the matrix displays and chat bridges
        self.send(bus, &self.formatter.door_button_topic(), &self.short_name).await;

        if let Err(e) = db.log_event(DOORBELL_EVENT, self.id).await {
            error!(door = %self.short_name, "Failed to log door bell: {:?}", e);
        }
    }

    async fn check_card(&mut self, side: DoorSide, card: &str, db: &dyn DoorDatabase, bus: &dyn MessageBus) {
        let outcome = match db.check_rfid(card, self.id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(door = %self.short_name, "Call to sp_gatekeeper_check_rfid failed: {:?}", e);
                self.display_message_lcd(bus, side, INTERNAL_ERROR_MESSAGE).await;
                return;
            }
        };

        self.current_handle = outcome.handle.clone();
        self.last_seen = outcome.last_seen.clone();

        if let Some(failure) = outcome.failure() {
            error!(door = %self.short_name, "Call to sp_gatekeeper_check_rfid failed: {}", failure);
            self.display_message_lcd(bus, side, INTERNAL_ERROR_MESSAGE).await;
            return;
        }

        self.display_message_lcd(bus, side, &outcome.display_message).await;

        if outcome.access_granted() {
            info!(door = %self.short_name, handle = %outcome.handle, "Access granted");
            self.beep(bus, side).await;
            self.send(bus, &self.formatter.unlock_topic(), "1").await;
            self.last_valid_read = Some(local_now());
        } else {
            info!(door = %self.short_name, "Access denied: {}", outcome.display_message);
        }
    }

    // The check's display text goes to the unlock topic whether or not the PIN was accepted.
    async fn check_pin(&mut self, pin: &str, db: &dyn DoorDatabase, bus: &dyn MessageBus) {
        let outcome = match db.check_pin(pin, self.id).await {
            Ok(outcome) => {
                self.current_handle = outcome.handle.clone();
                outcome
            }
            Err(e) => {
                error!(door = %self.short_name, "Call to sp_check_pin failed: {:?}", e);
                PinOutcome::default()
            }
        };
        debug!(door = %self.short_name, "err = [{}]", outcome.error.as_deref().unwrap_or_default());

        self.send(bus, &self.formatter.unlock_topic(), &outcome.display_message).await;
    }

    /// Shows `message` on the LCD of one side of the door.
    async fn display_message_lcd(&self, bus: &dyn MessageBus, side: DoorSide, message: &str) {
        let OutboundMessage { topic, payload } = self.formatter.display(side, message, self.display_duration);
        self.send(bus, &topic, &payload).await;
    }

    async fn beep(&self, bus: &dyn MessageBus, side: DoorSide) {
        let OutboundMessage { topic, payload } = self.formatter.buzzer(side, self.buzzer.tone, self.buzzer.duration);
        self.send(bus, &topic, &payload).await;
    }

    async fn send(&self, bus: &dyn MessageBus, topic: &str, payload: &str) {
        if let Err(e) = bus.publish(topic, payload).await {
            warn!(door = %self.short_name, %topic, "Failed to publish: {:?}", e);
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn base_topic(&self) -> &str {
        &self.base_topic
    }

    pub fn entry_announce(&self) -> &str {
        &self.entry_announce
    }

    /// Read timeout in seconds; not enforced by the door itself.
    pub fn read_timeout(&self) -> i32 {
        self.read_timeout
    }

    pub fn state(&self) -> DoorState {
        self.state_machine.state()
    }

    pub fn bell_roster(&self) -> &[DoorBell] {
        &self.bell_roster
    }

    /// When access was last granted by card, if ever.
    pub fn last_valid_read(&self) -> Option<NaiveDateTime> {
        self.last_valid_read
    }

    /// Handle returned by the most recent credential check. Never cleared.
    pub fn current_handle(&self) -> &str {
        &self.current_handle
    }

    pub fn last_seen(&self) -> &str {
        &self.last_seen
    }

    pub fn is_configured(&self) -> bool {
        self.collaborators.is_some()
    }
}
