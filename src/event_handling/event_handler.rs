use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{info, error};
use crate::controllers::GatekeeperDoor;
use crate::errors::{GatekeeperError, GatekeeperResult};
use crate::models::InboundEvent;
use crate::state_management::EventDispatcher;

/// Capacity of the channel between the bus consumer and the `EventHandler`.
pub const EVENT_QUEUE_CAPACITY: usize = 100;

/// The EventHandler owns every door controlled by this process and feeds them their events.
///
/// Events are processed one at a time in the order they were dispatched, so each door has a single writer and
/// needs no locking.
pub struct EventHandler {
    /// A queue for receiving `InboundEvent`s.
    event_queue: mpsc::Receiver<InboundEvent>,
    /// The doors, keyed by door id.
    doors: HashMap<i32, GatekeeperDoor>,
}

impl EventHandler {
    /// Creates a new `EventHandler` together with the `EventDispatcher` that feeds it.
    ///
    /// # Arguments
    ///
    /// * `doors` - The configured doors this handler will drive.
    pub fn new(doors: Vec<GatekeeperDoor>) -> (Self, EventDispatcher) {
        let (sender, receiver) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let doors = doors.into_iter().map(|door| (door.id(), door)).collect();
        (Self { event_queue: receiver, doors }, EventDispatcher::new(sender))
    }

    /// Runs the event handler, continuously processing events from the queue
    /// until every `EventDispatcher` has been dropped.
    pub async fn run(mut self) -> GatekeeperResult<()> {
        info!("EventHandler started with {} door(s)", self.doors.len());
        while let Some(event) = self.event_queue.recv().await {
            if let Err(e) = self.process_event(event).await {
                error!("Error processing event: {:?}", e);
            }
        }
        info!("EventHandler stopped");
        Ok(())
    }

    /// Routes one event to the door it is addressed to.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The door processed the event (including ignoring it)
    /// * `Err(GatekeeperError::DoorNotFound)` - No door with the event's id is handled here
    pub async fn process_event(&mut self, event: InboundEvent) -> GatekeeperResult<()> {
        let door = self.doors.get_mut(&event.door_id)
            .ok_or(GatekeeperError::DoorNotFound(event.door_id))?;
        door.handle(&event).await;
        Ok(())
    }

    pub fn door(&self, door_id: i32) -> Option<&GatekeeperDoor> {
        self.doors.get(&door_id)
    }

    pub fn door_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.doors.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
