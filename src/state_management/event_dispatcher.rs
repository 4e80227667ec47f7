use tokio::sync::mpsc;
use crate::errors::{GatekeeperError, GatekeeperResult};
use crate::models::InboundEvent;
use tracing::{debug, error};

/// Hands inbound door events from the bus consumer to the `EventHandler` that owns the doors.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    /// The sender end of a channel for dispatching events.
    event_sender: mpsc::Sender<InboundEvent>,
}

impl EventDispatcher {
    /// Creates a new `EventDispatcher`.
    ///
    /// # Arguments
    ///
    /// * `event_sender` - The sender end of a channel for dispatching events.
    pub fn new(event_sender: mpsc::Sender<InboundEvent>) -> Self {
        Self { event_sender }
    }

    /// Dispatches an event to the event handler.
    ///
    /// Waits for channel capacity, so events keep their delivery order.
    ///
    /// # Returns
    ///
    /// A `GatekeeperResult` indicating success or failure of the dispatch operation.
    pub async fn dispatch_event(&self, event: InboundEvent) -> GatekeeperResult<()> {
        debug!("Dispatching event: {:?}", event);
        self.event_sender.send(event).await
            .map_err(|e| {
                error!("Failed to dispatch event: {:?}", e);
                GatekeeperError::ChannelSendError(format!("Failed to dispatch event: {}", e))
            })
    }

    /// Checks if the event channel is still open and able to send events.
    pub fn is_channel_open(&self) -> bool {
        !self.event_sender.is_closed()
    }
}
