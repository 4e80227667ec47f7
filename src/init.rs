use std::sync::Arc;
use anyhow::Result;
use lapin::Consumer;
use crate::config::Settings;
use crate::controllers::{DoorOptions, GatekeeperDoor};
use crate::errors::GatekeeperResult;
use crate::event_handling::EventHandler;
use crate::services::{AmqpBus, DatabaseService, DoorDatabase, MessageBus};
use crate::state_management::EventDispatcher;


pub struct AppContext {
    pub settings: Arc<Settings>,
    pub db_service: Arc<DatabaseService>,
    pub bus: Arc<AmqpBus>,
    pub event_handler: EventHandler,
    pub dispatcher: EventDispatcher,
    pub consumer: Consumer,
}

/// Configures one `GatekeeperDoor` per configured door, in settings order.
pub async fn build_doors(
    settings: &Settings,
    db: Arc<dyn DoorDatabase>,
    bus: Arc<dyn MessageBus>,
) -> GatekeeperResult<Vec<GatekeeperDoor>> {
    let mut doors = Vec::with_capacity(settings.doors.len());
    for door in &settings.doors {
        let options = DoorOptions::from_settings(&settings.gatekeeper, door);
        doors.push(GatekeeperDoor::configured(options, Arc::clone(&db), Arc::clone(&bus)).await?);
    }
    Ok(doors)
}

/// Connects to the database and broker, configures every door and subscribes to their topics.
pub async fn initialize(settings: Settings) -> Result<AppContext> {
    let settings = Arc::new(settings);

    let db_service = Arc::new(
        DatabaseService::new(&settings.database)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create DatabaseService: {}", e))?,
    );
    let bus = Arc::new(
        AmqpBus::connect(&settings.rabbitmq)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to message bus: {}", e))?,
    );

    let doors = build_doors(
        &settings,
        Arc::clone(&db_service) as Arc<dyn DoorDatabase>,
        Arc::clone(&bus) as Arc<dyn MessageBus>,
    ).await?;

    let (event_handler, dispatcher) = EventHandler::new(doors);

    let consumer = bus.subscribe(&settings.gatekeeper.base_topic, &event_handler.door_ids()).await?;

    Ok(AppContext {
        settings,
        db_service,
        bus,
        event_handler,
        dispatcher,
        consumer,
    })
}
