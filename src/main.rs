use anyhow::Result;
use tracing::{error, info};
use tokio::signal::ctrl_c;
use gatekeeper_door::config::Settings;
use gatekeeper_door::init;
use gatekeeper_door::services::AmqpBus;
use gatekeeper_door::utils::logging;

/// The main entry point of the gatekeeper door controller
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Application error: {}", e);
        std::process::exit(1);
    }
}


/// The core logic of the gatekeeper
///
/// This asynchronous function performs the following steps:
/// 1. Loads application settings from configuration files
/// 2. Initializes the logging system
/// 3. Connects to the database and message broker and configures every door
/// 4. Forwards door messages from the broker to the `EventHandler`
/// 5. Runs until the consumer or handler stops, or a shutdown signal is received
async fn run() -> Result<()> {
    let settings = Settings::new()?;
    let _guard = logging::init_logger(&settings.logging.level, settings.logging.path.clone())?;

    let ctx = init::initialize(settings).await?;
    info!("Gatekeeper started for doors {:?}", ctx.event_handler.door_ids());

    let base_topic = ctx.settings.gatekeeper.base_topic.clone();
    let mut consumer_task = tokio::spawn(AmqpBus::forward(ctx.consumer, base_topic, ctx.dispatcher));
    let mut handler_task = tokio::spawn(ctx.event_handler.run());

    tokio::select! {
        result = &mut consumer_task => {
            match result {
                Ok(Ok(())) => info!("Message bus consumer finished"),
                Ok(Err(e)) => error!("Message bus consumer error: {:?}", e),
                Err(e) => error!("Message bus consumer task failed: {:?}", e),
            }
        }
        result = &mut handler_task => {
            match result {
                Ok(Ok(())) => info!("EventHandler finished"),
                Ok(Err(e)) => error!("EventHandler error: {:?}", e),
                Err(e) => error!("EventHandler task failed: {:?}", e),
            }
        }
        _ = ctrl_c() => {
            info!("Received shutdown signal. Shutting down gracefully...");
        }
    }

    consumer_task.abort();
    handler_task.abort();
    Ok(())
}
