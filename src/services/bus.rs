//! # Message Bus

//! This module defines the `MessageBus` contract used by door controllers to publish commands, and `AmqpBus`, its
//! RabbitMQ implementation. Door topics are `/`-separated; on the wire they travel as routing keys on a topic
//! exchange with `/` mapped to `.`, so per-door bindings can use the `#` wildcard.

use async_trait::async_trait;
use futures::StreamExt;
use lapin::options::{
    BasicConsumeOptions, BasicPublishOptions, ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, Consumer, ExchangeKind};
use secrecy::ExposeSecret;
use tracing::{debug, error, info, warn};
use crate::config::RabbitMQSettings;
use crate::errors::GatekeeperResult;
use crate::models::InboundEvent;
use crate::state_management::EventDispatcher;

/// Publishes a payload on a topic. Delivery is fire-and-forget from the caller's point of view.
#[async_trait]
pub trait MessageBus: Send + Sync {
    async fn publish(&self, topic: &str, payload: &str) -> GatekeeperResult<()>;
}

/// Converts a door topic into an AMQP routing key.
pub fn routing_key(topic: &str) -> String {
    topic.replace('/', ".")
}

/// Converts an AMQP routing key back into a door topic.
pub fn topic_from_routing_key(key: &str) -> String {
    key.replace('.', "/")
}

/// Splits `{base_topic}/{id}/{rest}` into the door id and the message type `rest`.
///
/// Returns `None` for topics outside the base topic, without a numeric door id, or without a type.
pub fn parse_door_topic<'a>(base_topic: &str, topic: &'a str) -> Option<(i32, &'a str)> {
    let rest = topic.strip_prefix(base_topic)?.strip_prefix('/')?;
    let (id, event_type) = rest.split_once('/')?;
    let id = id.parse::<i32>().ok()?;
    if event_type.is_empty() {
        return None;
    }
    Some((id, event_type))
}

/// Topic leaves the door itself publishes. They share the per-door binding with inbound traffic.
const DOOR_COMMANDS: [&str; 3] = ["Unlock", "Display", "Buzzer"];

/// True for `Unlock`, `{side}/Display` and `{side}/Buzzer`, i.e. commands echoed back from our own publishes.
pub fn is_door_command(event_type: &str) -> bool {
    let leaf = event_type.rsplit('/').next().unwrap_or(event_type);
    DOOR_COMMANDS.contains(&leaf)
}

/// `MessageBus` over a RabbitMQ topic exchange
pub struct AmqpBus {
    /// Kept so the connection lives as long as the bus
    _connection: Connection,
    channel: Channel,
    exchange: String,
    queue_prefix: String,
}

impl AmqpBus {
    /// Connects to the broker and declares the door exchange.
    pub async fn connect(settings: &RabbitMQSettings) -> GatekeeperResult<Self> {
        let uri = settings.connection_string()?;
        let connection = Connection::connect(uri.expose_secret(), ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;

        channel
            .exchange_declare(
                &settings.exchange,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    ..ExchangeDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await?;

        info!(exchange = %settings.exchange, "Connected to message bus");
        Ok(Self {
            _connection: connection,
            channel,
            exchange: settings.exchange.clone(),
            queue_prefix: settings.queue_prefix.clone(),
        })
    }

    /// Declares an exclusive queue bound to `{base_topic}/{id}/#` for each door id and starts consuming from it.
    pub async fn subscribe(&self, base_topic: &str, door_ids: &[i32]) -> GatekeeperResult<Consumer> {
        let queue = self
            .channel
            .queue_declare(
                "",
                QueueDeclareOptions {
                    exclusive: true,
                    auto_delete: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await?;

        for id in door_ids {
            let binding = routing_key(&format!("{}/{}/#", base_topic, id));
            debug!(queue = queue.name().as_str(), %binding, "Binding door queue");
            self.channel
                .queue_bind(
                    queue.name().as_str(),
                    &self.exchange,
                    &binding,
                    QueueBindOptions::default(),
                    FieldTable::default(),
                )
                .await?;
        }

        let consumer = self
            .channel
            .basic_consume(
                queue.name().as_str(),
                &format!("{}-{}", self.queue_prefix, std::process::id()),
                BasicConsumeOptions {
                    no_ack: true,
                    ..BasicConsumeOptions::default()
                },
                FieldTable::default(),
            )
            .await?;

        info!(doors = door_ids.len(), "Subscribed to door topics");
        Ok(consumer)
    }

    /// Forwards every delivery addressed to a door into the dispatcher, in delivery order. Door commands are skipped.
    ///
    /// Returns when the consumer stream ends or the dispatcher's channel is closed.
    pub async fn forward(mut consumer: Consumer, base_topic: String, dispatcher: EventDispatcher) -> GatekeeperResult<()> {
        while let Some(delivery) = consumer.next().await {
            let delivery = match delivery {
                Ok(delivery) => delivery,
                Err(e) => {
                    error!("Message bus delivery error: {:?}", e);
                    continue;
                }
            };

            let topic = topic_from_routing_key(delivery.routing_key.as_str());
            let Some((door_id, event_type)) = parse_door_topic(&base_topic, &topic) else {
                debug!(%topic, "Ignoring message outside door topics");
                continue;
            };
            if is_door_command(event_type) {
                continue;
            }

            let payload = String::from_utf8_lossy(&delivery.data).into_owned();
            dispatcher
                .dispatch_event(InboundEvent::new(door_id, event_type, payload))
                .await?;
        }
        warn!("Message bus consumer stream ended");
        Ok(())
    }
}

#[async_trait]
impl MessageBus for AmqpBus {
    async fn publish(&self, topic: &str, payload: &str) -> GatekeeperResult<()> {
        debug!(%topic, %payload, "Publishing");
        self.channel
            .basic_publish(
                &self.exchange,
                &routing_key(topic),
                BasicPublishOptions::default(),
                payload.as_bytes(),
                BasicProperties::default(),
            )
            .await?;
        Ok(())
    }
}
