pub mod db;
pub mod bus;
pub mod dbc;

pub use db::{DatabaseService, DoorDatabase};
pub use bus::{AmqpBus, MessageBus};
pub use dbc::database_client::DatabaseClient;
