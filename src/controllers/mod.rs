pub mod gatekeeper_door;

pub use gatekeeper_door::{DoorOptions, GatekeeperDoor};
