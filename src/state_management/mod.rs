pub mod door_state_machine;
pub mod event_dispatcher;

pub use door_state_machine::{DoorStateMachine, DoorStateTransition};
pub use event_dispatcher::EventDispatcher;
