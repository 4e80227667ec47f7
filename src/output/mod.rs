pub mod formatter;

pub use formatter::{OutboundMessage, OutputFormatter};
