/// # Gatekeeper Errors
/// This module defines the `GatekeeperError` enum, which encapsulates the errors that can surface while a door controller
/// talks to its collaborators (database, message broker) or while the application is being configured and started.
/// Inside the door event path these errors are logged and swallowed; they only propagate out of start-up code.


use thiserror::Error;
use sqlx_oldapi::Error as SqlxError;
use std::io;
use tokio::sync::mpsc::error::SendError;

#[derive(Error, Debug)]
pub enum GatekeeperError {
    /// Represents errors originating from database interactions.
    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    /// Represents errors raised by the message broker client.
    #[error("Message bus error: {0}")]
    BusError(#[from] lapin::Error),

    /// Represents errors arising from misconfigurations or invalid settings.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Represents errors during the initialization of the logging system.
    #[error("Logging initialization error: {0}")]
    LoggingError(String),

    /// Represents errors when sending data over a channel.
    #[error("Channel send error: {0}")]
    ChannelSendError(String),

    /// The authorization stored procedure ran but did not produce a usable answer.
    #[error("Authorization error: {0}")]
    AuthorizationError(String),

    /// Represents an event addressed to a door this process does not control.
    #[error("Door not found: {0}")]
    DoorNotFound(i32),
}

impl<T> From<SendError<T>> for GatekeeperError {
    fn from(err: SendError<T>) -> Self {
        GatekeeperError::ChannelSendError(err.to_string())
    }
}

impl From<config::ConfigError> for GatekeeperError {
    fn from(err: config::ConfigError) -> Self {
        GatekeeperError::ConfigError(err.to_string())
    }
}

pub type GatekeeperResult<T> = Result<T, GatekeeperError>;
