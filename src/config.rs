//! # Configuration Management

//! This module handles the configuration loading and management for the gatekeeper door controller.
//! It leverages the `config` crate to provide a flexible and structured way to define and access configuration settings from various sources, including:

//! * YAML configuration files (default.yaml, development.yaml, production.yaml)
//! * Environment variables

//! The core of this module is the `Settings` struct, which encapsulates all the configuration settings required by the application.

use serde::Deserialize;
use config::{Config, Environment, File};
use std::env;
use std::path::PathBuf;
use secrecy::{Secret, ExposeSecret};
use tracing::debug;
use url::Url;
use crate::errors::{GatekeeperError, GatekeeperResult};

/// Represents the complete set of configuration settings for the gatekeeper.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Settings for connecting to the access-control database
    pub database: DatabaseSettings,
    /// Settings for application logging
    pub logging: LoggingSettings,
    /// Settings for connecting to the RabbitMQ message broker
    pub rabbitmq: RabbitMQSettings,
    /// Topic layout and hardware defaults shared by every door
    pub gatekeeper: GatekeeperSettings,
    /// The doors controlled by this process
    pub doors: Vec<DoorSettings>,
}

/// # Database Settings

/// This struct holds the configuration settings required to establish a connection to the access-control database
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    /// The hostname or IP address of the database server
    pub host: String,
    /// The port number on which the database server is listening
    pub port: u16,
    /// The username for database authentication (optional if using Windows authentication)
    pub username: Option<String>,
    /// The password for database authentication (optional if using Windows authentication)
    #[serde(default, deserialize_with = "deserialize_optional_secret")]
    pub password: Option<Secret<String>>,
    /// The name of the database to connect to
    pub database_name: String,
    /// The application name to be used in the connection string
    pub app_name: String,
    /// Whether to use Windows authentication (true) or SQL Server authentication (false)
    pub win_auth: bool,
    /// Whether to trust the server certificate (relevant for encrypted connections)
    pub trusted: bool,
}

impl DatabaseSettings {
    /// Constructs a connection string for the database based on the settings
    ///
    /// SQL Server authentication is used whenever both a username and a password are configured; otherwise Windows
    /// authentication must be enabled.
    ///
    /// # Returns
    ///
    /// * `Ok(Secret<String>)`: the connection string, kept secret
    /// * `Err(GatekeeperError::ConfigError)`: SQL Server authentication was selected without a complete credential pair
    pub fn connection_string(&self) -> GatekeeperResult<Secret<String>> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Ok(Secret::new(format!(
                "mssql://{}:{}@{}:{}/{}",
                username,
                password.expose_secret(),
                self.host,
                self.port,
                self.database_name
            ))),
            _ if self.win_auth => Ok(Secret::new(format!(
                "mssql://{}:{}/{}",
                self.host,
                self.port,
                self.database_name
            ))),
            _ => Err(GatekeeperError::ConfigError(
                "database username and password are required when win_auth is disabled".into(),
            )),
        }
    }
}

/// Holds the configuration settings for application logging
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    /// The logging level (e.g., "info", "debug", "error"), used when `RUST_LOG` is not set
    pub level: String,
    /// The directory path where log files will be stored (optional)
    pub path: Option<PathBuf>,
}

/// Holds the configuration settings required to establish a connection to the RabbitMQ message broker.
#[derive(Debug, Deserialize, Clone)]
pub struct RabbitMQSettings {
    /// The hostname or IP address of the RabbitMQ server
    pub host: String,
    /// The port number on which the RabbitMQ server is listening
    pub port: u16,
    /// The username for RabbitMQ authentication
    pub username: String,
    /// The password for RabbitMQ authentication
    #[serde(default, deserialize_with = "deserialize_optional_secret")]
    pub password: Option<Secret<String>>,
    /// The name of the topic exchange carrying door traffic
    pub exchange: String,
    /// The virtual host to connect to on the RabbitMQ server
    pub vhost: String,
    /// Prefix for the exclusive queue this process consumes from
    #[serde(default = "default_queue_prefix")]
    pub queue_prefix: String,
}

impl RabbitMQSettings {
    /// Constructs a connection string for RabbitMQ based on the settings.
    ///
    /// # Returns
    ///
    /// A `Secret<String>` containing the constructed connection string, or a configuration error if the host or
    /// credentials cannot be represented in a URL.
    pub fn connection_string(&self) -> GatekeeperResult<Secret<String>> {
        let mut url = Url::parse(&format!("amqp://{}:{}", self.host, self.port))
            .map_err(|e| GatekeeperError::ConfigError(format!("Invalid RabbitMQ URL: {}", e)))?;

        url.set_username(&self.username)
            .map_err(|_| GatekeeperError::ConfigError("Failed to set RabbitMQ username".into()))?;
        if let Some(password) = &self.password {
            url.set_password(Some(password.expose_secret()))
                .map_err(|_| GatekeeperError::ConfigError("Failed to set RabbitMQ password".into()))?;
        }
        url.set_path(&self.vhost);

        Ok(Secret::new(url.to_string()))
    }
}

/// Topic layout and hardware defaults shared by every door.
#[derive(Debug, Deserialize, Clone)]
pub struct GatekeeperSettings {
    /// Prefix of every inbound and outbound door topic
    pub base_topic: String,
    /// Base topic for "who entered" announcements
    pub entry_announce: String,
    /// Read timeout handed to each door, in seconds; informational for callers
    #[serde(default)]
    pub read_timeout: i32,
    /// How long LCD messages stay up, in milliseconds
    #[serde(default = "default_display_duration")]
    pub display_duration: u32,
    #[serde(default)]
    pub buzzer: BuzzerSettings,
}

/// Tone and length of the access-granted beep
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct BuzzerSettings {
    pub tone: u32,
    pub duration: u32,
}

impl Default for BuzzerSettings {
    fn default() -> Self {
        Self { tone: 1000, duration: 250 }
    }
}

/// Represents the configuration for a single door
#[derive(Debug, Deserialize, Clone)]
pub struct DoorSettings {
    /// The door id used in topics and database calls
    pub id: i32,
    /// Label used in door bell broadcasts and log lines
    pub short_name: String,
    /// Last known state ("OPEN", "CLOSED", anything else is unknown)
    #[serde(default)]
    pub door_state: String,
}

fn default_queue_prefix() -> String {
    "gatekeeper".into()
}

fn default_display_duration() -> u32 {
    2000
}

/// # Settings Initialization
///
/// The `Settings` implementation provides a `new` function to load and construct the configuration settings.
impl Settings {
    /// Loads and constructs the application settings from various configuration sources.
    ///
    /// This function reads configuration settings from the following sources, in order of precedence:
    ///
    /// 1. `default.yaml`: Contains default settings for the application
    /// 2. Environment-specific YAML file (e.g., `development.yaml` or `production.yaml`) based on the `RUN_MODE` environment variable
    /// 3. Environment variables prefixed with `APP` (e.g., `APP__DATABASE__HOST`)
    ///
    /// The `CONFIG_DIR` environment variable can be used to specify the directory where the YAML configuration files are located (defaults to "src/config").
    pub fn new() -> GatekeeperResult<Self> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let config_dir = env::var("CONFIG_DIR").unwrap_or_else(|_| "src/config".into());
        debug!("Run Mode: {:?}, Config Dir: {:?}", run_mode, config_dir);

        let s = Config::builder()
            .add_source(File::with_name(&format!("{}/default", config_dir)))
            .add_source(File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        let mut s: Self = s.try_deserialize::<Settings>()
            .map_err(GatekeeperError::from)?;

        if let Some(ref mut path) = s.logging.path {
            *path = env::current_dir()?.join(path.clone());
        }

        Ok(s)
    }
}

/// Deserializes a secret string from configuration into a `Secret<String>`
fn deserialize_optional_secret<'de, D>(deserializer: D) -> Result<Option<Secret<String>>, D::Error>
    where
        D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.map(Secret::new))
}
