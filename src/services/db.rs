//! # Database Services

//! This module defines the `DoorDatabase` contract a door controller relies on and the `DatabaseService` that fulfils
//! it by calling the access-control stored procedures. Credential checks, persistence and event logging all live on
//! the database side; the door only consumes their results.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx_oldapi::Mssql;
use tracing::debug;
use crate::config::DatabaseSettings;
use crate::errors::{GatekeeperError, GatekeeperResult};
use crate::models::{AuthorizationOutcome, DoorBell, PinOutcome};
use crate::services::DatabaseClient;

/// The database operations a door needs.
#[async_trait]
pub trait DoorDatabase: Send + Sync {
    /// Returns the bells to ring when the door button is pressed, in ring order.
    async fn get_door_bells(&self, door_id: i32) -> GatekeeperResult<Vec<DoorBell>>;

    /// Records a new door state string.
    async fn set_door_state(&self, door_id: i32, state: &str) -> GatekeeperResult<()>;

    /// Records that an event of `kind` happened at the door.
    async fn log_event(&self, kind: &str, door_id: i32) -> GatekeeperResult<()>;

    /// Checks a card against the door. A returned `error` means the check failed, not that access was denied.
    async fn check_rfid(&self, card: &str, door_id: i32) -> GatekeeperResult<AuthorizationOutcome>;

    /// Checks a keypad PIN against the door.
    async fn check_pin(&self, pin: &str, door_id: i32) -> GatekeeperResult<PinOutcome>;
}

/// Provides `DoorDatabase` over the access-control database
#[derive(Debug, Clone)]
pub struct DatabaseService {
    client: DatabaseClient,
}

impl DatabaseService {
    /// Creates a new `DatabaseService`, connecting with the given settings
    ///
    /// # Returns
    ///
    /// * `Ok(Self)`: The initialized `DatabaseService` instance
    /// * `Err(GatekeeperError)`: If the settings are incomplete or the connection fails
    pub async fn new(settings: &DatabaseSettings) -> GatekeeperResult<Self> {
        let client = DatabaseClient::new(
            settings.connection_string()?.expose_secret(),
            &settings.app_name,
        ).await?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DoorDatabase for DatabaseService {
    async fn get_door_bells(&self, door_id: i32) -> GatekeeperResult<Vec<DoorBell>> {
        sqlx_oldapi::query_as::<Mssql, DoorBell>("EXEC sp_gatekeeper_get_door_bells @p1")
            .bind(door_id)
            .fetch_all(&*self.client.pool)
            .await
            .map_err(GatekeeperError::DatabaseError)
    }

    async fn set_door_state(&self, door_id: i32, state: &str) -> GatekeeperResult<()> {
        debug!(door_id, state, "sp_set_door_state");
        sqlx_oldapi::query::<Mssql>("EXEC sp_set_door_state @p1, @p2")
            .bind(door_id)
            .bind(state)
            .execute(&*self.client.pool)
            .await
            .map_err(GatekeeperError::DatabaseError)?;
        Ok(())
    }

    async fn log_event(&self, kind: &str, door_id: i32) -> GatekeeperResult<()> {
        debug!(door_id, kind, "sp_log_event");
        sqlx_oldapi::query::<Mssql>("EXEC sp_log_event @p1, @p2")
            .bind(kind)
            .bind(door_id.to_string())
            .execute(&*self.client.pool)
            .await
            .map_err(GatekeeperError::DatabaseError)?;
        Ok(())
    }

    async fn check_rfid(&self, card: &str, door_id: i32) -> GatekeeperResult<AuthorizationOutcome> {
        sqlx_oldapi::query_as::<Mssql, AuthorizationOutcome>("EXEC sp_gatekeeper_check_rfid @p1, @p2")
            .bind(card)
            .bind(door_id)
            .fetch_optional(&*self.client.pool)
            .await
            .map_err(GatekeeperError::DatabaseError)?
            .ok_or_else(|| GatekeeperError::AuthorizationError("sp_gatekeeper_check_rfid returned no row".into()))
    }

    async fn check_pin(&self, pin: &str, door_id: i32) -> GatekeeperResult<PinOutcome> {
        sqlx_oldapi::query_as::<Mssql, PinOutcome>("EXEC sp_check_pin @p1, @p2")
            .bind(pin)
            .bind(door_id)
            .fetch_optional(&*self.client.pool)
            .await
            .map_err(GatekeeperError::DatabaseError)?
            .ok_or_else(|| GatekeeperError::AuthorizationError("sp_check_pin returned no row".into()))
    }
}
