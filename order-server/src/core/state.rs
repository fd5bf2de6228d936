//! 服务器状态
//!
//! Everything a handler needs, cheap to clone (all members are pools,
//! channels or `Arc`s).

use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use shared::error::{AppError, ErrorCode};

use crate::core::Config;
use crate::db::DbService;
use crate::events::EventBus;
use crate::orders::{OrderIntake, OrderLifecycle};
use crate::payment::{MidtransGateway, PaymentGateway};
use crate::sessions::SessionManager;

#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub db: DbService,
    pub sessions: SessionManager,
    pub intake: OrderIntake,
    pub lifecycle: OrderLifecycle,
    pub events: EventBus,
    pub started_at: Instant,
    /// Cancelled on Ctrl-C; long-lived connections and tasks watch it
    pub shutdown: CancellationToken,
}

impl ServerState {
    /// Wire the services together around an injected gateway
    pub fn new(config: Config, db: DbService, gateway: Arc<dyn PaymentGateway>) -> Self {
        let events = EventBus::new(config.event_channel_capacity);
        let sessions = SessionManager::new(
            db.pool.clone(),
            config.session_ttl_millis(),
            config.allow_multiple_active_sessions,
        );
        let intake = OrderIntake::new(
            db.pool.clone(),
            sessions.clone(),
            gateway.clone(),
            config.order_reference_prefix.clone(),
        );
        let lifecycle = OrderLifecycle::new(
            db.pool.clone(),
            gateway,
            events.clone(),
            config.order_reference_prefix.clone(),
        );

        Self {
            config: Arc::new(config),
            db,
            sessions,
            intake,
            lifecycle,
            events,
            started_at: Instant::now(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Open the database and build the Midtrans gateway from config
    pub async fn initialize(config: Config) -> Result<Self, AppError> {
        if let Some(dir) = sqlite_parent_dir(&config.database_url) {
            std::fs::create_dir_all(dir).map_err(|e| {
                AppError::with_message(
                    ErrorCode::ConfigError,
                    format!("Cannot create database directory {dir}: {e}"),
                )
            })?;
        }

        let db = DbService::new(&config.database_url).await?;

        let gateway = MidtransGateway::new(
            config.midtrans_server_key.clone(),
            config.midtrans_is_production,
            config.midtrans_verify_status,
        )
        .map_err(|e| AppError::with_message(ErrorCode::ConfigError, e.to_string()))?;

        tracing::info!(
            production = config.midtrans_is_production,
            verify_status = config.midtrans_verify_status,
            "Midtrans gateway configured"
        );

        Ok(Self::new(config, db, Arc::new(gateway)))
    }
}

/// Directory part of a file-backed SQLite URL, if any
fn sqlite_parent_dir(url: &str) -> Option<&str> {
    let path = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next()?;
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    let (dir, _) = path.rsplit_once('/')?;
    (!dir.is_empty()).then_some(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_parent_dir() {
        assert_eq!(sqlite_parent_dir("sqlite:data/orders.db"), Some("data"));
        assert_eq!(sqlite_parent_dir("sqlite://var/db/orders.db?mode=rwc"), Some("var/db"));
        assert_eq!(sqlite_parent_dir("sqlite:orders.db"), None);
        assert_eq!(sqlite_parent_dir("sqlite::memory:"), None);
        assert_eq!(sqlite_parent_dir("postgres://x/y"), None);
    }
}
