//! Order server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Order server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    /// SQLite connection URL
    pub database_url: String,
    /// HTTP/WebSocket port
    pub http_port: u16,
    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Daily rolling log directory (console only when unset)
    pub log_dir: Option<String>,
    /// Table session lifetime in seconds
    pub session_ttl_secs: u64,
    /// Issue a new session per scan even if the table already has a live one
    pub allow_multiple_active_sessions: bool,
    /// Period of the stale-session purge task in seconds
    pub session_purge_interval_secs: u64,
    /// Midtrans server key (basic auth + notification signature)
    pub midtrans_server_key: String,
    /// Use production endpoints instead of sandbox
    pub midtrans_is_production: bool,
    /// Re-read the transaction status from the gateway for each notification
    pub midtrans_verify_status: bool,
    /// Prefix of external order references (`<prefix>-<orderId>-<millis>`)
    pub order_reference_prefix: String,
    /// Broadcast buffer for realtime events
    pub event_channel_capacity: usize,
}

impl Config {
    /// Session TTL in milliseconds, the unit timestamps are stored in
    pub fn session_ttl_millis(&self) -> i64 {
        i64::try_from(self.session_ttl_secs.saturating_mul(1000)).unwrap_or(i64::MAX)
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Load configuration from environment variables (after `.env`)
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".into());

        let order_reference_prefix =
            lookup("ORDER_REFERENCE_PREFIX").unwrap_or_else(|| "ORDER".into());
        if order_reference_prefix.is_empty() || order_reference_prefix.contains('-') {
            return Err("ORDER_REFERENCE_PREFIX must be non-empty and must not contain '-'".into());
        }

        let event_channel_capacity = parse_or(&lookup, "EVENT_CHANNEL_CAPACITY", 256usize)?;
        if event_channel_capacity == 0 {
            return Err("EVENT_CHANNEL_CAPACITY must be greater than zero".into());
        }

        let session_purge_interval_secs = parse_or(&lookup, "SESSION_PURGE_INTERVAL_SECS", 3600u64)?;
        if session_purge_interval_secs == 0 {
            return Err("SESSION_PURGE_INTERVAL_SECS must be greater than zero".into());
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| "sqlite:data/orders.db".into()),
            http_port: parse_or(&lookup, "HTTP_PORT", 3000u16)?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_dir: lookup("LOG_DIR").filter(|s| !s.is_empty()),
            session_ttl_secs: parse_or(&lookup, "SESSION_TTL_SECS", 4 * 60 * 60)?,
            allow_multiple_active_sessions: parse_or(&lookup, "ALLOW_MULTIPLE_ACTIVE_SESSIONS", true)?,
            session_purge_interval_secs,
            midtrans_server_key: require_secret(&lookup, "MIDTRANS_SERVER_KEY", &environment)?,
            midtrans_is_production: parse_or(&lookup, "MIDTRANS_IS_PRODUCTION", false)?,
            midtrans_verify_status: parse_or(&lookup, "MIDTRANS_VERIFY_STATUS", true)?,
            order_reference_prefix,
            event_channel_capacity,
            environment,
        })
    }
}

/// Require a secret: must be set and non-empty outside development.
fn require_secret<F>(lookup: &F, name: &str, environment: &str) -> Result<String, BoxError>
where
    F: Fn(&str) -> Option<String>,
{
    let val = match lookup(name) {
        Some(v) => v,
        None => {
            if environment != "development" {
                return Err(format!("{name} must be set in {environment} environment").into());
            }
            format!("dev-{name}-not-for-production")
        }
    };
    if val.is_empty() && environment != "development" {
        return Err(format!("{name} must not be empty in {environment} environment").into());
    }
    Ok(val)
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, BoxError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| BoxError::from(format!("{name} has an invalid value: {raw}"))),
        _ => Ok(default),
    }
}
