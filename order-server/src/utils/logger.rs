//! Logging Infrastructure
//!
//! `RUST_LOG` wins when set; otherwise `level` applies to this crate and
//! `tower_http`. With a log directory, output rolls daily into
//! `<dir>/order-server.<date>`.

use std::path::Path;
use tracing_subscriber::EnvFilter;

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "order_server={level},shared={level},tower_http={level},http_access={level},warn"
        ))
    })
}

/// Initialize the logger with optional file output
pub fn init_logger_with_file(log_level: &str, log_dir: Option<&str>) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter(log_level))
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(true);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.is_dir() {
            let file_appender = tracing_appender::rolling::daily(log_path, "order-server");
            subscriber.with_ansi(false).with_writer(file_appender).init();
            return;
        }
        eprintln!("LOG_DIR {dir} does not exist, logging to stdout");
    }

    subscriber.init();
}
