//! HTTP 服务器
//!
//! Router assembly, middleware and the serve loop.

use crate::core::ServerState;
use axum::extract::DefaultBodyLimit;
use axum::{Router, middleware};
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Request bodies are small JSON documents
const MAX_BODY_BYTES: usize = 64 * 1024;

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = std::time::Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        target: "http_access",
        "{} {} {} {}ms",
        method,
        uri,
        response.status(),
        started.elapsed().as_millis()
    );

    response
}

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(crate::api::health::router())
        .merge(crate::api::customer::router())
        .merge(crate::api::admin_orders::router())
        .merge(crate::api::payment::router())
        .merge(crate::api::realtime::router())
}

/// Router with state and middleware applied
pub fn router(state: ServerState) -> Router {
    build_app()
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(log_request))
}

/// HTTP Server
pub struct Server {
    state: ServerState,
}

impl Server {
    pub fn new(state: ServerState) -> Self {
        Self { state }
    }

    /// Serve until `shutdown` is cancelled, then drain in-flight requests
    pub async fn run(&self, shutdown: CancellationToken) -> std::io::Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.state.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("🦀 Order server listening on {}", addr);

        axum::serve(listener, router(self.state.clone()))
            .with_graceful_shutdown(shutdown.cancelled_owned())
            .await
    }
}
