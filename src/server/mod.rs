//! # HTTP Server for Label Printing
//!
//! Lets other warehouse services print labels through a shared printer.
//!
//! ## Usage
//!
//! ```bash
//! stocklabel serve --listen 0.0.0.0:8080 --device 00:11:62:AA:BB:CC
//! ```
//!
//! ## Routes
//!
//! | Route | Body | Response |
//! |-------|------|----------|
//! | `POST /api/labels/print` | `{device?, job}` | `{success, job_id, bytes}` |
//! | `POST /api/labels/preview` | `{job}` | command listing (text) |
//! | `POST /api/printer/status` | `{device?}` | `{ready, reason?}` |
//!
//! Failures return `{success: false, error}` with a status that tells the
//! failure apart: 403 permission, 409 printer not ready, 502 link failure,
//! 424 download or render failure, 400 bad job.

mod handlers;
mod state;

pub use handlers::{ApiError, status_for};
pub use state::{AppState, ServerConfig};

use axum::{Router, routing::post};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::LabelError;
use crate::transport::Connector;

/// Build the application router.
pub fn router<C: Connector + 'static>(state: Arc<AppState<C>>) -> Router {
    Router::new()
        .route("/api/labels/print", post(handlers::labels::print::<C>))
        .route("/api/labels/preview", post(handlers::labels::preview::<C>))
        .route("/api/printer/status", post(handlers::printer::status::<C>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use std::sync::Arc;
/// use stocklabel::label::RasterSource;
/// use stocklabel::printer::LabelProfile;
/// use stocklabel::render::page::default_renderer;
/// use stocklabel::server::{serve, AppState, ServerConfig};
/// use stocklabel::transport::{PrintService, RfcommConnector, StaticPermissions};
///
/// # async fn example() -> Result<(), stocklabel::LabelError> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8080".to_string(),
///     default_device: None,
/// };
/// let service = PrintService::new(
///     RfcommConnector::default(),
///     Arc::new(StaticPermissions::granted()),
///     LabelProfile::default(),
/// );
/// let source = RasterSource::new(default_renderer())?;
///
/// serve(AppState::new(config, service, source)).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve<C: Connector + 'static>(state: AppState<C>) -> Result<(), LabelError> {
    let listen_addr = state.config.listen_addr.clone();
    if let Some(device) = &state.config.default_device {
        info!(device = %device, "default printer");
    }
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .map_err(|e| LabelError::Config(format!("Failed to bind to {}: {}", listen_addr, e)))?;
    info!(listen = %listen_addr, "stocklabel HTTP server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
