//! Server state and configuration.

use std::sync::Arc;

use crate::label::RasterSource;
use crate::transport::{Connector, PrintService, PrinterDevice};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Printer used when a request names none
    pub default_device: Option<PrinterDevice>,
}

/// Application state shared across handlers.
pub struct AppState<C: Connector> {
    pub config: ServerConfig,
    pub service: Arc<PrintService<C>>,
    pub source: RasterSource,
}

impl<C: Connector> AppState<C> {
    pub fn new(config: ServerConfig, service: PrintService<C>, source: RasterSource) -> Self {
        Self {
            config,
            service: Arc::new(service),
            source,
        }
    }

    /// The requested printer, or the configured default.
    pub fn device_or_default(&self, requested: Option<PrinterDevice>) -> Option<PrinterDevice> {
        requested.or_else(|| self.config.default_device.clone())
    }
}
