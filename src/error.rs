//! # Error Types
//!
//! This module defines error types used throughout the stocklabel library.
//!
//! Every failure of a print operation surfaces as its own variant so callers
//! can tell a missing permission from an unreachable printer, a printer that
//! reported a fault, a broken write, or a failed download.

use thiserror::Error;

use crate::protocol::status::NotReadyReason;

/// Main error type for stocklabel operations
#[derive(Debug, Error)]
pub enum LabelError {
    /// Bluetooth connect permission not granted
    #[error("Permission denied: {0}")]
    Permission(String),

    /// Printer unreachable or link reset while connecting or probing
    #[error("Connection error: {0}")]
    Connection(String),

    /// Printer answered the status probe with a fault condition
    #[error("Printer not ready: {0}")]
    NotReady(NotReadyReason),

    /// Write or flush failed while sending label data
    #[error("Transmission error: {0}")]
    Transmission(String),

    /// Download or page rendering failed before anything was sent
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Job cannot be turned into printer commands
    #[error("Invalid job: {0}")]
    InvalidJob(String),

    /// Image processing error
    #[error("Image error: {0}")]
    Image(String),

    /// Invalid or unreadable configuration
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LabelError {
    /// Whether this failure tore down the cached printer connection.
    pub fn drops_connection(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Transmission(_))
    }
}
