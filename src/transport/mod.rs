//! # Printer Transport Layer
//!
//! This module provides the link to the label printer and the manager that
//! owns it.
//!
//! ## Available Transports
//!
//! - [`bluetooth`]: Bluetooth SPP over RFCOMM (Linux)
//!
//! ## Seams
//!
//! - [`Link`]: an open byte stream to one printer
//! - [`Connector`]: opens links and halts device discovery
//! - [`PermissionProvider`]: whether the platform lets us connect or scan
//!
//! [`manager::PrintService`] is generic over the connector, so tests drive it
//! with an in-memory link.

pub mod bluetooth;
pub mod manager;

use std::fmt;
use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::LabelError;

pub use bluetooth::{RfcommConnector, RfcommLink};
pub use manager::{ConnectionManager, PrintService, Readiness};

/// An open serial-style connection to a printer.
pub trait Link: Read + Write + Send {
    /// Number of bytes that can be read without blocking.
    fn bytes_available(&mut self) -> io::Result<usize>;

    /// Whether the underlying channel is still usable.
    fn is_open(&self) -> bool {
        true
    }
}

/// Opens links to printers.
pub trait Connector: Send {
    type Link: Link;

    /// Stop any running device discovery. Discovery slows down connects.
    fn stop_discovery(&self) -> Result<(), LabelError>;

    /// Open a new link to `device`.
    fn connect(&self, device: &PrinterDevice) -> Result<Self::Link, LabelError>;
}

/// Runtime Bluetooth permissions.
pub trait PermissionProvider: Send + Sync {
    fn has_connect_permission(&self) -> bool;
    fn has_scan_permission(&self) -> bool;
}

/// Fixed permission answers, for platforms without a permission model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticPermissions {
    pub connect: bool,
    pub scan: bool,
}

impl StaticPermissions {
    pub const fn granted() -> Self {
        Self {
            connect: true,
            scan: true,
        }
    }
}

impl PermissionProvider for StaticPermissions {
    fn has_connect_permission(&self) -> bool {
        self.connect
    }

    fn has_scan_permission(&self) -> bool {
        self.scan
    }
}

/// A printer as chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterDevice {
    /// Bluetooth MAC (`XX:XX:XX:XX:XX:XX`) or an RFCOMM device path.
    pub address: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl PrinterDevice {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: None,
        }
    }
}

impl fmt::Display for PrinterDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({})", name, self.address),
            None => f.write_str(&self.address),
        }
    }
}
