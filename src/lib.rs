//! # Stocklabel - Warehouse Label Printing Library
//!
//! Stocklabel prints stock, shelf and shipping labels on TSPL thermal label
//! printers over Bluetooth. It provides:
//!
//! - **Layout**: Barcode sizing, caption font tiers and line wrapping
//! - **Protocol**: TSPL command builders and the `~HS` status probe
//! - **Rendering**: Document pages to 1-bpp label bitmaps
//! - **Transport**: One cached Bluetooth RFCOMM link, health-checked per job
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use stocklabel::{
//!     label::Label,
//!     printer::LabelProfile,
//!     transport::{PrintService, PrinterDevice, RfcommConnector, StaticPermissions},
//! };
//!
//! let service = PrintService::new(
//!     RfcommConnector::default(),
//!     Arc::new(StaticPermissions::granted()),
//!     LabelProfile::DEFAULT_58X40,
//! );
//!
//! let device = PrinterDevice::new("00:11:62:AA:BB:CC");
//! let label = Label::fixed_text("4006381333931", Some("Hex bolt M8 galvanized"));
//!
//! // Connects on first use, probes readiness, then sends the label
//! service.print(&device, &label)?;
//!
//! # Ok::<(), stocklabel::error::LabelError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`label`] | Label jobs and the command builder |
//! | [`layout`] | Barcode geometry, caption tiers, wrapping |
//! | [`protocol`] | TSPL commands and status replies |
//! | [`render`] | Page rendering and monochrome rasters |
//! | [`transport`] | Links, connectors and the print service |
//! | [`printer`] | Label profile |
//! | [`server`] | HTTP API |
//! | [`error`] | Error types |

pub mod error;
pub mod label;
pub mod layout;
pub mod printer;
pub mod protocol;
pub mod render;
pub mod server;
pub mod transport;

// Re-exports for convenience
pub use error::LabelError;
pub use label::{Label, LabelJob};
pub use printer::LabelProfile;
pub use transport::PrintService;
