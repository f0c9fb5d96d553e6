//! # TSPL Protocol Implementation
//!
//! This module provides the command language spoken to TSPL thermal label
//! printers over the Bluetooth serial link.
//!
//! ## Module Structure
//!
//! - [`commands`]: Label setup, barcode, text, bitmap and print commands
//! - [`status`]: The `~HS` health probe and its reply interpretation
//!
//! ## Usage Example
//!
//! ```
//! use stocklabel::protocol::commands::{Command, CommandStream};
//!
//! let mut stream = CommandStream::new();
//! stream.push(Command::Size { width_mm: 58.0, height_mm: 40.0 });
//! stream.push(Command::Cls);
//! stream.push(Command::Print { sets: 1, copies: 1 });
//!
//! assert_eq!(stream.to_bytes(), b"SIZE 58 mm,40 mm\r\nCLS\r\nPRINT 1,1\r\n");
//! ```

pub mod commands;
pub mod status;
