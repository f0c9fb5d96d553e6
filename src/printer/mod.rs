//! # Printer Module
//!
//! This module provides label stock and printer settings.
//!
//! ## Modules
//!
//! - [`config`]: Label profile and status-probe timing

pub mod config;

pub use config::{LabelProfile, ReadinessPolicy};
