//! # Label Layout
//!
//! Decides where things go on the fixed-text label: barcode bar widths and
//! height, caption font tier, and how the caption breaks into lines.
//!
//! ## Modules
//!
//! - [`barcode`]: Bar multipliers and height from barcode length
//! - [`caption`]: Font tier, line count and widths from caption length
//! - [`wrap`]: Splitting the caption into those lines
//!
//! ## Label Anatomy
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  ▌▌▐▌▐▐▌▌▐▌▐▌▐▐▌▌▐▌▌▐▐▌▐▌▌▐▌▐▐▌  ← top margin
//! │  ▌▌▐▌▐▐▌▌▐▌▐▌▐▐▌▌▐▌▌▐▐▌▐▌▌▐▌▐▐▌    barcode height
//! │                                    ← text gap
//! │  Caption line one                  ← line step
//! │  caption line two
//! └──────────────────────────────────────────┘
//! ```

pub mod barcode;
pub mod caption;
pub mod wrap;

pub use barcode::{BarcodeGeometry, barcode_geometry};
pub use caption::{CaptionLayout, FontTier, normalize_caption, select_layout};
pub use wrap::wrap_caption;
