//! Barcode geometry for the fixed-text label.
//!
//! Longer barcode contents need narrower bars to stay on a 58 mm label, and
//! the height steps down slightly so the caption keeps its room:
//!
//! | Length (chars) | Narrow | Wide | Height | Compact narrow | Compact wide |
//! |----------------|--------|------|--------|----------------|--------------|
//! | ≤ 18 | 2 | 4 | 180 | 2 | 3 |
//! | ≤ 24 | 2 | 3 | 170 | 1 | 3 |
//! | > 24 | 1 | 3 | 165 | 1 | 2 |
//!
//! Compact (return-processing) labels also start 10 dots lower in height.

use crate::label::LabelStyle;

/// Bar multipliers and height of the Code 128 symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarcodeGeometry {
    pub narrow: u32,
    pub wide: u32,
    pub height: u32,
}

/// Height given up by compact labels before caption layout.
pub const COMPACT_HEIGHT_DELTA: u32 = 10;

/// Bar widths and base height for `content` in the given style.
///
/// The height is the base passed to caption layout, which may lower it
/// further for a three-line caption.
pub fn barcode_geometry(content: &str, style: LabelStyle) -> BarcodeGeometry {
    let len = content.chars().count();

    let (narrow, wide, height) = match len {
        0..=18 => (2, 4, 180),
        19..=24 => (2, 3, 170),
        _ => (1, 3, 165),
    };

    match style {
        LabelStyle::Standard => BarcodeGeometry {
            narrow,
            wide,
            height,
        },
        LabelStyle::Compact => {
            let (narrow, wide) = match len {
                0..=18 => (2, 3),
                19..=24 => (1, 3),
                _ => (1, 2),
            };
            BarcodeGeometry {
                narrow,
                wide,
                height: height - COMPACT_HEIGHT_DELTA,
            }
        }
    }
}
