//! Label jobs as submitted by callers, and the resolved form the command
//! builder consumes.

use serde::{Deserialize, Serialize};

use super::source::RasterSource;
use crate::error::LabelError;
use crate::render::raster::MonochromeRaster;

/// Layout variant of the fixed-text label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelStyle {
    /// Shelf and stock labels.
    #[default]
    Standard,
    /// Return-processing labels: narrower bars, shorter barcode, less margin.
    Compact,
}

/// One physical label to print.
///
/// ## JSON Form
///
/// ```json
/// { "type": "fixed_text", "barcode": "4006381333931", "caption": "Hex bolt M8" }
/// { "type": "raster_image", "pdf_url": "https://…/label.pdf",
///   "width_mm": 100, "height_mm": 150, "dpi": 203 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LabelJob {
    /// Code 128 barcode with an optional caption underneath.
    FixedText {
        barcode: String,
        #[serde(default)]
        caption: Option<String>,
        #[serde(default)]
        style: LabelStyle,
    },
    /// A document page rendered to a bitmap and printed as-is.
    RasterImage {
        pdf_url: String,
        width_mm: f32,
        height_mm: f32,
        dpi: u16,
    },
}

impl LabelJob {
    /// Fetch and render whatever the job refers to.
    ///
    /// Fixed-text jobs need nothing and resolve immediately. Raster jobs
    /// download and render their document; any failure there is an
    /// [`LabelError::Upstream`] and nothing reaches the printer.
    pub async fn resolve(self, source: &RasterSource) -> Result<Label, LabelError> {
        match self {
            LabelJob::FixedText {
                barcode,
                caption,
                style,
            } => Ok(Label::FixedText {
                barcode,
                caption,
                style,
            }),
            LabelJob::RasterImage {
                pdf_url,
                width_mm,
                height_mm,
                dpi,
            } => {
                let raster = source.load(&pdf_url, width_mm, height_mm, dpi).await?;
                Ok(Label::Raster {
                    width_mm,
                    height_mm,
                    raster,
                })
            }
        }
    }
}

/// A label with all external resources in hand, ready to encode.
#[derive(Debug, Clone, PartialEq)]
pub enum Label {
    FixedText {
        barcode: String,
        caption: Option<String>,
        style: LabelStyle,
    },
    Raster {
        width_mm: f32,
        height_mm: f32,
        raster: MonochromeRaster,
    },
}

impl Label {
    pub fn fixed_text(barcode: impl Into<String>, caption: Option<&str>) -> Self {
        Self::FixedText {
            barcode: barcode.into(),
            caption: caption.map(str::to_string),
            style: LabelStyle::Standard,
        }
    }

    pub fn compact(barcode: impl Into<String>, caption: Option<&str>) -> Self {
        Self::FixedText {
            barcode: barcode.into(),
            caption: caption.map(str::to_string),
            style: LabelStyle::Compact,
        }
    }

    /// Short description for logs.
    pub fn summary(&self) -> String {
        match self {
            Label::FixedText { barcode, style, .. } => {
                format!("{:?} label for {}", style, barcode)
            }
            Label::Raster {
                width_mm,
                height_mm,
                raster,
            } => format!(
                "{}x{} mm raster ({} bytes)",
                width_mm,
                height_mm,
                raster.bytes().len()
            ),
        }
    }
}
