//! Fetching and rasterizing the document behind a raster label job.
//!
//! The location may be an `http(s)://` URL or a local file path. The
//! document is rendered at the label's dot size, flattened onto white and
//! packed into a [`MonochromeRaster`].

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::LabelError;
use crate::render::page::PageRenderer;
use crate::render::raster::{MonochromeRaster, fit_to_label};

/// Downloads label documents and renders them to monochrome rasters.
pub struct RasterSource {
    http_client: reqwest::Client,
    renderer: Arc<dyn PageRenderer>,
}

impl RasterSource {
    pub fn new(renderer: Arc<dyn PageRenderer>) -> Result<Self, LabelError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("stocklabel/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LabelError::Upstream(format!("HTTP client error: {}", e)))?;
        Ok(Self {
            http_client,
            renderer,
        })
    }

    /// Read the raw document bytes.
    pub async fn fetch(&self, location: &str) -> Result<Vec<u8>, LabelError> {
        if location.starts_with("http://") || location.starts_with("https://") {
            let response = self
                .http_client
                .get(location)
                .send()
                .await
                .map_err(|e| LabelError::Upstream(format!("Failed to download {}: {}", location, e)))?;
            if !response.status().is_success() {
                return Err(LabelError::Upstream(format!(
                    "Failed to download {}: HTTP {}",
                    location,
                    response.status()
                )));
            }
            let bytes = response
                .bytes()
                .await
                .map_err(|e| LabelError::Upstream(format!("Failed to read {}: {}", location, e)))?;
            Ok(bytes.to_vec())
        } else {
            let path = location.strip_prefix("file://").unwrap_or(location);
            tokio::fs::read(path)
                .await
                .map_err(|e| LabelError::Upstream(format!("Failed to read {}: {}", path, e)))
        }
    }

    /// Fetch `location` and render it for a `width_mm × height_mm` label.
    pub async fn load(
        &self,
        location: &str,
        width_mm: f32,
        height_mm: f32,
        dpi: u16,
    ) -> Result<MonochromeRaster, LabelError> {
        let (width_dots, height_dots) = label_dots(width_mm, height_mm, dpi)?;

        let document = self.fetch(location).await?;
        debug!(location, bytes = document.len(), "label document fetched");

        let page = self
            .renderer
            .render_first_page(&document, width_dots, height_dots)?;
        let raster = MonochromeRaster::from_image(&fit_to_label(page, width_dots, height_dots));

        info!(
            location,
            width_dots,
            height_dots,
            "label document rasterized"
        );
        Ok(raster)
    }
}

/// Widest and longest label any supported printer feeds.
pub const MAX_LABEL_MM: f32 = 300.0;

/// Highest print head resolution.
pub const MAX_DPI: u16 = 600;

/// Label size in dots, rejecting sizes the printer cannot take.
///
/// Sizes come straight from job JSON, so anything outside
/// `(0, MAX_LABEL_MM]` or above `MAX_DPI` is refused before a buffer of
/// that size is ever allocated.
pub fn label_dots(width_mm: f32, height_mm: f32, dpi: u16) -> Result<(u32, u32), LabelError> {
    let printable = |mm: f32| mm > 0.0 && mm <= MAX_LABEL_MM;
    if !(printable(width_mm) && printable(height_mm)) || dpi == 0 || dpi > MAX_DPI {
        return Err(LabelError::InvalidJob(format!(
            "Label size {} x {} mm at {} DPI is not printable",
            width_mm, height_mm, dpi
        )));
    }
    let dots_per_mm = dpi as f32 / 25.4;
    let width = (width_mm * dots_per_mm).round() as u32;
    let height = (height_mm * dots_per_mm).round() as u32;
    Ok((width.max(1), height.max(1)))
}
