//! # Monochrome Raster Conversion
//!
//! Converts a decoded bitmap into the 1-bit-per-dot buffer carried by the
//! TSPL `BITMAP` command.
//!
//! ## Bit Packing
//!
//! Rows are stored top to bottom, each `ceil(width / 8)` bytes wide:
//! - Bit 7 (MSB) = leftmost dot
//! - Bit 0 (LSB) = rightmost dot
//! - **0 = ink (black), 1 = no ink (white)**
//!
//! The polarity is the opposite of most receipt-printer raster formats. The
//! printer applies the bitmap literally, so it must not be inverted.
//!
//! ```text
//! Byte value 0xFF = 11111111 = ░░░░░░░░
//! Byte value 0x0F = 00001111 = ████░░░░
//! Byte value 0x00 = 00000000 = ████████
//! ```
//!
//! When the width is not a multiple of 8, the unused low bits of the last
//! byte in each row are set to 1 (no ink).
//!
//! ## Thresholding
//!
//! Each pixel's luminance is `0.299 R + 0.587 G + 0.114 B`. Anything darker
//! than [`INK_THRESHOLD`] prints.

use std::path::Path;

use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage, imageops, imageops::FilterType};

use crate::error::LabelError;

/// Luminance below which a pixel is printed.
pub const INK_THRESHOLD: f32 = 180.0;

/// A packed 1-bpp image ready for the `BITMAP` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonochromeRaster {
    width_bytes: u32,
    height_dots: u32,
    bytes: Vec<u8>,
}

impl MonochromeRaster {
    /// Wrap an already packed buffer.
    pub fn new(width_bytes: u32, height_dots: u32, bytes: Vec<u8>) -> Self {
        debug_assert!(
            bytes.len() == width_bytes as usize * height_dots as usize,
            "Raster data length mismatch. Expected {} ({} bytes × {} rows), got {}",
            width_bytes as usize * height_dots as usize,
            width_bytes,
            height_dots,
            bytes.len()
        );
        Self {
            width_bytes,
            height_dots,
            bytes,
        }
    }

    /// Threshold and pack a decoded image.
    ///
    /// ## Example
    ///
    /// ```
    /// use image::{DynamicImage, RgbImage, Rgb};
    /// use stocklabel::render::raster::MonochromeRaster;
    ///
    /// let white = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 2, Rgb([255, 255, 255])));
    /// let raster = MonochromeRaster::from_image(&white);
    /// assert_eq!(raster.width_bytes(), 2);
    /// assert!(raster.bytes().iter().all(|&b| b == 0xFF));
    /// ```
    pub fn from_image(image: &DynamicImage) -> Self {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        let width_bytes = width.div_ceil(8);
        let row_len = width_bytes as usize;

        // Start fully unprinted so pad bits are already 1.
        let mut bytes = vec![0xFFu8; row_len * height as usize];

        for (x, y, pixel) in rgb.enumerate_pixels() {
            let [r, g, b] = pixel.0;
            if luminance(r, g, b) < INK_THRESHOLD {
                let idx = y as usize * row_len + (x / 8) as usize;
                bytes[idx] &= !(0x80u8 >> (x % 8));
            }
        }

        Self {
            width_bytes,
            height_dots: height,
            bytes,
        }
    }

    pub fn width_bytes(&self) -> u32 {
        self.width_bytes
    }

    pub fn height_dots(&self) -> u32 {
        self.height_dots
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether the dot at (x, y) receives ink.
    pub fn is_ink(&self, x: u32, y: u32) -> bool {
        let idx = y as usize * self.width_bytes as usize + (x / 8) as usize;
        (self.bytes[idx] >> (7 - (x % 8))) & 1 == 0
    }

    /// Render the buffer back to a grayscale image (ink = black).
    pub fn to_gray_image(&self) -> GrayImage {
        let width = self.width_bytes * 8;
        GrayImage::from_fn(width, self.height_dots, |x, y| {
            if self.is_ink(x, y) {
                Luma([0u8])
            } else {
                Luma([255u8])
            }
        })
    }

    /// Save a PNG preview of exactly what will print.
    pub fn save_png(&self, path: &Path) -> Result<(), LabelError> {
        self.to_gray_image()
            .save(path)
            .map_err(|e| LabelError::Image(format!("Failed to save PNG: {}", e)))
    }
}

#[inline]
fn luminance(r: u8, g: u8, b: u8) -> f32 {
    0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
}

/// Bring a rendered page to the label's dot size on a white background.
///
/// Transparent areas become paper rather than ink, and a page rendered at a
/// different resolution is scaled to `width_dots × height_dots`.
pub fn fit_to_label(page: DynamicImage, width_dots: u32, height_dots: u32) -> DynamicImage {
    let page = if page.width() == width_dots && page.height() == height_dots {
        page
    } else {
        page.resize_exact(width_dots, height_dots, FilterType::Triangle)
    };

    if !page.color().has_alpha() {
        return page;
    }

    let mut canvas = RgbaImage::from_pixel(width_dots, height_dots, Rgba([255, 255, 255, 255]));
    imageops::overlay(&mut canvas, &page.to_rgba8(), 0, 0);
    DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8())
}

// ============================================================================
// TESTS
// ============================================================================
