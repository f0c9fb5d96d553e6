//! # Rendering Module
//!
//! This module turns label artwork into printer-ready bitmaps.
//!
//! ## Modules
//!
//! - [`page`]: Rendering a downloaded document page to a bitmap
//! - [`raster`]: Thresholding and 1-bpp packing for the `BITMAP` command
//!
//! ## Usage Example
//!
//! ```
//! use image::{DynamicImage, Rgb, RgbImage};
//! use stocklabel::render::raster::{fit_to_label, MonochromeRaster};
//!
//! // A rendered page, here a blank 100x60 image
//! let page = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 60, Rgb([255, 255, 255])));
//!
//! // Scale to a 58x40 mm label at 203 DPI and pack
//! let fitted = fit_to_label(page, 464, 320);
//! let raster = MonochromeRaster::from_image(&fitted);
//!
//! assert_eq!(raster.width_bytes(), 58);
//! assert_eq!(raster.height_dots(), 320);
//! ```

pub mod page;
pub mod raster;
