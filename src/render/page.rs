//! Document page rendering.
//!
//! Raster labels arrive as a document (usually a one-page PDF generated by a
//! shipping or returns service). A [`PageRenderer`] turns the first page of
//! that document into a bitmap at the label's dot size.
//!
//! Two renderers are available:
//!
//! - [`ImageRenderer`]: documents that are already images (PNG, JPEG, ...)
//! - `PdfiumRenderer` (feature `pdfium`): PDF pages via a system libpdfium

use std::sync::Arc;

use image::DynamicImage;

use crate::error::LabelError;

/// Renders the first page of a document to a bitmap.
pub trait PageRenderer: Send + Sync {
    /// Render `document` to roughly `width_px × height_px`.
    ///
    /// The result does not need to match the size exactly; callers scale it
    /// with [`fit_to_label`](super::raster::fit_to_label).
    fn render_first_page(
        &self,
        document: &[u8],
        width_px: u32,
        height_px: u32,
    ) -> Result<DynamicImage, LabelError>;
}

/// Decodes documents that are plain raster images.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageRenderer;

impl PageRenderer for ImageRenderer {
    fn render_first_page(
        &self,
        document: &[u8],
        _width_px: u32,
        _height_px: u32,
    ) -> Result<DynamicImage, LabelError> {
        image::load_from_memory(document)
            .map_err(|e| LabelError::Upstream(format!("Failed to decode image: {}", e)))
    }
}

/// The best renderer this build has: pdfium when enabled, else images only.
pub fn default_renderer() -> Arc<dyn PageRenderer> {
    #[cfg(feature = "pdfium")]
    {
        Arc::new(PdfiumRenderer)
    }
    #[cfg(not(feature = "pdfium"))]
    {
        Arc::new(ImageRenderer)
    }
}

#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRenderer;

#[cfg(feature = "pdfium")]
mod pdfium {
    use image::{DynamicImage, RgbaImage};
    use pdfium_render::prelude::*;

    use super::PageRenderer;
    use crate::error::LabelError;

    /// Renders PDF pages with a libpdfium found on the system library path.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct PdfiumRenderer;

    impl PageRenderer for PdfiumRenderer {
        fn render_first_page(
            &self,
            document: &[u8],
            width_px: u32,
            height_px: u32,
        ) -> Result<DynamicImage, LabelError> {
            let bindings = Pdfium::bind_to_system_library()
                .map_err(|e| LabelError::Upstream(format!("libpdfium not available: {}", e)))?;
            let pdfium = Pdfium::new(bindings);

            let doc = pdfium
                .load_pdf_from_byte_slice(document, None)
                .map_err(|e| LabelError::Upstream(format!("Failed to open PDF: {}", e)))?;
            let page = doc
                .pages()
                .get(0)
                .map_err(|e| LabelError::Upstream(format!("PDF has no first page: {}", e)))?;

            let config = PdfRenderConfig::new()
                .set_target_width(width_px as _)
                .set_maximum_height(height_px as _);
            let bitmap = page
                .render_with_config(&config)
                .map_err(|e| LabelError::Upstream(format!("Failed to render PDF page: {}", e)))?;

            let width = bitmap.width() as u32;
            let height = bitmap.height() as u32;
            RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes())
                .map(DynamicImage::ImageRgba8)
                .ok_or_else(|| LabelError::Upstream("PDF bitmap size mismatch".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    #[test]
    fn test_image_renderer_decodes_png() {
        let img = RgbImage::from_pixel(12, 7, Rgb([10, 20, 30]));
        let mut png = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let page = ImageRenderer.render_first_page(&png, 464, 320).unwrap();
        assert_eq!((page.width(), page.height()), (12, 7));
    }

    #[test]
    fn test_image_renderer_rejects_garbage_as_upstream() {
        let err = ImageRenderer
            .render_first_page(b"%PDF-1.7 not an image", 464, 320)
            .unwrap_err();
        assert!(matches!(err, LabelError::Upstream(_)));
    }
}
