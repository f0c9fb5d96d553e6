//! # Caption Layout Selection
//!
//! A label has room for a barcode and a short caption underneath it. The
//! caption's length decides how it is set:
//!
//! | Caption length | Font | Lines | Max chars/line | Line step | Barcode |
//! |----------------|------|-------|----------------|-----------|---------|
//! | ≤ 54 | Large | 2 | 28, 26 | 22 dots | unchanged |
//! | ≤ 66 | Medium | 2 | 34, 32 | 20 dots | unchanged |
//! | > 66 | Medium | 3 | 24, 24, 24 | 18 dots | −20 dots, min 150 |
//!
//! Length is measured after underscores are turned into spaces, in encoded
//! UTF-8 bytes: the unit the printer's line buffer consumes. For ASCII
//! captions this is the character count. Cyrillic letters count two each,
//! so a Cyrillic caption of 28 or more characters already leaves the large
//! tier even though the table reads "≤ 54". This is deliberate: the
//! reference Cyrillic label `ПРОДУКЦИЯ_ООО_РОМАШКА_1234…7890` is 52
//! characters but 71 bytes, and it must print on three lines. Counting
//! characters would put it in the large tier. Line wrapping still counts
//! characters, so no line splits a code point.

/// Longest caption set in the large font.
pub const LARGE_MAX_LEN: usize = 54;

/// Longest caption set on two medium-font lines.
pub const MEDIUM_MAX_LEN: usize = 66;

/// Barcode height given up to make room for a third caption line.
pub const THIRD_LINE_HEIGHT_DELTA: u32 = 20;

/// Barcode height never drops below this.
pub const MIN_BARCODE_HEIGHT: u32 = 150;

/// Printer font tiers used for captions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontTier {
    /// Font "2": 12×20 dots
    Large,
    /// Font "1": 8×12 dots
    Medium,
}

impl FontTier {
    /// TSPL font id.
    pub fn font_id(self) -> &'static str {
        match self {
            FontTier::Large => "2",
            FontTier::Medium => "1",
        }
    }
}

/// How a caption is set under the barcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionLayout {
    pub font: FontTier,
    pub scale_x: u32,
    pub scale_y: u32,
    pub line_step_dots: u32,
    pub max_chars_per_line: Vec<usize>,
    pub barcode_height_dots: u32,
}

impl CaptionLayout {
    pub fn line_count(&self) -> usize {
        self.max_chars_per_line.len()
    }
}

/// Turn underscores into spaces and drop surrounding whitespace.
pub fn normalize_caption(caption: &str) -> String {
    caption.replace('_', " ").trim().to_string()
}

/// Length used for tier selection.
pub fn caption_len(normalized: &str) -> usize {
    normalized.len()
}

/// Pick the caption layout for `caption` under a barcode of `base_height` dots.
///
/// ## Example
///
/// ```
/// use stocklabel::layout::caption::{select_layout, FontTier};
///
/// let layout = select_layout("Shelf bracket, galvanized", 170);
/// assert_eq!(layout.font, FontTier::Large);
/// assert_eq!(layout.max_chars_per_line, vec![28, 26]);
/// assert_eq!(layout.barcode_height_dots, 170);
/// ```
pub fn select_layout(caption: &str, base_height: u32) -> CaptionLayout {
    let len = caption_len(&normalize_caption(caption));

    if len <= LARGE_MAX_LEN {
        CaptionLayout {
            font: FontTier::Large,
            scale_x: 1,
            scale_y: 1,
            line_step_dots: 22,
            max_chars_per_line: vec![28, 26],
            barcode_height_dots: base_height,
        }
    } else if len <= MEDIUM_MAX_LEN {
        CaptionLayout {
            font: FontTier::Medium,
            scale_x: 1,
            scale_y: 1,
            line_step_dots: 20,
            max_chars_per_line: vec![34, 32],
            barcode_height_dots: base_height,
        }
    } else {
        CaptionLayout {
            font: FontTier::Medium,
            scale_x: 1,
            scale_y: 1,
            line_step_dots: 18,
            max_chars_per_line: vec![24, 24, 24],
            barcode_height_dots: base_height
                .saturating_sub(THIRD_LINE_HEIGHT_DELTA)
                .max(MIN_BARCODE_HEIGHT),
        }
    }
}
