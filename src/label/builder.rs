//! # Label Command Builder
//!
//! Turns a resolved [`Label`] into the TSPL command stream for one copy.
//!
//! ## Fixed-Text Label
//!
//! ```text
//! SIZE 58 mm,40 mm
//! GAP 2 mm,0
//! DENSITY 8
//! SPEED 4
//! DIRECTION 1
//! REFERENCE 0,0
//! CLS
//! BARCODE 24,12,"128",180,0,0,2,4,"4006381333931"
//! TEXT 24,208,"2",0,1,1,"Hex bolt M8 galvanized"
//! PRINT 1,1
//! ```
//!
//! The caption starts one text gap below the barcode, but never lower than
//! y = 300 so three lines still fit on a 40 mm label.
//!
//! ## Raster Label
//!
//! ```text
//! SIZE 100 mm,150 mm
//! GAP 2 mm,0
//! DENSITY 8
//! DIRECTION 1
//! CLS
//! BITMAP 0,0,100,1199,1,<raw bytes>
//! PRINT 1,1
//! ```

use super::job::{Label, LabelStyle};
use crate::error::LabelError;
use crate::layout::{barcode_geometry, normalize_caption, select_layout, wrap_caption};
use crate::printer::LabelProfile;
use crate::protocol::commands::{BarcodeCommand, Command, CommandStream, TextCommand};
use crate::render::raster::MonochromeRaster;

/// X position of the barcode and every caption line.
pub const LEFT_MARGIN: u32 = 24;

/// Lowest Y the first caption line may start at.
pub const MAX_FIRST_TEXT_Y: u32 = 300;

impl LabelStyle {
    /// Distance from the top edge to the barcode.
    pub fn top_margin(self) -> u32 {
        match self {
            LabelStyle::Standard => 12,
            LabelStyle::Compact => 8,
        }
    }

    /// Space between the barcode and the first caption line.
    pub fn text_gap(self) -> u32 {
        match self {
            LabelStyle::Standard => 16,
            LabelStyle::Compact => 14,
        }
    }
}

/// Build the command stream for `label`.
///
/// `profile` supplies stock size and print settings for fixed-text labels;
/// raster labels carry their own size.
///
/// ## Example
///
/// ```
/// use stocklabel::label::{builder, Label};
/// use stocklabel::printer::LabelProfile;
///
/// let label = Label::fixed_text("1234567890123456789012345", None);
/// let stream = builder::build(&label, &LabelProfile::DEFAULT_58X40)?;
///
/// assert_eq!(stream.count("BARCODE"), 1);
/// assert_eq!(stream.count("TEXT"), 0);
/// assert_eq!(stream.count("PRINT"), 1);
/// # Ok::<(), stocklabel::LabelError>(())
/// ```
pub fn build(label: &Label, profile: &LabelProfile) -> Result<CommandStream, LabelError> {
    match label {
        Label::FixedText {
            barcode,
            caption,
            style,
        } => build_fixed_text(barcode, caption.as_deref(), *style, profile),
        Label::Raster {
            width_mm,
            height_mm,
            raster,
        } => Ok(build_raster(*width_mm, *height_mm, raster, profile)),
    }
}

fn build_fixed_text(
    barcode: &str,
    caption: Option<&str>,
    style: LabelStyle,
    profile: &LabelProfile,
) -> Result<CommandStream, LabelError> {
    let barcode = barcode.trim();
    if barcode.is_empty() {
        return Err(LabelError::InvalidJob("Barcode text is empty".to_string()));
    }

    let caption = caption.map(normalize_caption).unwrap_or_default();
    let geometry = barcode_geometry(barcode, style);
    let layout = select_layout(&caption, geometry.height);

    let mut stream = CommandStream::new();
    stream.push(Command::Size {
        width_mm: profile.width_mm,
        height_mm: profile.height_mm,
    });
    stream.push(Command::Gap {
        gap_mm: profile.gap_mm,
        offset_mm: 0.0,
    });
    stream.push(Command::Density(profile.density));
    stream.push(Command::Speed(profile.speed));
    stream.push(Command::Direction(profile.direction));
    stream.push(Command::Reference { x: 0, y: 0 });
    stream.push(Command::Cls);

    let top = style.top_margin();
    stream.push(Command::Barcode(BarcodeCommand {
        x: LEFT_MARGIN,
        y: top,
        height: layout.barcode_height_dots,
        narrow: geometry.narrow,
        wide: geometry.wide,
        content: barcode.to_string(),
    }));

    let first_y = (top + layout.barcode_height_dots + style.text_gap()).min(MAX_FIRST_TEXT_Y);
    let lines = wrap_caption(&caption, &layout.max_chars_per_line);
    for (i, line) in lines.into_iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        stream.push(Command::Text(TextCommand {
            x: LEFT_MARGIN,
            y: first_y + i as u32 * layout.line_step_dots,
            font: layout.font.font_id(),
            scale_x: layout.scale_x,
            scale_y: layout.scale_y,
            content: line,
        }));
    }

    stream.push(Command::Print { sets: 1, copies: 1 });
    Ok(stream)
}

fn build_raster(
    width_mm: f32,
    height_mm: f32,
    raster: &MonochromeRaster,
    profile: &LabelProfile,
) -> CommandStream {
    let mut stream = CommandStream::new();
    stream.push(Command::Size {
        width_mm,
        height_mm,
    });
    stream.push(Command::Gap {
        gap_mm: profile.gap_mm,
        offset_mm: 0.0,
    });
    stream.push(Command::Density(profile.density));
    stream.push(Command::Direction(profile.direction));
    stream.push(Command::Cls);
    stream.push(Command::Bitmap {
        x: 0,
        y: 0,
        raster: raster.clone(),
    });
    stream.push(Command::Print { sets: 1, copies: 1 });
    stream
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(stream: &CommandStream) -> Vec<&TextCommand> {
        stream
            .commands
            .iter()
            .filter_map(|c| match c {
                Command::Text(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    fn barcode(stream: &CommandStream) -> &BarcodeCommand {
        stream
            .commands
            .iter()
            .find_map(|c| match c {
                Command::Barcode(b) => Some(b),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_fixed_text_header_order() {
        let stream = build(&Label::fixed_text("A1", Some("Bin")), &LabelProfile::default()).unwrap();
        assert_eq!(
            stream.keywords(),
            vec![
                "SIZE",
                "GAP",
                "DENSITY",
                "SPEED",
                "DIRECTION",
                "REFERENCE",
                "CLS",
                "BARCODE",
                "TEXT",
                "PRINT"
            ]
        );
    }

    #[test]
    fn test_fixed_text_exact_bytes() {
        let stream = build(
            &Label::fixed_text("4006381333931", Some("Hex_bolt_M8")),
            &LabelProfile::default(),
        )
        .unwrap();
        let expected = "SIZE 58 mm,40 mm\r\n\
                        GAP 2 mm,0\r\n\
                        DENSITY 8\r\n\
                        SPEED 4\r\n\
                        DIRECTION 1\r\n\
                        REFERENCE 0,0\r\n\
                        CLS\r\n\
                        BARCODE 24,12,\"128\",180,0,0,2,4,\"4006381333931\"\r\n\
                        TEXT 24,208,\"2\",0,1,1,\"Hex bolt M8\"\r\n\
                        PRINT 1,1\r\n";
        assert_eq!(String::from_utf8(stream.to_bytes()).unwrap(), expected);
    }

    #[test]
    fn test_long_barcode_without_caption() {
        let stream = build(
            &Label::fixed_text("1234567890123456789012345", None),
            &LabelProfile::default(),
        )
        .unwrap();
        let b = barcode(&stream);
        assert_eq!((b.narrow, b.wide, b.height), (1, 3, 165));
        assert_eq!(stream.count("TEXT"), 0);
        assert_eq!(stream.count("BARCODE"), 1);
        assert_eq!(stream.count("PRINT"), 1);
    }

    #[test]
    fn test_two_lines_step_down() {
        let stream = build(
            &Label::fixed_text("A1", Some("Storage box transparent with lid 20L")),
            &LabelProfile::default(),
        )
        .unwrap();
        let lines = texts(&stream);
        assert_eq!(lines.len(), 2);
        // 12 + 180 + 16
        assert_eq!(lines[0].y, 208);
        assert_eq!(lines[1].y, 230);
        assert_eq!(lines[0].font, "2");
    }

    #[test]
    fn test_three_line_caption_reduces_barcode() {
        let caption = "Zinc plated steel angle bracket with mounting holes and heavy duty screws";
        let stream =
            build(&Label::fixed_text("A1", Some(caption)), &LabelProfile::default()).unwrap();

        assert_eq!(barcode(&stream).height, 160);
        let lines = texts(&stream);
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|t| t.font == "1"));
        assert_eq!(lines[0].content, "Zinc plated steel angle");
        assert_eq!(lines[1].content, "bracket with mounting");
        assert_eq!(lines[2].content, "holes and heavy duty…screws");
        // 12 + 160 + 16, then 18-dot steps
        assert_eq!(lines[0].y, 188);
        assert_eq!(lines[1].y, 206);
        assert_eq!(lines[2].y, 224);
    }

    #[test]
    fn test_compact_style_positions() {
        let stream = build(
            &Label::compact("1234567890123456789012345", Some("Return RMA-17")),
            &LabelProfile::default(),
        )
        .unwrap();
        let b = barcode(&stream);
        assert_eq!((b.y, b.narrow, b.wide, b.height), (8, 1, 2, 155));
        // 8 + 155 + 14
        assert_eq!(texts(&stream)[0].y, 177);
    }

    #[test]
    fn test_first_line_never_below_clamp() {
        for barcode in ["A", "1234567890123456789", "1234567890123456789012345"] {
            for style in [LabelStyle::Standard, LabelStyle::Compact] {
                let label = Label::FixedText {
                    barcode: barcode.to_string(),
                    caption: Some("x".repeat(80)),
                    style,
                };
                let stream = build(&label, &LabelProfile::default()).unwrap();
                assert!(texts(&stream)[0].y <= MAX_FIRST_TEXT_Y);
            }
        }
    }

    #[test]
    fn test_empty_barcode_rejected() {
        let err = build(&Label::fixed_text("  ", Some("x")), &LabelProfile::default()).unwrap_err();
        assert!(matches!(err, LabelError::InvalidJob(_)));
    }

    #[test]
    fn test_blank_caption_emits_no_text() {
        let stream =
            build(&Label::fixed_text("A1", Some(" __ ")), &LabelProfile::default()).unwrap();
        assert_eq!(stream.count("TEXT"), 0);
    }

    #[test]
    fn test_raster_form() {
        let raster = MonochromeRaster::new(2, 3, vec![0xFF; 6]);
        let label = Label::Raster {
            width_mm: 100.0,
            height_mm: 150.0,
            raster,
        };
        let stream = build(&label, &LabelProfile::default()).unwrap();
        assert_eq!(
            stream.keywords(),
            vec!["SIZE", "GAP", "DENSITY", "DIRECTION", "CLS", "BITMAP", "PRINT"]
        );

        let bytes = stream.to_bytes();
        let mut expected = b"SIZE 100 mm,150 mm\r\nGAP 2 mm,0\r\nDENSITY 8\r\nDIRECTION 1\r\nCLS\r\nBITMAP 0,0,2,3,1,".to_vec();
        expected.extend_from_slice(&[0xFF; 6]);
        expected.extend_from_slice(b"\r\nPRINT 1,1\r\n");
        assert_eq!(bytes, expected);
    }
}
