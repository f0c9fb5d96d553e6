//! # TSPL Label Commands
//!
//! This module implements the line-oriented command language understood by
//! TSPL-compatible thermal label printers.
//!
//! ## Protocol Overview
//!
//! Unlike escape-sequence protocols, TSPL commands are ASCII lines terminated
//! by CRLF. Each line starts with a keyword followed by comma-separated
//! parameters:
//!
//! ```text
//! SIZE 58 mm,40 mm
//! GAP 2 mm,0
//! DENSITY 8
//! SPEED 4
//! DIRECTION 1
//! REFERENCE 0,0
//! CLS
//! BARCODE 24,12,"128",165,0,0,1,3,"1234567890"
//! TEXT 24,193,"2",0,1,1,"Product name"
//! PRINT 1,1
//! ```
//!
//! The only binary payload is `BITMAP`, whose header is ASCII and whose
//! pixel data follows the final comma verbatim.
//!
//! ## Coordinates
//!
//! All positions and sizes other than `SIZE`/`GAP` are in dots (8 dots/mm at
//! 203 DPI). The origin is the top-left corner of the label as set by
//! `REFERENCE` and `DIRECTION`.
//!
//! ## Strings
//!
//! String parameters are wrapped in double quotes. An embedded quote is
//! written as `\["]`, the TSPL escape for a literal double quote.

use std::fmt;

use crate::render::raster::MonochromeRaster;

/// Line terminator for every command.
pub const CRLF: &[u8] = b"\r\n";

/// Bitmap draw mode: OR the image onto the label buffer.
pub const BITMAP_MODE_OR: u8 = 1;

/// A single TSPL command.
///
/// Commands are data: they can be inspected in tests, listed for previews
/// (`Display`), and encoded to the exact bytes sent to the printer.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `SIZE w mm,h mm` - label stock dimensions.
    Size { width_mm: f32, height_mm: f32 },

    /// `GAP g mm,o` - gap between labels and its offset.
    Gap { gap_mm: f32, offset_mm: f32 },

    /// `DENSITY n` - print darkness (0-15).
    Density(u8),

    /// `SPEED n` - print speed in inches per second.
    Speed(u8),

    /// `DIRECTION n` - printout orientation relative to feed.
    Direction(u8),

    /// `REFERENCE x,y` - origin offset.
    Reference { x: u32, y: u32 },

    /// `CLS` - clear the image buffer.
    Cls,

    /// `BARCODE x,y,"128",h,hri,rot,narrow,wide,"content"`
    Barcode(BarcodeCommand),

    /// `TEXT x,y,"font",rot,sx,sy,"content"`
    Text(TextCommand),

    /// `BITMAP x,y,width_bytes,height,mode,data`
    Bitmap { x: u32, y: u32, raster: MonochromeRaster },

    /// `PRINT sets,copies`
    Print { sets: u32, copies: u32 },
}

/// Parameters of a Code 128 barcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeCommand {
    pub x: u32,
    pub y: u32,
    pub height: u32,
    pub narrow: u32,
    pub wide: u32,
    pub content: String,
}

/// Parameters of a single text line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCommand {
    pub x: u32,
    pub y: u32,
    pub font: &'static str,
    pub scale_x: u32,
    pub scale_y: u32,
    pub content: String,
}

impl Command {
    /// Encode this command, including its CRLF terminator, into `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Command::Bitmap { x, y, raster } => {
                let header = format!(
                    "BITMAP {},{},{},{},{},",
                    x,
                    y,
                    raster.width_bytes(),
                    raster.height_dots(),
                    BITMAP_MODE_OR
                );
                out.extend_from_slice(header.as_bytes());
                out.extend_from_slice(raster.bytes());
            }
            other => out.extend_from_slice(other.to_string().as_bytes()),
        }
        out.extend_from_slice(CRLF);
    }

    /// Encode this command to a fresh byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }

    /// The command keyword (`SIZE`, `BARCODE`, ...).
    pub fn keyword(&self) -> &'static str {
        match self {
            Command::Size { .. } => "SIZE",
            Command::Gap { .. } => "GAP",
            Command::Density(_) => "DENSITY",
            Command::Speed(_) => "SPEED",
            Command::Direction(_) => "DIRECTION",
            Command::Reference { .. } => "REFERENCE",
            Command::Cls => "CLS",
            Command::Barcode(_) => "BARCODE",
            Command::Text(_) => "TEXT",
            Command::Bitmap { .. } => "BITMAP",
            Command::Print { .. } => "PRINT",
        }
    }
}

/// Human-readable form of the command line, without the terminator.
///
/// For every command except `BITMAP` this is exactly the text sent to the
/// printer. Bitmaps show a byte count in place of the binary payload.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Size {
                width_mm,
                height_mm,
            } => write!(f, "SIZE {} mm,{} mm", width_mm, height_mm),
            Command::Gap { gap_mm, offset_mm } => write!(f, "GAP {} mm,{}", gap_mm, offset_mm),
            Command::Density(n) => write!(f, "DENSITY {}", n),
            Command::Speed(n) => write!(f, "SPEED {}", n),
            Command::Direction(n) => write!(f, "DIRECTION {}", n),
            Command::Reference { x, y } => write!(f, "REFERENCE {},{}", x, y),
            Command::Cls => f.write_str("CLS"),
            Command::Barcode(b) => write!(
                f,
                "BARCODE {},{},\"128\",{},0,0,{},{},{}",
                b.x,
                b.y,
                b.height,
                b.narrow,
                b.wide,
                quoted(&b.content)
            ),
            Command::Text(t) => write!(
                f,
                "TEXT {},{},\"{}\",0,{},{},{}",
                t.x,
                t.y,
                t.font,
                t.scale_x,
                t.scale_y,
                quoted(&t.content)
            ),
            Command::Bitmap { x, y, raster } => write!(
                f,
                "BITMAP {},{},{},{},{},<{} bytes>",
                x,
                y,
                raster.width_bytes(),
                raster.height_dots(),
                BITMAP_MODE_OR,
                raster.bytes().len()
            ),
            Command::Print { sets, copies } => write!(f, "PRINT {},{}", sets, copies),
        }
    }
}

/// Wrap a string parameter in quotes, escaping embedded quotes as `\["]`.
///
/// ## Example
///
/// ```
/// use stocklabel::protocol::commands::quoted;
///
/// assert_eq!(quoted("A1"), "\"A1\"");
/// assert_eq!(quoted("12\" pipe"), "\"12\\[\"] pipe\"");
/// ```
pub fn quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\[\"]"),
            '\r' | '\n' => out.push(' '),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

// ============================================================================
// COMMAND STREAM
// ============================================================================

/// An ordered list of commands making up one label job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandStream {
    pub commands: Vec<Command>,
}

impl CommandStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Number of commands with the given keyword.
    pub fn count(&self, keyword: &str) -> usize {
        self.commands
            .iter()
            .filter(|c| c.keyword() == keyword)
            .count()
    }

    /// Keywords in emission order.
    pub fn keywords(&self) -> Vec<&'static str> {
        self.commands.iter().map(Command::keyword).collect()
    }

    /// Encode every command into the byte stream sent to the printer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for command in &self.commands {
            command.encode_into(&mut out);
        }
        out
    }
}

/// One command per line, bitmap payloads summarized.
impl fmt::Display for CommandStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for command in &self.commands {
            writeln!(f, "{}", command)?;
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
