//! # Printer Status Probe
//!
//! Before each job the printer is asked for its health with `~HS`. Replies
//! vary by firmware, so the response is not parsed structurally: the raw text
//! is searched case-insensitively for phrases that name a fault.
//!
//! | Reason | Matched phrases |
//! |--------|-----------------|
//! | Paper out | `paper out`, `out of paper`, `no paper`, `paper empty`, `paper end` |
//! | Door open | `door open`, `cover open`, `head open`, `lid open` |
//! | Paused | `pause` |
//! | Fault | `error` |
//!
//! A reply that matches none of them, or no reply at all, is not a fault.

use std::fmt;

use serde::Serialize;

/// Status request line sent to the printer.
pub const STATUS_REQUEST: &[u8] = b"~HS\r\n";

const PAPER_OUT: &[&str] = &[
    "paper out",
    "out of paper",
    "no paper",
    "paper empty",
    "paper end",
];
const DOOR_OPEN: &[&str] = &["door open", "cover open", "head open", "lid open"];
const PAUSED: &[&str] = &["pause"];
const FAULT: &[&str] = &["error"];

/// Why the printer cannot take a job right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotReadyReason {
    PaperOut,
    DoorOpen,
    Paused,
    /// Reply mentioned an error; carries the trimmed reply text.
    Fault(String),
    /// No reply within the probe window (strict readiness only).
    NoResponse,
}

impl fmt::Display for NotReadyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PaperOut => f.write_str("out of paper"),
            Self::DoorOpen => f.write_str("printer door is open"),
            Self::Paused => f.write_str("printer is paused"),
            Self::Fault(reply) => write!(f, "printer reported an error ({})", reply),
            Self::NoResponse => f.write_str("no response to status request"),
        }
    }
}

/// Inspect a status reply for fault conditions.
///
/// Returns `None` when the reply names no fault.
///
/// ## Example
///
/// ```
/// use stocklabel::protocol::status::{parse_status, NotReadyReason};
///
/// assert_eq!(parse_status(b"PAPER OUT\r\n"), Some(NotReadyReason::PaperOut));
/// assert_eq!(parse_status(b"READY"), None);
/// ```
pub fn parse_status(reply: &[u8]) -> Option<NotReadyReason> {
    let text = String::from_utf8_lossy(reply);
    let lower = text.to_lowercase();
    let contains_any = |phrases: &[&str]| phrases.iter().any(|p| lower.contains(p));

    if contains_any(PAPER_OUT) {
        Some(NotReadyReason::PaperOut)
    } else if contains_any(DOOR_OPEN) {
        Some(NotReadyReason::DoorOpen)
    } else if contains_any(PAUSED) {
        Some(NotReadyReason::Paused)
    } else if contains_any(FAULT) {
        Some(NotReadyReason::Fault(text.trim().to_string()))
    } else {
        None
    }
}
