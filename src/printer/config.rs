//! # Label Profile
//!
//! This module defines the label stock and printer settings used for the
//! fixed-text label, plus the timing of the status probe.
//!
//! ## Built-in Profile
//!
//! | Property | Value |
//! |----------|-------|
//! | Label size | 58 × 40 mm |
//! | Resolution | 203 DPI (8 dots/mm) |
//! | Gap | 2 mm |
//! | Density / speed | 8 / 4 |
//! | Status window | 600 ms, polled every 20 ms |
//! | Readiness | fail-open |
//!
//! ## Loading From JSON
//!
//! Every field is optional; missing ones take the built-in value.
//!
//! ```json
//! { "width_mm": 40, "height_mm": 30, "readiness": "strict" }
//! ```
//!
//! ## Usage
//!
//! ```
//! use stocklabel::printer::LabelProfile;
//!
//! let profile = LabelProfile::DEFAULT_58X40;
//! assert_eq!(profile.mm_to_dots(58.0), 464);
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LabelError;

/// What an unanswered status probe means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessPolicy {
    /// Silence counts as ready. Many printers never answer `~HS`.
    #[default]
    FailOpen,
    /// Silence counts as not ready.
    Strict,
}

/// # Label Profile
///
/// ## Calculations
///
/// ```text
/// dots_per_mm = dpi / 25.4
///
/// For 203 DPI:
///   dots_per_mm = 203 / 25.4 ≈ 8
///   58 mm = 464 dots, 40 mm = 320 dots
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelProfile {
    /// Label width in millimeters
    pub width_mm: f32,

    /// Label height in millimeters
    pub height_mm: f32,

    /// Resolution in dots per inch
    pub dpi: u16,

    /// Gap between labels in millimeters
    pub gap_mm: f32,

    /// Print darkness (0-15)
    pub density: u8,

    /// Print speed (inches per second)
    pub speed: u8,

    /// Printout direction (0 or 1)
    pub direction: u8,

    /// How long to wait for a status reply
    pub status_timeout_ms: u64,

    /// How often to check for status reply bytes
    pub status_poll_ms: u64,

    pub readiness: ReadinessPolicy,
}

impl LabelProfile {
    /// # 58 × 40 mm Warehouse Label
    pub const DEFAULT_58X40: Self = Self {
        width_mm: 58.0,
        height_mm: 40.0,
        dpi: 203,
        gap_mm: 2.0,
        density: 8,
        speed: 4,
        direction: 1,
        status_timeout_ms: 600,
        status_poll_ms: 20,
        readiness: ReadinessPolicy::FailOpen,
    };

    /// Calculate dots per millimeter
    #[inline]
    pub fn dots_per_mm(&self) -> f32 {
        self.dpi as f32 / 25.4
    }

    /// Convert millimeters to dots
    #[inline]
    pub fn mm_to_dots(&self, mm: f32) -> u32 {
        (mm * self.dots_per_mm()).round() as u32
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_millis(self.status_timeout_ms)
    }

    pub fn status_poll(&self) -> Duration {
        Duration::from_millis(self.status_poll_ms)
    }

    /// Load a profile from a JSON file.
    pub fn load(path: &Path) -> Result<Self, LabelError> {
        let text = fs::read_to_string(path).map_err(|e| {
            LabelError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    /// Parse and validate a profile from JSON text.
    pub fn from_json(text: &str) -> Result<Self, LabelError> {
        let profile: Self = serde_json::from_str(text)
            .map_err(|e| LabelError::Config(format!("Invalid profile: {}", e)))?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), LabelError> {
        if !(self.width_mm > 0.0 && self.height_mm > 0.0) {
            return Err(LabelError::Config(format!(
                "Label size must be positive, got {} x {} mm",
                self.width_mm, self.height_mm
            )));
        }
        if self.dpi == 0 {
            return Err(LabelError::Config("DPI must be positive".to_string()));
        }
        if self.density > 15 {
            return Err(LabelError::Config(format!(
                "Density must be 0-15, got {}",
                self.density
            )));
        }
        if self.status_poll_ms == 0 || self.status_poll_ms > self.status_timeout_ms {
            return Err(LabelError::Config(format!(
                "Status poll interval {} ms must be within the {} ms window",
                self.status_poll_ms, self.status_timeout_ms
            )));
        }
        Ok(())
    }
}

impl Default for LabelProfile {
    fn default() -> Self {
        Self::DEFAULT_58X40
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_dimensions() {
        let profile = LabelProfile::default();
        assert_eq!(profile, LabelProfile::DEFAULT_58X40);
        assert_eq!(profile.mm_to_dots(profile.width_mm), 464);
        assert_eq!(profile.mm_to_dots(profile.height_mm), 320);
    }

    #[test]
    fn test_dots_per_mm() {
        let dpmm = LabelProfile::DEFAULT_58X40.dots_per_mm();
        assert!((dpmm - 8.0).abs() < 0.1);
    }

    #[test]
    fn test_status_timing() {
        let profile = LabelProfile::DEFAULT_58X40;
        assert_eq!(profile.status_timeout(), Duration::from_millis(600));
        assert_eq!(profile.status_poll(), Duration::from_millis(20));
        assert_eq!(profile.readiness, ReadinessPolicy::FailOpen);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let profile =
            LabelProfile::from_json(r#"{ "width_mm": 40, "readiness": "strict" }"#).unwrap();
        assert_eq!(profile.width_mm, 40.0);
        assert_eq!(profile.height_mm, 40.0);
        assert_eq!(profile.dpi, 203);
        assert_eq!(profile.readiness, ReadinessPolicy::Strict);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            LabelProfile::from_json(r#"{ "width_mm": 0 }"#),
            Err(LabelError::Config(_))
        ));
        assert!(matches!(
            LabelProfile::from_json(r#"{ "density": 20 }"#),
            Err(LabelError::Config(_))
        ));
        assert!(matches!(
            LabelProfile::from_json(r#"{ "status_poll_ms": 0 }"#),
            Err(LabelError::Config(_))
        ));
        assert!(matches!(
            LabelProfile::from_json("not json"),
            Err(LabelError::Config(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "height_mm": 30, "gap_mm": 3 }}"#).unwrap();

        let profile = LabelProfile::load(file.path()).unwrap();
        assert_eq!(profile.height_mm, 30.0);
        assert_eq!(profile.gap_mm, 3.0);
    }

    #[test]
    fn test_load_missing_file() {
        let err = LabelProfile::load(Path::new("/nonexistent/profile.json")).unwrap_err();
        assert!(matches!(err, LabelError::Config(_)));
    }
}
