//! # Labels
//!
//! What gets printed: the job a caller submits, its resolved form, and the
//! builder that turns it into printer commands.
//!
//! ## Modules
//!
//! - [`job`]: `LabelJob` (fixed-text or raster) and resolved `Label`
//! - [`builder`]: `Label` → TSPL command stream
//! - [`source`]: Downloading and rasterizing raster-label documents
//!
//! ## Usage Example
//!
//! ```
//! use stocklabel::label::{builder, Label};
//! use stocklabel::printer::LabelProfile;
//!
//! let label = Label::fixed_text("4006381333931", Some("Hex bolt M8"));
//! let bytes = builder::build(&label, &LabelProfile::default())?.to_bytes();
//!
//! assert!(bytes.ends_with(b"PRINT 1,1\r\n"));
//! # Ok::<(), stocklabel::LabelError>(())
//! ```

pub mod builder;
pub mod job;
pub mod source;

pub use job::{Label, LabelJob, LabelStyle};
pub use source::RasterSource;
