//! Parameter types for external tool invocations.
//!
//! These structs describe *what* to produce, not *how*. They sit between the
//! [`convert`](crate::convert) stage (which decides which renditions to
//! create and where) and the [`ImageTools`](super::ImageTools) implementation
//! (which runs the actual process). Keeping them plain data lets tests assert
//! on exactly what would have been passed to the converter.
//!
//! ## Types
//!
//! - [`Quality`]: lossy encoding quality (1-100), clamped on construction.
//! - [`ConvertParams`]: everything one converter run needs.

use std::fmt;
use std::path::PathBuf;

/// Thumbnail size value meaning "do not generate a thumbnail".
pub const SIZE_DISABLED: &str = "0";

/// Interlace scheme requested from the converter when interlacing is on.
pub const INTERLACE_SCHEME: &str = "Line";

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parameters for a single converter run (resize + re-encode).
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Geometry handed to the converter verbatim, e.g. `640x640`.
    pub size: String,
    pub quality: Quality,
    /// General arguments followed by rendition-specific ones.
    pub extra_args: Vec<String>,
    pub interlace: bool,
    /// Text embedded in the output file's comment field.
    pub comment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_displays_as_plain_number() {
        assert_eq!(Quality::new(80).to_string(), "80");
    }
}
