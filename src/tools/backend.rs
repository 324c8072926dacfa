//! External tool trait and shared error type.
//!
//! The [`ImageTools`] trait covers every process the pipeline shells out to:
//! media-type detection, EXIF extraction, image conversion, and gzip
//! compression. The production implementation is
//! [`ExternalTools`](super::external::ExternalTools); tests use the recording
//! [`MockTools`](tests::MockTools) so the pipeline can be exercised without
//! ImageMagick or `exif` installed.

use super::params::ConvertParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not start {program}: {error}")]
    Spawn {
        program: String,
        #[source]
        error: std::io::Error,
    },
    #[error("{program} failed ({status})")]
    Failed { program: String, status: String },
}

/// Trait for the external processes the pipeline depends on.
///
/// Implementations must be `Sync`: discovery fans detection and EXIF reads
/// out over rayon's pool.
pub trait ImageTools: Sync {
    /// Detect the MIME-like media type of a file (`image/jpeg; charset=binary`).
    fn media_type(&self, path: &Path) -> Result<String, ToolError>;

    /// Dump the EXIF tag table of an image as text.
    fn read_exif(&self, path: &Path) -> Result<String, ToolError>;

    /// Produce one resized rendition.
    fn convert(&self, params: &ConvertParams) -> Result<(), ToolError>;

    /// Compress `path` in place, leaving `<path>.gz`.
    fn compress(&self, path: &Path) -> Result<(), ToolError>;

    /// Decompress `archive` and write the plain content to `dest`.
    fn decompress(&self, archive: &Path, dest: &Path) -> Result<(), ToolError>;
}
