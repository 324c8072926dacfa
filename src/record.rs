//! The per-image record threaded through the pipeline.

use std::path::{Path, PathBuf};

/// Media types kept by discovery start with this.
pub const IMAGE_MEDIA_PREFIX: &str = "image";

/// One discovered source image.
///
/// Created by [`discover`](crate::discover) for regular files whose media
/// type starts with `image`. The converter fills in `full_size` and
/// `thumbnail`; with `--no-convert` both stay `None` and the gallery points
/// at the original file instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub source: PathBuf,
    /// Detector output, e.g. `image/jpeg; charset=binary`.
    pub media_type: String,
    pub full_size: Option<PathBuf>,
    pub thumbnail: Option<PathBuf>,
    /// EXIF capture time when `--use-exif` is on and the tag was found.
    pub captured_at: Option<String>,
}

impl ImageRecord {
    pub fn new(source: PathBuf, media_type: String) -> Self {
        Self {
            source,
            media_type,
            full_size: None,
            thumbnail: None,
            captured_at: None,
        }
    }

    /// File name of the original, for progress output.
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// The image a gallery cell links to: the full-size rendition, or the
    /// original when nothing was converted.
    pub fn link_target(&self) -> &Path {
        self.full_size.as_deref().unwrap_or(&self.source)
    }

    /// The image shown inside a gallery cell.
    pub fn preview_target(&self) -> &Path {
        self.thumbnail
            .as_deref()
            .unwrap_or_else(|| self.link_target())
    }

    /// Input for the thumbnail conversion: the fresh full-size file when one
    /// exists, otherwise the original.
    pub fn thumbnail_source(&self) -> &Path {
        self.link_target()
    }
}

/// Whether a detected media type denotes an image.
pub fn is_image_type(media_type: &str) -> bool {
    media_type.starts_with(IMAGE_MEDIA_PREFIX)
}
