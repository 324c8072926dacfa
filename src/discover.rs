//! Input discovery.
//!
//! Lists the input directory (one level, symlinks followed), keeps regular
//! files whose detected media type starts with `image`, and sorts them by
//! path. Detection and the optional EXIF lookup fan out over rayon; the
//! final sort makes the order independent of completion order.
//!
//! Entries that cannot be classified are skipped with a warning:
//!
//! ```text
//! in/a.jpg       image/jpeg; charset=binary   → kept
//! in/notes.txt   text/plain; charset=us-ascii → skipped
//! in/sub/        directory                    → skipped
//! in/broken.jpg  detector failed              → skipped, warned
//! ```

use crate::config::Settings;
use crate::metadata::fetch_capture_time;
use crate::record::{ImageRecord, is_image_type};
use crate::tools::ImageTools;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum DiscoverError {
    #[error("Cannot read {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Discover the images in `settings.input_dir`, sorted by path.
pub fn discover(
    tools: &impl ImageTools,
    settings: &Settings,
) -> Result<Vec<ImageRecord>, DiscoverError> {
    let files = list_files(&settings.input_dir)?;
    let mut records = classify(tools, files);
    if settings.use_exif {
        attach_capture_times(tools, &mut records);
    }
    Ok(records)
}

/// Regular files directly inside `dir`.
fn list_files(dir: &Path) -> Result<Vec<PathBuf>, DiscoverError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) if source.depth() == 0 => {
                return Err(DiscoverError::Walk {
                    path: dir.to_path_buf(),
                    source,
                });
            }
            Err(e) => {
                warn!(error = %e, "cannot read entry, skipping");
                continue;
            }
        };
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        } else {
            debug!(path = %entry.path().display(), "skipping non-regular entry");
        }
    }
    Ok(files)
}

/// Detect media types in parallel and keep the images, sorted by path.
fn classify(tools: &impl ImageTools, files: Vec<PathBuf>) -> Vec<ImageRecord> {
    let mut records: Vec<ImageRecord> = files
        .into_par_iter()
        .filter_map(|path| match tools.media_type(&path) {
            Ok(media_type) if is_image_type(&media_type) => {
                Some(ImageRecord::new(path, media_type))
            }
            Ok(media_type) => {
                debug!(path = %path.display(), media_type, "not an image");
                None
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot detect media type, skipping");
                None
            }
        })
        .collect();
    records.sort_by(|a, b| a.source.as_os_str().cmp(b.source.as_os_str()));
    records
}

fn attach_capture_times(tools: &impl ImageTools, records: &mut [ImageRecord]) {
    records.par_iter_mut().for_each(|record| {
        record.captured_at = fetch_capture_time(tools, &record.source);
    });
}
