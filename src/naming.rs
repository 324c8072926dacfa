//! Output naming policy.
//!
//! Every converted file is named `<prefix><name><suffix>[.<ext>]` inside the
//! output directory, where `<name>` is either a five-digit sequence number
//! or the original basename:
//!
//! ```text
//! sequential (default)       --use-names
//! a.jpg  → 00001.jpg         a.jpg  → a.jpg
//! b.png  → 00002.png         b.png  → b.png
//! c      → 00003             c      → c
//! ```
//!
//! Splitting happens at the *last* period of the file name, so
//! `holiday.raw.jpg` keeps `holiday.raw` as its basename and `jpg` as its
//! extension. Runs of `/` in the assembled path collapse to a single `/`.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::path::{Component, Path, PathBuf};

/// A file name split at its last period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitName {
    pub basename: String,
    /// `None` when the name has no period at all.
    pub extension: Option<String>,
}

/// The name assigned to one record for its converted outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputName {
    pub name: String,
    pub extension: Option<String>,
}

/// Split a file name into basename and extension at the last period.
///
/// - `"a.jpg"` → (`"a"`, `Some("jpg")`)
/// - `"x.tar.gz"` → (`"x.tar"`, `Some("gz")`)
/// - `"README"` → (`"README"`, `None`)
/// - `".hidden"` → (`""`, `Some("hidden")`)
pub fn split_file_name(file_name: &str) -> SplitName {
    match file_name.rfind('.') {
        Some(dot) => SplitName {
            basename: file_name[..dot].to_string(),
            extension: Some(file_name[dot + 1..].to_string()),
        },
        None => SplitName {
            basename: file_name.to_string(),
            extension: None,
        },
    }
}

/// Format a 1-based counter as at least five zero-padded digits.
pub fn sequence_name(counter: usize) -> String {
    format!("{counter:05}")
}

/// Assign output names to sources in the order given.
///
/// With `use_original_names` the source basename is reused; otherwise names
/// are `00001`, `00002`, … with no gaps. The extension always comes from the
/// source file name.
pub fn output_names<'a>(
    sources: impl IntoIterator<Item = &'a Path>,
    use_original_names: bool,
) -> Vec<OutputName> {
    sources
        .into_iter()
        .enumerate()
        .map(|(idx, source)| {
            let file_name = source
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let split = split_file_name(&file_name);
            let name = if use_original_names {
                split.basename
            } else {
                sequence_name(idx + 1)
            };
            OutputName {
                name,
                extension: split.extension,
            }
        })
        .collect()
}

/// Collapse runs of `/` into a single separator.
pub fn collapse_separators(path: &str) -> String {
    let mut collapsed = String::with_capacity(path.len());
    let mut prev_slash = false;
    for c in path.chars() {
        if c == '/' {
            if !prev_slash {
                collapsed.push('/');
            }
            prev_slash = true;
        } else {
            collapsed.push(c);
            prev_slash = false;
        }
    }
    collapsed
}

/// Build `<dir>/<prefix><name><suffix>[.<ext>]` with separators collapsed.
pub fn output_path(
    dir: &Path,
    prefix: &str,
    name: &str,
    suffix: &str,
    extension: Option<&str>,
) -> PathBuf {
    let mut path = format!("{}/{prefix}{name}{suffix}", dir.to_string_lossy());
    if let Some(ext) = extension {
        path.push('.');
        path.push_str(ext);
    }
    PathBuf::from(collapse_separators(&path))
}

/// `path` relative to `dir` when it lives inside it, else its file name.
///
/// Used for files this run wrote into the output directory, whose prefix
/// may add subdirectories (`thumbs/00001.jpg`).
pub fn path_in_dir(path: &Path, dir: &Path) -> String {
    match path.strip_prefix(dir) {
        Ok(rel) => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
    }
}

/// Relative link from `base_dir` to `target`, joined with `/`.
///
/// Both paths should be absolute and canonical; the result walks up with
/// `..` to the common ancestor and back down to the target.
pub fn relative_href(target: &Path, base_dir: &Path) -> String {
    let target: Vec<Component> = target.components().collect();
    let base: Vec<Component> = base_dir.components().collect();
    let common = target
        .iter()
        .zip(&base)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> =
        std::iter::repeat_n("..".to_string(), base.len() - common).collect();
    parts.extend(
        target[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().to_string()),
    );
    parts.join("/")
}

/// Bytes escaped inside one URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode each `/`-separated segment of a relative link.
///
/// `#` and `?` in a file name would otherwise end the path part of the URL.
pub fn encode_href(href: &str) -> String {
    href.split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}
