//! Option model: defaults, config file layering, and validation.
//!
//! Options come from three layers, later layers winning:
//!
//! ```text
//! stock defaults  →  --config FILE (TOML)  →  command-line flags
//! ```
//!
//! The merged [`Options`] are then checked by [`Options::validate`], which
//! produces the immutable [`Settings`] every later stage receives by
//! reference. Nothing in the pipeline reads global state.
//!
//! ## Config File
//!
//! ```toml
//! # All keys are optional - defaults shown below
//!
//! # input_dir = "photos"        # same as --in-dir
//! # output_dir = "web"          # same as --out-dir
//! quiet = false
//! use_exif = false              # --use-exif
//! use_names = false             # --use-names
//! no_convert = false            # --no-convert
//! strict = false                # --strict
//!
//! [full]
//! size = "640x640"
//! quality = 80
//! prefix = ""
//! suffix = ""
//!
//! [thumbnail]
//! size = "0"                    # "0" disables thumbnails
//! quality = 40
//! prefix = "tn_"
//! suffix = ""
//!
//! [gallery]
//! file = "index.html"
//! title = "HTML Thumbnail Gallery"
//! description = ""
//! per_row = 5
//! compression = 0               # 0 none, 1 gzip, 2 gzip then restore
//!
//! [colors]
//! background = "#cccccc"
//! text = "#000000"
//! link = "#0000ff"
//! active_link = "#ff0000"
//! visited_link = "#990099"
//!
//! [conversion]
//! interlace = false
//! comments = []
//! args = []                     # extra converter options, all renditions
//! full_args = []
//! thumbnail_args = []
//!
//! [tools]
//! file = "file"
//! convert = "convert"
//! exif = "exif"
//! gzip = "gzip"
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! ## Validation
//!
//! | Check | Outcome | Exit code |
//! |---|---|---|
//! | input dir missing / not a dir / unreadable | fatal | 10 / 11 / 12 |
//! | output dir missing / not a dir / unwritable | fatal | 15 / 16 / 17 |
//! | quality outside 1–100 | clamped, warning | |
//! | full-size and thumbnail prefix+suffix equal | fatal | 20 |
//! | pictures per row < 1 | clamped, warning | |
//! | compression outside 0–2 | clamped, warning | |

use crate::naming::collapse_separators;
use crate::tools::{Quality, SIZE_DISABLED};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Comment embedded in every converted image before user comments.
pub const BASE_COMMENT: &str = concat!("created with ", env!("CARGO_PKG_NAME"));

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("No in-dir supplied.")]
    InputMissing,
    #[error("The supplied in-dir does not exist: {0}")]
    InputNotFound(PathBuf),
    #[error("The supplied in-dir is not a directory: {0}")]
    InputNotDirectory(PathBuf),
    #[error("The supplied in-dir is not readable: {0}")]
    InputNotReadable(PathBuf),
    #[error("No out-dir supplied.")]
    OutputMissing,
    #[error("The supplied out-dir does not exist: {0}")]
    OutputNotFound(PathBuf),
    #[error("The supplied out-dir is not a directory: {0}")]
    OutputNotDirectory(PathBuf),
    #[error("The supplied out-dir is not writable: {0}")]
    OutputNotWritable(PathBuf),
    #[error("{{im,tn}}-prefix and {{im,tn}}-suffix are equal (prefix {prefix:?}, suffix {suffix:?}).")]
    NameCollision { prefix: String, suffix: String },
}

impl ConfigError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            ConfigError::Io(_) | ConfigError::Toml(_) => 1,
            ConfigError::InputMissing | ConfigError::InputNotFound(_) => 10,
            ConfigError::InputNotDirectory(_) => 11,
            ConfigError::InputNotReadable(_) => 12,
            ConfigError::OutputMissing | ConfigError::OutputNotFound(_) => 15,
            ConfigError::OutputNotDirectory(_) => 16,
            ConfigError::OutputNotWritable(_) => 17,
            ConfigError::NameCollision { .. } => 20,
        }
    }
}

/// A non-fatal correction made during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Command-line name of the adjusted option, e.g. `im-qual`.
    pub option: &'static str,
    pub adjusted_to: i64,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} adjusted to {}.", self.option, self.adjusted_to)
    }
}

// =============================================================================
// Raw options (defaults + config file + CLI)
// =============================================================================

/// Unvalidated options as merged from all layers.
///
/// Numeric values are kept wide and signed so out-of-range input can be
/// clamped with a warning instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub quiet: bool,
    pub use_exif: bool,
    pub use_names: bool,
    pub no_convert: bool,
    pub strict: bool,
    pub full: RenditionOptions,
    #[serde(default = "RenditionOptions::thumbnail")]
    pub thumbnail: RenditionOptions,
    pub gallery: GalleryOptions,
    pub colors: ColorScheme,
    pub conversion: ConversionOptions,
    pub tools: ToolPrograms,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            input_dir: None,
            output_dir: None,
            quiet: false,
            use_exif: false,
            use_names: false,
            no_convert: false,
            strict: false,
            full: RenditionOptions::full_size(),
            thumbnail: RenditionOptions::thumbnail(),
            gallery: GalleryOptions::default(),
            colors: ColorScheme::default(),
            conversion: ConversionOptions::default(),
            tools: ToolPrograms::default(),
        }
    }
}

/// Size, quality and naming for one rendition (full-size or thumbnail).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenditionOptions {
    /// Converter geometry such as `640x640`; `"0"` disables thumbnails.
    pub size: String,
    pub quality: i64,
    pub prefix: String,
    pub suffix: String,
}

impl RenditionOptions {
    pub fn full_size() -> Self {
        Self {
            size: "640x640".to_string(),
            quality: 80,
            prefix: String::new(),
            suffix: String::new(),
        }
    }

    pub fn thumbnail() -> Self {
        Self {
            size: SIZE_DISABLED.to_string(),
            quality: 40,
            prefix: "tn_".to_string(),
            suffix: String::new(),
        }
    }
}

impl Default for RenditionOptions {
    fn default() -> Self {
        Self::full_size()
    }
}

/// Gallery page settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryOptions {
    /// File name of the HTML page inside the output directory.
    pub file: String,
    pub title: String,
    /// Paragraph under the heading; omitted when empty.
    pub description: String,
    pub per_row: i64,
    /// 0 = none, 1 = gzip, 2 = gzip then restore.
    pub compression: i64,
}

impl Default for GalleryOptions {
    fn default() -> Self {
        Self {
            file: "index.html".to_string(),
            title: "HTML Thumbnail Gallery".to_string(),
            description: String::new(),
            per_row: 5,
            compression: 0,
        }
    }
}

/// Body colors of the gallery page. Values are written out verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    pub link: String,
    pub active_link: String,
    pub visited_link: String,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            background: "#cccccc".to_string(),
            text: "#000000".to_string(),
            link: "#0000ff".to_string(),
            active_link: "#ff0000".to_string(),
            visited_link: "#990099".to_string(),
        }
    }
}

/// Converter behaviour shared by both renditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConversionOptions {
    pub interlace: bool,
    /// Appended to the embedded comment as ` # <comment>`, in order.
    pub comments: Vec<String>,
    /// Extra converter options for every rendition, whitespace-separated.
    pub args: Vec<String>,
    pub full_args: Vec<String>,
    pub thumbnail_args: Vec<String>,
}

/// Program names for the external tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolPrograms {
    pub file: String,
    pub convert: String,
    pub exif: String,
    pub gzip: String,
}

impl Default for ToolPrograms {
    fn default() -> Self {
        Self {
            file: "file".to_string(),
            convert: "convert".to_string(),
            exif: "exif".to_string(),
            gzip: "gzip".to_string(),
        }
    }
}

// =============================================================================
// Validated settings
// =============================================================================

/// What to do with the gallery file after writing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    /// Replace the page with `<page>.gz`.
    Gzip,
    /// Compress, then decompress back to the plain page (both files remain).
    GzipRestore,
}

impl Compression {
    /// Map an already clamped level (0–2).
    fn from_level(level: i64) -> Self {
        match level {
            1 => Compression::Gzip,
            2 => Compression::GzipRestore,
            _ => Compression::None,
        }
    }
}

/// Validated rendition settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendition {
    pub size: String,
    pub quality: Quality,
    pub prefix: String,
    pub suffix: String,
}

impl Rendition {
    /// True for the `"0"` size sentinel.
    pub fn is_disabled(&self) -> bool {
        self.size == SIZE_DISABLED
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gallery {
    pub file: String,
    pub title: String,
    pub description: String,
    pub per_row: usize,
    pub compression: Compression,
}

/// Converter options with extra-argument strings split into argv entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversion {
    pub interlace: bool,
    pub comments: Vec<String>,
    pub general_args: Vec<String>,
    pub full_size_args: Vec<String>,
    pub thumbnail_args: Vec<String>,
}

/// Immutable run configuration produced by [`Options::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub quiet: bool,
    pub use_exif: bool,
    pub use_names: bool,
    pub no_convert: bool,
    pub strict: bool,
    pub full: Rendition,
    pub thumbnail: Rendition,
    pub gallery: Gallery,
    pub colors: ColorScheme,
    pub conversion: Conversion,
    pub tools: ToolPrograms,
}

impl Settings {
    /// Comment embedded in converted files: the base text plus
    /// ` # <comment>` for each user comment.
    pub fn embedded_comment(&self) -> String {
        let mut comment = BASE_COMMENT.to_string();
        for extra in &self.conversion.comments {
            comment.push_str(" # ");
            comment.push_str(extra);
        }
        comment
    }

    /// Extra converter arguments for the full-size rendition.
    pub fn full_size_args(&self) -> Vec<String> {
        let mut args = self.conversion.general_args.clone();
        args.extend(self.conversion.full_size_args.iter().cloned());
        args
    }

    /// Extra converter arguments for the thumbnail rendition.
    pub fn thumbnail_args(&self) -> Vec<String> {
        let mut args = self.conversion.general_args.clone();
        args.extend(self.conversion.thumbnail_args.iter().cloned());
        args
    }

    /// Where the gallery page is written.
    pub fn gallery_path(&self) -> PathBuf {
        PathBuf::from(collapse_separators(&format!(
            "{}/{}",
            self.output_dir.to_string_lossy(),
            self.gallery.file
        )))
    }
}

impl Options {
    /// Check and normalize the options.
    ///
    /// Corrections are pushed onto `warnings` in the order they are made,
    /// including those made before a later check fails, so the caller can
    /// report them either way.
    pub fn validate(self, warnings: &mut Vec<Warning>) -> Result<Settings, ConfigError> {
        let input_dir = check_input_dir(self.input_dir)?;
        let output_dir = check_output_dir(self.output_dir)?;

        let full_quality = clamp_option("im-qual", self.full.quality, 1, 100, warnings);
        let thumbnail_quality = clamp_option("tn-qual", self.thumbnail.quality, 1, 100, warnings);

        if self.full.prefix == self.thumbnail.prefix && self.full.suffix == self.thumbnail.suffix {
            return Err(ConfigError::NameCollision {
                prefix: self.full.prefix,
                suffix: self.full.suffix,
            });
        }

        let per_row = clamp_option("gal-pprow", self.gallery.per_row, 1, i64::MAX, warnings);
        let compression = clamp_option("gal-gzip", self.gallery.compression, 0, 2, warnings);

        Ok(Settings {
            input_dir,
            output_dir,
            quiet: self.quiet,
            use_exif: self.use_exif,
            use_names: self.use_names,
            no_convert: self.no_convert,
            strict: self.strict,
            full: Rendition {
                size: self.full.size,
                quality: Quality::new(full_quality as u32),
                prefix: self.full.prefix,
                suffix: self.full.suffix,
            },
            thumbnail: Rendition {
                size: self.thumbnail.size,
                quality: Quality::new(thumbnail_quality as u32),
                prefix: self.thumbnail.prefix,
                suffix: self.thumbnail.suffix,
            },
            gallery: Gallery {
                file: self.gallery.file,
                title: self.gallery.title,
                description: self.gallery.description,
                per_row: usize::try_from(per_row).unwrap_or(usize::MAX),
                compression: Compression::from_level(compression),
            },
            colors: self.colors,
            conversion: Conversion {
                interlace: self.conversion.interlace,
                comments: self.conversion.comments,
                general_args: split_args(&self.conversion.args),
                full_size_args: split_args(&self.conversion.full_args),
                thumbnail_args: split_args(&self.conversion.thumbnail_args),
            },
            tools: self.tools,
        })
    }
}

/// Clamp `value` into `[min, max]`, recording a warning when it moves.
fn clamp_option(
    option: &'static str,
    value: i64,
    min: i64,
    max: i64,
    warnings: &mut Vec<Warning>,
) -> i64 {
    let clamped = value.clamp(min, max);
    if clamped != value {
        warnings.push(Warning {
            option,
            adjusted_to: clamped,
        });
    }
    clamped
}

/// Split option strings on whitespace into individual arguments.
fn split_args(options: &[String]) -> Vec<String> {
    options
        .iter()
        .flat_map(|s| s.split_whitespace())
        .map(String::from)
        .collect()
}

fn check_input_dir(dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    let dir = dir.ok_or(ConfigError::InputMissing)?;
    if !dir.exists() {
        return Err(ConfigError::InputNotFound(dir));
    }
    if !dir.is_dir() {
        return Err(ConfigError::InputNotDirectory(dir));
    }
    if fs::read_dir(&dir).is_err() {
        return Err(ConfigError::InputNotReadable(dir));
    }
    Ok(dir)
}

fn check_output_dir(dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    let dir = dir.ok_or(ConfigError::OutputMissing)?;
    if !dir.exists() {
        return Err(ConfigError::OutputNotFound(dir));
    }
    if !dir.is_dir() {
        return Err(ConfigError::OutputNotDirectory(dir));
    }
    if !is_writable(&dir) {
        return Err(ConfigError::OutputNotWritable(dir));
    }
    Ok(dir)
}

/// Whether the current user may create files in `dir`, as answered by
/// `access(2)`. Nothing is written.
#[cfg(unix)]
fn is_writable(dir: &Path) -> bool {
    rustix::fs::access(dir, rustix::fs::Access::WRITE_OK).is_ok()
}

#[cfg(not(unix))]
fn is_writable(dir: &Path) -> bool {
    fs::metadata(dir)
        .map(|m| !m.permissions().readonly())
        .unwrap_or(false)
}

// =============================================================================
// Config loading and merging
// =============================================================================

/// Returns the stock default options as a `toml::Value::Table`.
///
/// This is the base layer user config files are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(Options::default())
        .map_err(|e| ConfigError::Io(std::io::Error::other(e)))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(value)
}

/// Merge an optional overlay onto a base value and deserialize the result.
pub fn resolve_options(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Options, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let options: Options = merged.try_into()?;
    Ok(options)
}

/// Load options: stock defaults, overridden by `config_file` when given.
pub fn load_options(config_file: Option<&Path>) -> Result<Options, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = config_file.map(load_raw_config).transpose()?;
    resolve_options(base, overlay)
}

/// Returns a fully-commented stock config file with every key.
///
/// Printed by `--gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# thumbgal configuration
# ======================
# Pass with --config FILE. Every key is optional; values below are the
# defaults. Command-line flags override anything set here.
# Unknown keys are rejected.

# Directory holding the original images (--in-dir).
# input_dir = "photos"

# Directory receiving converted images and the gallery (--out-dir).
# Existing files with the same names are overwritten.
# output_dir = "web"

# Suppress progress output on stdout (--quiet).
quiet = false

# Show the EXIF capture time under each picture (--use-exif).
use_exif = false

# Keep original basenames instead of 00001, 00002, ... (--use-names).
use_names = false

# Skip conversion and link the original files (--no-convert).
no_convert = false

# Abort with exit code 30 when an external tool fails (--strict).
strict = false

# ---------------------------------------------------------------------------
# Full-size images
# ---------------------------------------------------------------------------
[full]
# Bounding box handed to the converter (--im-size).
size = "640x640"
# Encoding quality, 1-100 (--im-qual).
quality = 80
# File name prefix and suffix (--im-prefix, --im-suffix).
prefix = ""
suffix = ""

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnail]
# Bounding box; "0" disables thumbnails (--tn-size).
size = "0"
# Encoding quality, 1-100 (--tn-qual).
quality = 40
# Must not equal the full-size prefix+suffix pair.
prefix = "tn_"
suffix = ""

# ---------------------------------------------------------------------------
# Gallery page
# ---------------------------------------------------------------------------
[gallery]
file = "index.html"
title = "HTML Thumbnail Gallery"
description = ""
# Pictures per table row, at least 1 (--gal-pprow).
per_row = 5
# 0 = plain, 1 = gzip the page, 2 = gzip then restore the plain page (--gal-gzip).
compression = 0

# ---------------------------------------------------------------------------
# Page colors (written to the <body> tag verbatim)
# ---------------------------------------------------------------------------
[colors]
background = "#cccccc"
text = "#000000"
link = "#0000ff"
active_link = "#ff0000"
visited_link = "#990099"

# ---------------------------------------------------------------------------
# Converter options
# ---------------------------------------------------------------------------
[conversion]
# Write interlaced/progressive images (--interlace).
interlace = false
# Appended to the embedded image comment (--comment).
comments = []
# Extra converter options, split on whitespace (--conv-opts).
args = []
# Extra options for full-size images only (--conv-opts-fs).
full_args = []
# Extra options for thumbnails only (--conv-opts-tn).
thumbnail_args = []

# ---------------------------------------------------------------------------
# External programs
# ---------------------------------------------------------------------------
[tools]
file = "file"
convert = "convert"     # use "magick" for ImageMagick 7 without the legacy shim
exif = "exif"
gzip = "gzip"
"##
}
