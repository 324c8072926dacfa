//! # thumbgal
//!
//! Batch image converter and static HTML thumbnail gallery generator.
//!
//! Every image in an input directory is resized with ImageMagick into an
//! output directory, and a single HTML page lays the results out in a table
//! of linked previews.
//!
//! # Architecture
//!
//! ```text
//! CLI flags ─┐
//! config.toml ─▶ Options ─validate─▶ Settings
//!                                        │
//!            discover ─▶ convert ─▶ generate (+ gzip)
//! ```
//!
//! Settings are validated once, up front, and every stage receives them by
//! reference. All heavy lifting is delegated to external programs through
//! the [`tools::ImageTools`] trait, so each stage can be tested against a
//! recording mock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`cli`] | `clap` flag definitions and their overlay onto [`config::Options`] |
//! | [`config`] | Defaults, TOML config file, validation into [`config::Settings`] |
//! | [`discover`] | Lists the input directory, detects image types, sorts records |
//! | [`metadata`] | EXIF capture-time extraction |
//! | [`naming`] | Output file naming (`00001.jpg`, prefixes, suffixes) |
//! | [`convert`] | Full-size and thumbnail conversion per record |
//! | [`generate`] | Gallery page rendering with Maud, plus gzip |
//! | [`pipeline`] | Runs the stages in order |
//! | [`record`] | The per-image record shared by all stages |
//! | [`tools`] | External program integration (`file`, `exif`, `convert`, `gzip`) |
//! | [`output`] | Console output formatting |
//!
//! # Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | success |
//! | 1 | usage error, `--help`, unreadable config file |
//! | 10 / 11 / 12 | input directory missing / not a directory / unreadable |
//! | 15 / 16 / 17 | output directory missing / not a directory / unwritable |
//! | 20 | full-size and thumbnail names would collide |
//! | 30 | external tool failure under `--strict` |
//! | 40 | I/O failure reading input or writing the gallery |

pub mod cli;
pub mod config;
pub mod convert;
pub mod discover;
pub mod generate;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod record;
pub mod tools;

/// Name used in the banner, the generator meta tag, and embedded comments.
pub const TOOL_NAME: &str = env!("CARGO_PKG_NAME");

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
