//! Gallery page rendering.
//!
//! Renders one HTML page with [maud](https://maud.lambda.xyz/): a centered
//! heading, an optional description, and a table of preview images, one cell
//! per record in gallery order:
//!
//! ```text
//! ┌─────────┬─────────┬─────────┬─────────┬─────────┐
//! │ 00001   │ 00002   │ &nbsp;  │ &nbsp;  │ &nbsp;  │   per_row = 5
//! └─────────┴─────────┴─────────┴─────────┴─────────┘
//! ```
//!
//! Each cell links the full-size image and shows the thumbnail (or the
//! full-size image when thumbnails are off, or the original when nothing was
//! converted). The last row is padded to a full row. All text and attribute
//! values go through maud's escaping.
//!
//! Links are relative to the output directory. Files this run wrote are
//! referenced by their path inside it; originals are referenced through a
//! `../` path computed from canonicalized directories. Each path segment is
//! percent-encoded so names containing `#`, `?` or spaces still resolve.
//!
//! After writing, the page may be compressed with gzip (`FILE.gz`), and
//! optionally restored so both `FILE` and `FILE.gz` remain.

use crate::config::{Compression, Settings};
use crate::naming::{encode_href, path_in_dir, relative_href};
use crate::record::ImageRecord;
use crate::tools::{ImageTools, ToolError};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Compressing {path} failed: {error}")]
    Tool {
        path: PathBuf,
        #[source]
        error: ToolError,
    },
}

/// Inline style for the heading and table cells.
const PAGE_STYLE: &str =
    "h1 { font-size: x-large; } td { font-size: small; text-align: center; vertical-align: middle; }";

/// Project page the footer credit links to; empty when the package has none.
pub const HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");

/// Everything one table cell shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryCell {
    pub href: String,
    pub preview: String,
    /// File name of the linked image, used in the alt text.
    pub link_name: String,
    pub caption: Option<String>,
}

/// Where the gallery ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryOutput {
    /// The plain page, when it still exists after compression.
    pub page: Option<PathBuf>,
    pub compressed: Option<PathBuf>,
}

/// Build the cells for `records`, computing links relative to the output
/// directory.
pub fn gallery_cells(
    settings: &Settings,
    records: &[ImageRecord],
) -> Result<Vec<GalleryCell>, GenerateError> {
    let out_dir = &settings.output_dir;
    let canonical_out = if records.iter().any(|r| r.full_size.is_none()) {
        Some(fs::canonicalize(out_dir)?)
    } else {
        None
    };

    let href_for = |path: &Path, converted: bool| -> Result<String, GenerateError> {
        match (&canonical_out, converted) {
            (Some(base), false) => Ok(encode_href(&relative_href(
                &fs::canonicalize(path)?,
                base,
            ))),
            _ => Ok(encode_href(&path_in_dir(path, out_dir))),
        }
    };

    records
        .iter()
        .map(|record| {
            let link = record.link_target();
            let preview = record.preview_target();
            Ok(GalleryCell {
                href: href_for(link, record.full_size.is_some())?,
                preview: href_for(preview, record.full_size.is_some())?,
                link_name: link
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
                caption: record.captured_at.clone(),
            })
        })
        .collect()
}

/// Split `items` into rows of `per_row` slots. Each row is its items plus
/// the number of empty slots that pad it to full width.
pub fn layout_rows<T>(items: &[T], per_row: usize) -> Vec<(&[T], usize)> {
    let per_row = per_row.max(1);
    items
        .chunks(per_row)
        .map(|chunk| (chunk, per_row - chunk.len()))
        .collect()
}

/// Stands in for the table rows in the rendered page frame.
const ROWS_SLOT: &str = "<!--rows-->";

const EMPTY_CELL: &str = "<td>&nbsp;</td>";

/// Render the complete gallery page.
pub fn render_gallery(settings: &Settings, cells: &[GalleryCell]) -> String {
    let mut page = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_page(&mut page, settings, cells);
    String::from_utf8_lossy(&page).into_owned()
}

/// Stream the page to `out`. Rows are written one at a time and padding
/// cells one by one, so the page never has to fit in memory.
pub fn write_page(
    out: &mut impl Write,
    settings: &Settings,
    cells: &[GalleryCell],
) -> io::Result<()> {
    let frame = render_frame(settings).into_string();
    let (head, tail) = frame.split_once(ROWS_SLOT).unwrap_or((frame.as_str(), ""));

    out.write_all(head.as_bytes())?;
    for (row, padding) in layout_rows(cells, settings.gallery.per_row) {
        out.write_all(b"<tr>")?;
        for cell in row {
            out.write_all(render_cell(cell).into_string().as_bytes())?;
        }
        for _ in 0..padding {
            out.write_all(EMPTY_CELL.as_bytes())?;
        }
        out.write_all(b"</tr>")?;
    }
    out.write_all(tail.as_bytes())
}

/// The page without its table rows.
fn render_frame(settings: &Settings) -> Markup {
    let gallery = &settings.gallery;
    let colors = &settings.colors;
    let generator = format!("{} {}", crate::TOOL_NAME, crate::VERSION);

    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (gallery.title) }
                meta name="generator" content=(generator);
                meta name="robots" content="noindex,noarchive,follow";
                style type="text/css" { (PAGE_STYLE) }
            }
            body
                bgcolor=(colors.background)
                text=(colors.text)
                link=(colors.link)
                alink=(colors.active_link)
                vlink=(colors.visited_link)
            {
                h1 align="center" { (gallery.title) }
                @if !gallery.description.is_empty() {
                    p align="center" { (gallery.description) }
                }
                table align="center" border="1" cellspacing="1" cellpadding="4" summary="Thumbnail gallery" {
                    (PreEscaped(ROWS_SLOT))
                }
                (render_credit(HOMEPAGE))
            }
        }
    }
}

fn render_credit(homepage: &str) -> Markup {
    html! {
        p align="center" style="font-size: x-small;" {
            "Gallery created with "
            @if homepage.is_empty() {
                (crate::TOOL_NAME)
            } @else {
                a href=(homepage) { (crate::TOOL_NAME) }
            }
            "."
        }
    }
}

fn render_cell(cell: &GalleryCell) -> Markup {
    html! {
        td {
            a href=(cell.href) {
                img src=(cell.preview) alt={ "preview for " (cell.link_name) };
            }
            @if let Some(caption) = &cell.caption {
                br;
                (caption)
            }
        }
    }
}

/// Render the gallery for `records`, write it, and apply the configured
/// compression.
pub fn write_gallery(
    tools: &impl ImageTools,
    settings: &Settings,
    records: &[ImageRecord],
) -> Result<GalleryOutput, GenerateError> {
    let cells = gallery_cells(settings, records)?;
    let page = settings.gallery_path();
    if let Some(parent) = page.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = BufWriter::new(File::create(&page)?);
    write_page(&mut file, settings, &cells)?;
    file.flush()?;
    drop(file);

    let mut archive = page.as_os_str().to_owned();
    archive.push(".gz");
    let archive = PathBuf::from(archive);

    match settings.gallery.compression {
        Compression::None => Ok(GalleryOutput {
            page: Some(page),
            compressed: None,
        }),
        Compression::Gzip => {
            if !compress_step(settings.strict, &page, tools.compress(&page))? {
                return Ok(GalleryOutput {
                    page: Some(page),
                    compressed: None,
                });
            }
            Ok(GalleryOutput {
                page: None,
                compressed: Some(archive),
            })
        }
        Compression::GzipRestore => {
            if !compress_step(settings.strict, &page, tools.compress(&page))? {
                return Ok(GalleryOutput {
                    page: Some(page),
                    compressed: None,
                });
            }
            let restored =
                compress_step(settings.strict, &archive, tools.decompress(&archive, &page))?;
            Ok(GalleryOutput {
                page: restored.then_some(page),
                compressed: Some(archive),
            })
        }
    }
}

/// Returns whether the step succeeded. Failures are errors only when
/// `strict`.
fn compress_step(
    strict: bool,
    path: &Path,
    result: Result<(), ToolError>,
) -> Result<bool, GenerateError> {
    match result {
        Ok(()) => Ok(true),
        Err(error) if strict => Err(GenerateError::Tool {
            path: path.to_path_buf(),
            error,
        }),
        Err(error) => {
            warn!(path = %path.display(), %error, "gzip failed, continuing");
            Ok(false)
        }
    }
}
