//! Console output.
//!
//! Progress goes to stdout and is silenced by `--quiet`; warnings and fatal
//! errors always go to stderr. A typical run:
//!
//! ```text
//! thumbgal 0.1.0 - HTML thumbnail gallery generator
//!
//! Searching for image files... done. Found 2 images.
//! Converting images...
//!     001 a.jpg -> 00001.jpg -> tn_00001.jpg
//!     002 b.png -> 00002.png -> tn_00002.png
//! Converted 2 images.
//! Wrote gallery web/index.html
//! ```
//!
//! Each `format_*` function returns lines (no I/O, so tests can check them)
//! and has a `print_*` wrapper that writes them out.

use crate::config::Warning;
use crate::convert::{ConvertEvent, ConvertSummary};
use crate::generate::GalleryOutput;
use std::path::Path;

pub fn format_banner() -> Vec<String> {
    vec![
        format!(
            "{} {} - HTML thumbnail gallery generator",
            crate::TOOL_NAME,
            crate::VERSION
        ),
        String::new(),
    ]
}

pub fn print_banner() {
    print_lines(&format_banner());
}

/// Hint shown when the program is run without arguments.
pub fn format_usage_hint(program: &str) -> Vec<String> {
    vec![format!("Type '{program} --help' for usage.")]
}

pub fn format_discovery(count: usize) -> Vec<String> {
    let noun = if count == 1 { "image" } else { "images" };
    vec![format!("Searching for image files... done. Found {count} {noun}.")]
}

pub fn format_conversion_start(no_convert: bool) -> Vec<String> {
    if no_convert {
        vec!["Skipping conversion, linking originals.".to_string()]
    } else {
        vec!["Converting images...".to_string()]
    }
}

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{pos:03}")
}

/// One line per converted record: `index original -> full-size [-> thumbnail]`.
pub fn format_convert_event(event: &ConvertEvent) -> Vec<String> {
    let mut line = format!(
        "    {} {} -> {}",
        format_index(event.index),
        event.original,
        event.full_size
    );
    if let Some(thumbnail) = &event.thumbnail {
        line.push_str(" -> ");
        line.push_str(thumbnail);
    }
    if event.failures > 0 {
        line.push_str(" (failed)");
    }
    vec![line]
}

pub fn format_convert_summary(summary: &ConvertSummary) -> Vec<String> {
    if summary.failed > 0 {
        vec![format!(
            "Converted {} images, {} failed.",
            summary.converted, summary.failed
        )]
    } else {
        vec![format!("Converted {} images.", summary.converted)]
    }
}

pub fn format_gallery_output(output: &GalleryOutput) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(page) = &output.page {
        lines.push(format!("Wrote gallery {}", page.display()));
    }
    if let Some(archive) = &output.compressed {
        lines.push(format!("Compressed gallery {}", archive.display()));
    }
    lines
}

/// `Warning: <option> adjusted to <n>.`
pub fn format_warning(warning: &Warning) -> String {
    format!("Warning: {warning}")
}

/// `Error: <message>`
pub fn format_error(error: &dyn std::fmt::Display) -> String {
    format!("Error: {error}")
}

pub fn print_warnings(warnings: &[Warning]) {
    for warning in warnings {
        eprintln!("{}", format_warning(warning));
    }
}

pub fn print_error(error: &dyn std::fmt::Display) {
    eprintln!("{}", format_error(error));
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

/// Program name as invoked, for usage hints.
pub fn program_name(argv0: Option<&str>) -> String {
    argv0
        .and_then(|arg| Path::new(arg).file_name())
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| crate::TOOL_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn event(thumbnail: Option<&str>, failures: usize) -> ConvertEvent {
        ConvertEvent {
            index: 1,
            original: "a.jpg".to_string(),
            full_size: "00001.jpg".to_string(),
            thumbnail: thumbnail.map(String::from),
            failures,
        }
    }

    #[test]
    fn banner_names_tool_and_version() {
        let lines = format_banner();
        assert!(lines[0].starts_with(&format!("thumbgal {}", crate::VERSION)));
        assert_eq!(lines[1], "");
    }

    #[test]
    fn usage_hint() {
        assert_eq!(
            format_usage_hint("thumbgal"),
            vec!["Type 'thumbgal --help' for usage."]
        );
    }

    #[test]
    fn discovery_counts() {
        assert_eq!(
            format_discovery(1),
            vec!["Searching for image files... done. Found 1 image."]
        );
        assert_eq!(
            format_discovery(0),
            vec!["Searching for image files... done. Found 0 images."]
        );
    }

    #[test]
    fn convert_line_with_thumbnail() {
        assert_eq!(
            format_convert_event(&event(Some("tn_00001.jpg"), 0)),
            vec!["    001 a.jpg -> 00001.jpg -> tn_00001.jpg"]
        );
    }

    #[test]
    fn convert_line_without_thumbnail() {
        assert_eq!(
            format_convert_event(&event(None, 0)),
            vec!["    001 a.jpg -> 00001.jpg"]
        );
    }

    #[test]
    fn convert_line_marks_failures() {
        assert_eq!(
            format_convert_event(&event(None, 1)),
            vec!["    001 a.jpg -> 00001.jpg (failed)"]
        );
    }

    #[test]
    fn convert_line_leads_with_position() {
        let mut later = event(None, 0);
        later.index = 42;
        later.original = "b.png".to_string();
        later.full_size = "00042.png".to_string();
        assert_eq!(format_convert_event(&later), vec!["    042 b.png -> 00042.png"]);
    }

    #[test]
    fn convert_summary_mentions_failures() {
        assert_eq!(
            format_convert_summary(&ConvertSummary {
                converted: 2,
                failed: 0
            }),
            vec!["Converted 2 images."]
        );
        assert_eq!(
            format_convert_summary(&ConvertSummary {
                converted: 1,
                failed: 1
            }),
            vec!["Converted 1 images, 1 failed."]
        );
    }

    #[test]
    fn gallery_output_lines() {
        let output = GalleryOutput {
            page: Some(PathBuf::from("web/index.html")),
            compressed: Some(PathBuf::from("web/index.html.gz")),
        };
        assert_eq!(
            format_gallery_output(&output),
            vec![
                "Wrote gallery web/index.html",
                "Compressed gallery web/index.html.gz"
            ]
        );
    }

    #[test]
    fn warning_and_error_prefixes() {
        let warning = Warning {
            option: "im-qual",
            adjusted_to: 100,
        };
        assert_eq!(format_warning(&warning), "Warning: im-qual adjusted to 100.");
        assert_eq!(format_error(&"No in-dir supplied."), "Error: No in-dir supplied.");
    }

    #[test]
    fn program_name_strips_directories() {
        assert_eq!(program_name(Some("/usr/local/bin/thumbgal")), "thumbgal");
        assert_eq!(program_name(None), "thumbgal");
    }
}
