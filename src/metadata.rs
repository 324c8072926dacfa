//! Capture-time extraction from EXIF.
//!
//! With `--use-exif`, every discovered image is run through `exif -i` and the
//! `DateTimeOriginal` tag (`0x9003`) is shown under its gallery cell.
//!
//! ## Parsing
//!
//! `exif -i` prints one tag per line, columns separated by `|`:
//!
//! ```text
//! 0x9003|Date and Time (Origi|2005:07:02 10:38:28
//! ```
//!
//! The value is everything after the *last* `|` of the first `0x9003|` line.
//! Runs of spaces in it collapse to one, and one trailing character is
//! dropped (the column padding `exif` leaves behind).
//!
//! ## Failure handling
//!
//! A missing tag, an empty value, or a failing extractor all leave the
//! record without a timestamp. None of them abort the run.

use crate::tools::ImageTools;
use std::path::Path;
use tracing::debug;

/// EXIF tag id of `DateTimeOriginal`, as printed by `exif -i`.
pub const CAPTURE_TIME_TAG: &str = "0x9003";

/// Extract the capture time from an `exif -i` table.
pub fn parse_capture_time(exif_output: &str) -> Option<String> {
    let line_prefix = format!("{CAPTURE_TIME_TAG}|");
    let line = exif_output
        .lines()
        .find(|line| line.starts_with(&line_prefix))?;
    let (head, value) = line.rsplit_once('|')?;
    if head.is_empty() || value.is_empty() {
        return None;
    }

    let mut value = squeeze_spaces(value);
    value.pop();
    Some(value).filter(|v| !v.is_empty())
}

/// Run the extractor against `path` and parse its capture time.
pub fn fetch_capture_time(tools: &impl ImageTools, path: &Path) -> Option<String> {
    match tools.read_exif(path) {
        Ok(output) => parse_capture_time(&output),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no EXIF data");
            None
        }
    }
}

fn squeeze_spaces(text: &str) -> String {
    let mut squeezed = String::with_capacity(text.len());
    let mut prev_space = false;
    for c in text.chars() {
        if c == ' ' {
            if !prev_space {
                squeezed.push(' ');
            }
            prev_space = true;
        } else {
            squeezed.push(c);
            prev_space = false;
        }
    }
    squeezed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::backend::tests::MockTools;

    // Value columns are space-padded by `exif`
    const EXIF_TABLE: &str = concat!(
        "EXIF tags in 'a.jpg' ('Motorola' byte order):\n",
        "--------------------+----------------------------------------------------------\n",
        "Tag                 |Value\n",
        "--------------------+----------------------------------------------------------\n",
        "0x010f|Manufacturer        |Canon                    \n",
        "0x0132|Date and Time       |2005:07:02 11:00:00      \n",
        "0x9003|Date and Time (Origi|2005:07:02  10:38:28     \n",
        "0x9004|Date and Time (Digit|2005:07:02 10:38:28      \n",
    );

    #[test]
    fn parse_finds_capture_tag() {
        assert_eq!(
            parse_capture_time(EXIF_TABLE),
            Some("2005:07:02 10:38:28".to_string())
        );
    }

    #[test]
    fn parse_drops_one_trailing_character() {
        // Without column padding the last real character goes
        let table = "0x9003|Date and Time (Origi|2005:07:02 10:38:28";
        assert_eq!(
            parse_capture_time(table),
            Some("2005:07:02 10:38:2".to_string())
        );
    }

    #[test]
    fn parse_missing_tag_is_none() {
        let table = "0x010f|Manufacturer        |Canon \n";
        assert_eq!(parse_capture_time(table), None);
    }

    #[test]
    fn parse_ignores_tag_not_at_line_start() {
        let table = "note 0x9003|Date|2005:07:02 10:38:28 \n";
        assert_eq!(parse_capture_time(table), None);
    }

    #[test]
    fn parse_empty_value_is_none() {
        assert_eq!(parse_capture_time("0x9003|Date and Time (Origi|"), None);
        assert_eq!(parse_capture_time("0x9003|Date and Time (Origi| "), None);
    }

    #[test]
    fn parse_empty_output_is_none() {
        assert_eq!(parse_capture_time(""), None);
    }

    #[test]
    fn squeeze_collapses_space_runs_only() {
        assert_eq!(squeeze_spaces("a   b  c"), "a b c");
        assert_eq!(squeeze_spaces("a\t\tb"), "a\t\tb");
    }

    #[test]
    fn fetch_uses_tool_output() {
        let tools = MockTools::new();
        tools.set_exif(Path::new("/in/a.jpg"), EXIF_TABLE);

        assert_eq!(
            fetch_capture_time(&tools, Path::new("/in/a.jpg")),
            Some("2005:07:02 10:38:28".to_string())
        );
    }

    #[test]
    fn fetch_failure_is_none() {
        let tools = MockTools::new();
        assert_eq!(fetch_capture_time(&tools, Path::new("/in/a.jpg")), None);
    }
}
