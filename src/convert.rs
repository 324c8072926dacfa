//! Image conversion.
//!
//! Each record is handed to the converter once for its full-size rendition
//! and, unless the thumbnail size is `"0"`, once more for its thumbnail:
//!
//! ```text
//! in/a.jpg ──convert──▶ out/00001.jpg ──convert──▶ out/tn_00001.jpg
//! ```
//!
//! The thumbnail is made from the fresh full-size file, which is smaller and
//! already carries the embedded comment. Conversion runs sequentially in
//! sorted order, so output names and progress lines follow the gallery
//! order.
//!
//! ## Failure policy
//!
//! A failing converter is logged and the run continues; the record keeps
//! its output path, so the gallery may link a missing file. With
//! `--strict` the first failure aborts the run instead.

use crate::config::{Rendition, Settings};
use crate::naming::{OutputName, output_names, output_path, path_in_dir};
use crate::record::ImageRecord;
use crate::tools::{ConvertParams, ImageTools, ToolError};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Converting {path} failed: {error}")]
    Tool {
        path: PathBuf,
        #[source]
        error: ToolError,
    },
}

/// Progress event emitted after each record is converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertEvent {
    /// 1-based position in gallery order.
    pub index: usize,
    pub original: String,
    /// Output paths relative to the output directory.
    pub full_size: String,
    pub thumbnail: Option<String>,
    /// Number of renditions of this record the converter failed on.
    pub failures: usize,
}

/// Totals for one conversion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    pub converted: usize,
    pub failed: usize,
}

/// Convert every record and store the derived paths on it.
///
/// `records` must already be in gallery order. Does nothing when
/// conversion is switched off.
pub fn convert_all(
    tools: &impl ImageTools,
    settings: &Settings,
    records: &mut [ImageRecord],
    progress: Option<Sender<ConvertEvent>>,
) -> Result<ConvertSummary, ConvertError> {
    let mut summary = ConvertSummary::default();
    if settings.no_convert {
        return Ok(summary);
    }

    let names = output_names(records.iter().map(|r| r.source.as_path()), settings.use_names);
    let comment = settings.embedded_comment();
    let full_args = settings.full_size_args();
    let thumbnail_args = settings.thumbnail_args();

    for (index, (record, name)) in records.iter_mut().zip(&names).enumerate() {
        let mut failures = 0;

        let full_size = rendition_path(settings, &settings.full, name);
        let params = ConvertParams {
            source: record.source.clone(),
            output: full_size.clone(),
            size: settings.full.size.clone(),
            quality: settings.full.quality,
            extra_args: full_args.clone(),
            interlace: settings.conversion.interlace,
            comment: comment.clone(),
        };
        failures += run_converter(tools, settings.strict, &params)?;
        record.full_size = Some(full_size);

        if !settings.thumbnail.is_disabled() {
            let thumbnail = rendition_path(settings, &settings.thumbnail, name);
            let params = ConvertParams {
                source: record.thumbnail_source().to_path_buf(),
                output: thumbnail.clone(),
                size: settings.thumbnail.size.clone(),
                quality: settings.thumbnail.quality,
                extra_args: thumbnail_args.clone(),
                interlace: settings.conversion.interlace,
                comment: comment.clone(),
            };
            failures += run_converter(tools, settings.strict, &params)?;
            record.thumbnail = Some(thumbnail);
        }

        if failures == 0 {
            summary.converted += 1;
        } else {
            summary.failed += 1;
        }

        if let Some(tx) = &progress {
            let _ = tx.send(ConvertEvent {
                index: index + 1,
                original: record.file_name(),
                full_size: display_path(record.full_size.as_deref(), &settings.output_dir),
                thumbnail: record
                    .thumbnail
                    .as_deref()
                    .map(|t| path_in_dir(t, &settings.output_dir)),
                failures,
            });
        }
    }

    Ok(summary)
}

fn rendition_path(settings: &Settings, rendition: &Rendition, name: &OutputName) -> PathBuf {
    output_path(
        &settings.output_dir,
        &rendition.prefix,
        &name.name,
        &rendition.suffix,
        name.extension.as_deref(),
    )
}

/// Run one conversion. Returns the number of failures (0 or 1) when
/// lenient; under `strict` a failure is an error.
fn run_converter(
    tools: &impl ImageTools,
    strict: bool,
    params: &ConvertParams,
) -> Result<usize, ConvertError> {
    match tools.convert(params) {
        Ok(()) => Ok(0),
        Err(error) if strict => Err(ConvertError::Tool {
            path: params.source.clone(),
            error,
        }),
        Err(error) => {
            warn!(
                source = %params.source.display(),
                output = %params.output.display(),
                %error,
                "conversion failed, continuing"
            );
            Ok(1)
        }
    }
}

fn display_path(path: Option<&Path>, output_dir: &Path) -> String {
    path.map(|p| path_in_dir(p, output_dir)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;
    use crate::tools::backend::tests::{MockTools, RecordedOp};
    use std::fs;
    use std::sync::mpsc;
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        input: PathBuf,
        output: PathBuf,
        options: Options,
    }

    fn fixture() -> Fixture {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in");
        let output = tmp.path().join("out");
        fs::create_dir_all(&input).unwrap();
        fs::create_dir_all(&output).unwrap();
        let options = Options {
            input_dir: Some(input.clone()),
            output_dir: Some(output.clone()),
            ..Options::default()
        };
        Fixture {
            _tmp: tmp,
            input,
            output,
            options,
        }
    }

    fn settings(options: &Options) -> Settings {
        options.clone().validate(&mut Vec::new()).unwrap()
    }

    fn records(input: &Path, names: &[&str]) -> Vec<ImageRecord> {
        names
            .iter()
            .map(|n| ImageRecord::new(input.join(n), "image/jpeg".to_string()))
            .collect()
    }

    fn convert_op(op: &RecordedOp) -> (String, String, String, u32) {
        match op {
            RecordedOp::Convert {
                source,
                output,
                size,
                quality,
                ..
            } => (source.clone(), output.clone(), size.clone(), *quality),
            other => panic!("expected Convert, got {other:?}"),
        }
    }

    #[test]
    fn full_size_only_by_default() {
        let fx = fixture();
        let tools = MockTools::new();
        let mut recs = records(&fx.input, &["a.jpg", "b.png"]);

        let summary = convert_all(&tools, &settings(&fx.options), &mut recs, None).unwrap();

        assert_eq!(summary, ConvertSummary { converted: 2, failed: 0 });
        assert_eq!(recs[0].full_size, Some(fx.output.join("00001.jpg")));
        assert_eq!(recs[1].full_size, Some(fx.output.join("00002.png")));
        assert!(recs.iter().all(|r| r.thumbnail.is_none()));

        let ops = tools.conversions();
        assert_eq!(ops.len(), 2);
        let (source, output, size, quality) = convert_op(&ops[0]);
        assert_eq!(source, fx.input.join("a.jpg").to_string_lossy());
        assert_eq!(output, fx.output.join("00001.jpg").to_string_lossy());
        assert_eq!(size, "640x640");
        assert_eq!(quality, 80);
    }

    #[test]
    fn thumbnail_made_from_full_size() {
        let mut fx = fixture();
        fx.options.thumbnail.size = "120x120".to_string();
        let tools = MockTools::new();
        let mut recs = records(&fx.input, &["a.jpg"]);

        convert_all(&tools, &settings(&fx.options), &mut recs, None).unwrap();

        assert_eq!(recs[0].thumbnail, Some(fx.output.join("tn_00001.jpg")));
        let ops = tools.conversions();
        assert_eq!(ops.len(), 2);
        let (source, output, size, quality) = convert_op(&ops[1]);
        assert_eq!(source, fx.output.join("00001.jpg").to_string_lossy());
        assert_eq!(output, fx.output.join("tn_00001.jpg").to_string_lossy());
        assert_eq!(size, "120x120");
        assert_eq!(quality, 40);
    }

    #[test]
    fn original_names_with_prefix_and_suffix() {
        let mut fx = fixture();
        fx.options.use_names = true;
        fx.options.full.suffix = "_big".to_string();
        fx.options.thumbnail.size = "100x100".to_string();
        fx.options.thumbnail.prefix = "thumbs/".to_string();
        let tools = MockTools::new();
        let mut recs = records(&fx.input, &["dawn.jpg", "scan"]);

        convert_all(&tools, &settings(&fx.options), &mut recs, None).unwrap();

        assert_eq!(recs[0].full_size, Some(fx.output.join("dawn_big.jpg")));
        assert_eq!(recs[0].thumbnail, Some(fx.output.join("thumbs/dawn.jpg")));
        assert_eq!(recs[1].full_size, Some(fx.output.join("scan_big")));
    }

    #[test]
    fn conversion_settings_reach_the_converter() {
        let mut fx = fixture();
        fx.options.conversion.interlace = true;
        fx.options.conversion.comments = vec!["holiday".to_string()];
        fx.options.conversion.args = vec!["-strip".to_string()];
        fx.options.conversion.full_args = vec!["-unsharp 0x1".to_string()];
        let tools = MockTools::new();
        let mut recs = records(&fx.input, &["a.jpg"]);

        convert_all(&tools, &settings(&fx.options), &mut recs, None).unwrap();

        match &tools.conversions()[0] {
            RecordedOp::Convert {
                extra_args,
                interlace,
                comment,
                ..
            } => {
                assert_eq!(extra_args, &vec!["-strip", "-unsharp", "0x1"]);
                assert!(*interlace);
                assert_eq!(comment, "created with thumbgal # holiday");
            }
            other => panic!("expected Convert, got {other:?}"),
        }
    }

    #[test]
    fn no_convert_leaves_records_untouched() {
        let mut fx = fixture();
        fx.options.no_convert = true;
        let tools = MockTools::new();
        let mut recs = records(&fx.input, &["a.jpg"]);

        let summary = convert_all(&tools, &settings(&fx.options), &mut recs, None).unwrap();

        assert_eq!(summary, ConvertSummary::default());
        assert!(recs[0].full_size.is_none());
        assert!(tools.get_operations().is_empty());
    }

    #[test]
    fn failure_is_lenient_by_default() {
        let fx = fixture();
        let tools = MockTools::new();
        tools.fail_output(&fx.output.join("00001.jpg"));
        let mut recs = records(&fx.input, &["a.jpg", "b.jpg"]);

        let summary = convert_all(&tools, &settings(&fx.options), &mut recs, None).unwrap();

        assert_eq!(summary, ConvertSummary { converted: 1, failed: 1 });
        // Path is kept even though the file was never written
        assert_eq!(recs[0].full_size, Some(fx.output.join("00001.jpg")));
        assert_eq!(tools.conversions().len(), 2);
    }

    #[test]
    fn failure_aborts_when_strict() {
        let mut fx = fixture();
        fx.options.strict = true;
        let tools = MockTools::new();
        tools.fail_output(&fx.output.join("00001.jpg"));
        let mut recs = records(&fx.input, &["a.jpg", "b.jpg"]);

        let err = convert_all(&tools, &settings(&fx.options), &mut recs, None).unwrap_err();

        assert!(matches!(err, ConvertError::Tool { .. }));
        assert_eq!(tools.conversions().len(), 1);
    }

    #[test]
    fn progress_events_in_order() {
        let mut fx = fixture();
        fx.options.thumbnail.size = "80x80".to_string();
        let tools = MockTools::new();
        let mut recs = records(&fx.input, &["a.jpg", "b.png"]);
        let (tx, rx) = mpsc::channel();

        convert_all(&tools, &settings(&fx.options), &mut recs, Some(tx)).unwrap();

        let events: Vec<ConvertEvent> = rx.iter().collect();
        assert_eq!(
            events,
            vec![
                ConvertEvent {
                    index: 1,
                    original: "a.jpg".to_string(),
                    full_size: "00001.jpg".to_string(),
                    thumbnail: Some("tn_00001.jpg".to_string()),
                    failures: 0,
                },
                ConvertEvent {
                    index: 2,
                    original: "b.png".to_string(),
                    full_size: "00002.png".to_string(),
                    thumbnail: Some("tn_00002.png".to_string()),
                    failures: 0,
                },
            ]
        );
    }
}
