//! Run orchestration.
//!
//! ```text
//! discover ─▶ convert (sequential, sorted) ─▶ render + write ─▶ gzip
//! ```
//!
//! Each stage finishes before the next begins. The record list is owned
//! here and lent to each stage in turn.

use crate::config::Settings;
use crate::convert::{ConvertError, ConvertSummary, convert_all};
use crate::discover::{DiscoverError, discover};
use crate::generate::{GalleryOutput, GenerateError, write_gallery};
use crate::output;
use crate::tools::ImageTools;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Discovery failed: {0}")]
    Discover(#[from] DiscoverError),
    #[error("Conversion failed: {0}")]
    Convert(#[from] ConvertError),
    #[error("Gallery generation failed: {0}")]
    Generate(#[from] GenerateError),
}

impl PipelineError {
    /// Process exit code: 30 for tool failures, 40 for I/O failures.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Convert(_) | PipelineError::Generate(GenerateError::Tool { .. }) => 30,
            PipelineError::Discover(_) | PipelineError::Generate(GenerateError::Io(_)) => 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub images: usize,
    pub conversion: ConvertSummary,
    pub gallery: GalleryOutput,
}

/// Run every stage against `settings`, printing progress unless quiet.
pub fn run(tools: &impl ImageTools, settings: &Settings) -> Result<RunSummary, PipelineError> {
    let say = |lines: Vec<String>| {
        if !settings.quiet {
            output::print_lines(&lines);
        }
    };

    let mut records = discover(tools, settings)?;
    say(output::format_discovery(records.len()));

    say(output::format_conversion_start(settings.no_convert));
    let conversion = if settings.quiet || settings.no_convert {
        convert_all(tools, settings, &mut records, None)?
    } else {
        let (tx, rx) = std::sync::mpsc::channel();
        let printer = std::thread::spawn(move || {
            for event in rx {
                output::print_lines(&output::format_convert_event(&event));
            }
        });
        let result = convert_all(tools, settings, &mut records, Some(tx));
        if printer.join().is_err() {
            warn!("progress printer panicked");
        }
        result?
    };
    if !settings.no_convert {
        say(output::format_convert_summary(&conversion));
    }

    let gallery = write_gallery(tools, settings, &records)?;
    say(output::format_gallery_output(&gallery));

    Ok(RunSummary {
        images: records.len(),
        conversion,
        gallery,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;
    use crate::tools::ToolError;
    use crate::tools::backend::tests::{MockTools, RecordedOp};
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        input: PathBuf,
        output: PathBuf,
        options: Options,
    }

    /// Input holding `a.jpg`, `b.png` and `readme.txt`.
    fn fixture() -> Fixture {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in");
        let output = tmp.path().join("out");
        fs::create_dir_all(&input).unwrap();
        fs::create_dir_all(&output).unwrap();
        for name in ["a.jpg", "b.png", "readme.txt"] {
            fs::write(input.join(name), b"data").unwrap();
        }
        let options = Options {
            input_dir: Some(input.clone()),
            output_dir: Some(output.clone()),
            quiet: true,
            ..Options::default()
        };
        Fixture {
            _tmp: tmp,
            input,
            output,
            options,
        }
    }

    fn tools(input: &Path) -> MockTools {
        MockTools::with_media_types(&[
            (input.join("a.jpg").as_path(), "image/jpeg; charset=binary"),
            (input.join("b.png").as_path(), "image/png; charset=binary"),
            (input.join("readme.txt").as_path(), "text/plain; charset=us-ascii"),
        ])
    }

    fn settings(options: &Options) -> Settings {
        options.clone().validate(&mut Vec::new()).unwrap()
    }

    #[test]
    fn default_run_over_mixed_directory() {
        let fx = fixture();
        let tools = tools(&fx.input);

        let summary = run(&tools, &settings(&fx.options)).unwrap();

        assert_eq!(summary.images, 2);
        assert_eq!(summary.conversion.converted, 2);
        let outputs: Vec<String> = tools
            .conversions()
            .into_iter()
            .map(|op| match op {
                RecordedOp::Convert { output, .. } => output,
                other => panic!("expected Convert, got {other:?}"),
            })
            .collect();
        assert_eq!(
            outputs,
            vec![
                fx.output.join("00001.jpg").to_string_lossy().to_string(),
                fx.output.join("00002.png").to_string_lossy().to_string(),
            ]
        );

        let html = fs::read_to_string(fx.output.join("index.html")).unwrap();
        assert_eq!(html.matches("<tr>").count(), 1);
        assert_eq!(html.matches("<td>&nbsp;</td>").count(), 3);
        assert!(html.contains(r#"<a href="00001.jpg"><img src="00001.jpg""#));
        assert!(html.contains(r#"<a href="00002.png"><img src="00002.png""#));
        assert!(!html.contains("readme"));
    }

    #[test]
    fn no_convert_links_originals() {
        let mut fx = fixture();
        fx.options.no_convert = true;
        let tools = tools(&fx.input);

        let summary = run(&tools, &settings(&fx.options)).unwrap();

        assert_eq!(summary.conversion, ConvertSummary::default());
        assert!(tools.conversions().is_empty());
        let html = fs::read_to_string(fx.output.join("index.html")).unwrap();
        assert!(html.contains(r#"<a href="../in/a.jpg"><img src="../in/a.jpg""#));
    }

    #[test]
    fn thumbnails_and_exif_flow_into_page() {
        let mut fx = fixture();
        fx.options.use_exif = true;
        fx.options.thumbnail.size = "100x100".to_string();
        let tools = tools(&fx.input);
        tools.set_exif(
            &fx.input.join("a.jpg"),
            "0x9003|Date and Time (Origi|2005:07:02 10:38:28 \n",
        );

        run(&tools, &settings(&fx.options)).unwrap();

        let html = fs::read_to_string(fx.output.join("index.html")).unwrap();
        assert!(html.contains(
            r#"<a href="00001.jpg"><img src="tn_00001.jpg" alt="preview for 00001.jpg"></a><br>2005:07:02 10:38:28</td>"#
        ));
        assert_eq!(tools.conversions().len(), 4);
    }

    #[test]
    fn lenient_failure_still_writes_gallery() {
        let fx = fixture();
        let tools = tools(&fx.input);
        tools.fail_output(&fx.output.join("00001.jpg"));

        let summary = run(&tools, &settings(&fx.options)).unwrap();

        assert_eq!(summary.conversion.failed, 1);
        assert!(fx.output.join("index.html").exists());
    }

    #[test]
    fn strict_failure_is_exit_code_30() {
        let mut fx = fixture();
        fx.options.strict = true;
        let tools = tools(&fx.input);
        tools.fail_output(&fx.output.join("00001.jpg"));

        let err = run(&tools, &settings(&fx.options)).unwrap_err();

        assert_eq!(err.exit_code(), 30);
        assert!(!fx.output.join("index.html").exists());
    }

    #[test]
    fn exit_codes_by_failure_kind() {
        let io = PipelineError::Generate(GenerateError::Io(std::io::Error::other("disk full")));
        assert_eq!(io.exit_code(), 40);
        let tool = PipelineError::Generate(GenerateError::Tool {
            path: PathBuf::from("out/index.html"),
            error: ToolError::Failed {
                program: "gzip".to_string(),
                status: "exit status: 1".to_string(),
            },
        });
        assert_eq!(tool.exit_code(), 30);
    }

    #[test]
    fn progress_printed_when_not_quiet() {
        let mut fx = fixture();
        fx.options.quiet = false;
        let tools = tools(&fx.input);

        let summary = run(&tools, &settings(&fx.options)).unwrap();

        assert_eq!(summary.conversion.converted, 2);
    }
}
