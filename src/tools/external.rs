//! Production [`ImageTools`] backed by command-line programs.
//!
//! | Operation | Default program | Invocation |
//! |---|---|---|
//! | Media type | `file` | `file -bi PATH` |
//! | EXIF table | `exif` | `exif -i PATH` |
//! | Convert | `convert` (ImageMagick) | `convert -thumbnail SIZE -quality Q … -comment C SRC DST` |
//! | Compress | `gzip` | `gzip -9 -f PATH` |
//! | Decompress | `gzip` | `gzip -dc PATH.gz` (stdout written to the destination) |
//!
//! Every process is started with an argument vector, never through a shell,
//! so file names and user-supplied option strings cannot inject commands.
//! Program names come from [`ToolPrograms`] (the `[tools]` config table).

use super::backend::{ImageTools, ToolError};
use super::params::{ConvertParams, INTERLACE_SCHEME};
use crate::config::ToolPrograms;
use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Output};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct ExternalTools {
    programs: ToolPrograms,
}

impl ExternalTools {
    pub fn new(programs: ToolPrograms) -> Self {
        Self { programs }
    }

    fn run(&self, program: &str, args: &[OsString]) -> Result<Output, ToolError> {
        debug!(program, ?args, "running external tool");
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|error| ToolError::Spawn {
                program: program.to_string(),
                error,
            })?;
        if !output.status.success() {
            return Err(ToolError::Failed {
                program: program.to_string(),
                status: output.status.to_string(),
            });
        }
        Ok(output)
    }
}

/// Build the converter argument vector for one rendition.
///
/// Order matters to ImageMagick: settings first, then the input and
/// output paths last.
pub fn convert_args(params: &ConvertParams) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-thumbnail".into(),
        params.size.clone().into(),
        "-quality".into(),
        params.quality.to_string().into(),
    ];
    args.extend(params.extra_args.iter().map(OsString::from));
    if params.interlace {
        args.push("-interlace".into());
        args.push(INTERLACE_SCHEME.into());
    }
    args.push("-comment".into());
    args.push(params.comment.clone().into());
    args.push(params.source.clone().into_os_string());
    args.push(params.output.clone().into_os_string());
    args
}

impl ImageTools for ExternalTools {
    fn media_type(&self, path: &Path) -> Result<String, ToolError> {
        let output = self.run(&self.programs.file, &["-bi".into(), path.into()])?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn read_exif(&self, path: &Path) -> Result<String, ToolError> {
        let output = self.run(&self.programs.exif, &["-i".into(), path.into()])?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn convert(&self, params: &ConvertParams) -> Result<(), ToolError> {
        self.run(&self.programs.convert, &convert_args(params))?;
        Ok(())
    }

    fn compress(&self, path: &Path) -> Result<(), ToolError> {
        self.run(
            &self.programs.gzip,
            &["-9".into(), "-f".into(), path.into()],
        )?;
        Ok(())
    }

    fn decompress(&self, archive: &Path, dest: &Path) -> Result<(), ToolError> {
        let output = self.run(&self.programs.gzip, &["-dc".into(), archive.into()])?;
        std::fs::write(dest, output.stdout)?;
        Ok(())
    }
}
