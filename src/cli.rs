//! Command-line flags.
//!
//! Every option is an `Option` (or an off-by-default switch) so that a flag
//! left out does not clobber a value from the config file. [`Cli::apply`]
//! lays the given flags over an [`Options`] value.

use crate::config::Options;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "thumbgal")]
#[command(about = "Build a static HTML thumbnail gallery from a directory of images")]
#[command(long_about = "\
Build a static HTML thumbnail gallery from a directory of images

Every image in --in-dir is resized into --out-dir with ImageMagick and linked
from a single HTML table:

  photos/                    web/
  ├── a.jpg          →       ├── 00001.jpg
  ├── b.png          →       ├── 00002.png
  └── readme.txt             └── index.html

Required programs: file, convert (ImageMagick); exif with --use-exif;
gzip with --gal-gzip.

Exit codes:
  0        success
  1        usage error, --help, unreadable config file
  10/11/12 in-dir missing / not a directory / not readable
  15/16/17 out-dir missing / not a directory / not writable
  20       full-size and thumbnail names would collide
  30       external tool failed (--strict)
  40       I/O error while reading input or writing the gallery

Run 'thumbgal --gen-config' to print a documented config file.")]
#[command(version)]
pub struct Cli {
    /// Directory holding the original images
    #[arg(long, value_name = "DIR")]
    pub in_dir: Option<PathBuf>,

    /// Directory receiving converted images and the gallery
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Load defaults from a TOML config file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print a documented stock config file and exit
    #[arg(long)]
    pub gen_config: bool,

    /// Suppress progress output
    #[arg(long)]
    pub quiet: bool,

    /// Full-size bounding box [default: 640x640]
    #[arg(long, value_name = "WxH")]
    pub im_size: Option<String>,

    /// Full-size quality, 1-100 [default: 80]
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub im_qual: Option<i64>,

    /// Full-size file name prefix
    #[arg(long, value_name = "STR")]
    pub im_prefix: Option<String>,

    /// Full-size file name suffix
    #[arg(long, value_name = "STR")]
    pub im_suffix: Option<String>,

    /// Thumbnail bounding box, 0 disables thumbnails [default: 0]
    #[arg(long, value_name = "WxH")]
    pub tn_size: Option<String>,

    /// Thumbnail quality, 1-100 [default: 40]
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub tn_qual: Option<i64>,

    /// Thumbnail file name prefix [default: tn_]
    #[arg(long, value_name = "STR")]
    pub tn_prefix: Option<String>,

    /// Thumbnail file name suffix
    #[arg(long, value_name = "STR")]
    pub tn_suffix: Option<String>,

    /// Gallery file name [default: index.html]
    #[arg(long, value_name = "STR")]
    pub gal_file: Option<String>,

    /// Gallery title [default: HTML Thumbnail Gallery]
    #[arg(long, value_name = "STR")]
    pub gal_title: Option<String>,

    /// Paragraph shown under the title
    #[arg(long, value_name = "STR")]
    pub gal_desc: Option<String>,

    /// Pictures per table row [default: 5]
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub gal_pprow: Option<i64>,

    /// 0 plain, 1 gzip, 2 gzip and keep a plain copy [default: 0]
    #[arg(long, value_name = "0|1|2", allow_negative_numbers = true)]
    pub gal_gzip: Option<i64>,

    /// Background color [default: #cccccc]
    #[arg(long, value_name = "COLOR")]
    pub col_bg: Option<String>,

    /// Text color [default: #000000]
    #[arg(long, value_name = "COLOR")]
    pub col_text: Option<String>,

    /// Link color [default: #0000ff]
    #[arg(long, value_name = "COLOR")]
    pub col_link: Option<String>,

    /// Active link color [default: #ff0000]
    #[arg(long, value_name = "COLOR")]
    pub col_alink: Option<String>,

    /// Visited link color [default: #990099]
    #[arg(long, value_name = "COLOR")]
    pub col_vlink: Option<String>,

    /// Append to the comment embedded in converted images (repeatable)
    #[arg(long, value_name = "STR")]
    pub comment: Vec<String>,

    /// Write interlaced (progressive) images
    #[arg(long, visible_aliases = ["interlaced", "progressive"])]
    pub interlace: bool,

    /// Show the EXIF capture time under each picture
    #[arg(long)]
    pub use_exif: bool,

    /// Keep original basenames instead of numbering
    #[arg(long)]
    pub use_names: bool,

    /// Link the originals without converting anything
    #[arg(long)]
    pub no_convert: bool,

    /// Extra converter options for all images (repeatable)
    #[arg(long, value_name = "STR", allow_hyphen_values = true)]
    pub conv_opts: Vec<String>,

    /// Extra converter options for full-size images (repeatable)
    #[arg(long, value_name = "STR", allow_hyphen_values = true)]
    pub conv_opts_fs: Vec<String>,

    /// Extra converter options for thumbnails (repeatable)
    #[arg(long, value_name = "STR", allow_hyphen_values = true)]
    pub conv_opts_tn: Vec<String>,

    /// Abort with exit code 30 when an external tool fails
    #[arg(long)]
    pub strict: bool,
}

impl Cli {
    /// Override `options` with every flag that was given.
    ///
    /// Switches can only turn a setting on. Repeatable flags append to the
    /// lists from the config file.
    pub fn apply(self, options: &mut Options) {
        fn set<T>(target: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *target = v;
            }
        }

        if self.in_dir.is_some() {
            options.input_dir = self.in_dir;
        }
        if self.out_dir.is_some() {
            options.output_dir = self.out_dir;
        }
        options.quiet |= self.quiet;
        options.use_exif |= self.use_exif;
        options.use_names |= self.use_names;
        options.no_convert |= self.no_convert;
        options.strict |= self.strict;

        set(&mut options.full.size, self.im_size);
        set(&mut options.full.quality, self.im_qual);
        set(&mut options.full.prefix, self.im_prefix);
        set(&mut options.full.suffix, self.im_suffix);
        set(&mut options.thumbnail.size, self.tn_size);
        set(&mut options.thumbnail.quality, self.tn_qual);
        set(&mut options.thumbnail.prefix, self.tn_prefix);
        set(&mut options.thumbnail.suffix, self.tn_suffix);

        set(&mut options.gallery.file, self.gal_file);
        set(&mut options.gallery.title, self.gal_title);
        set(&mut options.gallery.description, self.gal_desc);
        set(&mut options.gallery.per_row, self.gal_pprow);
        set(&mut options.gallery.compression, self.gal_gzip);

        set(&mut options.colors.background, self.col_bg);
        set(&mut options.colors.text, self.col_text);
        set(&mut options.colors.link, self.col_link);
        set(&mut options.colors.active_link, self.col_alink);
        set(&mut options.colors.visited_link, self.col_vlink);

        options.conversion.interlace |= self.interlace;
        options.conversion.comments.extend(self.comment);
        options.conversion.args.extend(self.conv_opts);
        options.conversion.full_args.extend(self.conv_opts_fs);
        options.conversion.thumbnail_args.extend(self.conv_opts_tn);
    }
}
