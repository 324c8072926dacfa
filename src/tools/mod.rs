//! External tool integration.
//!
//! The pipeline never decodes or encodes pixels itself. Every heavy step is
//! delegated to a command-line program:
//!
//! | Concern | Program |
//! |---|---|
//! | **Media type** | `file -bi` |
//! | **Capture time** | `exif -i` |
//! | **Resize / re-encode** | ImageMagick `convert` |
//! | **Gallery compression** | `gzip` |
//!
//! The module is split into:
//! - **Parameters**: plain data describing a conversion
//! - **Backend**: [`ImageTools`] trait, [`ToolError`], and the test mock
//! - **External**: [`ExternalTools`], the process-spawning implementation

pub mod backend;
pub mod external;
mod params;

pub use backend::{ImageTools, ToolError};
pub use external::ExternalTools;
pub use params::{ConvertParams, Quality, SIZE_DISABLED};
