//! Pipeline primitives backed by external command-line tools.
//!
//! - [`CommandStamper`]: runs the stamp tool once per item and forwards the
//!   JSON progress lines it prints as sub progress.
//! - [`CommandResizer`]: runs the resize tool into a fresh temp file.

mod resizer;
mod stamper;
mod types;

pub use resizer::CommandResizer;
pub use stamper::CommandStamper;
pub use types::ToolMessage;
