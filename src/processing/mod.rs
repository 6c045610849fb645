mod cancel;
pub mod command;
mod orchestrator;
mod primitives;
mod relay;
mod temp_files;

pub use cancel::{CancelFlag, RunCanceller};
pub use orchestrator::{Orchestrator, RunHandle};
pub use primitives::{MediaResizer, PassthroughResizer, StampRequest, WatermarkStamper};
pub use relay::{ProgressWatch, RunObserver, SubProgressSink, dispatch};
pub use temp_files::TempFileSet;
