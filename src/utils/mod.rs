pub mod error;
pub mod validation;
pub mod formats;
pub mod fs;

pub use error::{PathError, StampError, StampResult, ValidationError};
pub use validation::{validate_job, validate_overlay_path};
pub use formats::{MediaFormat, MediaKind, format_from_path, is_supported};
pub use fs::{file_name, file_size, remove_file_if_exists, unique_temp_path};
