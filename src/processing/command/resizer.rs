use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

use crate::core::{ResizeLimit, ToolCommand};
use crate::processing::primitives::MediaResizer;
use crate::utils::{StampError, StampResult, file_name, remove_file_if_exists, unique_temp_path};

use super::stamper::path_arg;

/// Downscales by running an external tool into a fresh temp file.
///
/// The tool is expected to leave `{output}` absent when no resize is needed.
pub struct CommandResizer {
    command: ToolCommand,
}

impl CommandResizer {
    pub fn new(command: ToolCommand) -> Self {
        Self { command }
    }
}

impl MediaResizer for CommandResizer {
    fn resize(&self, input_path: &Path, limit: ResizeLimit) -> StampResult<Option<PathBuf>> {
        let extension = input_path.extension().and_then(|e| e.to_str());
        let temp_path = unique_temp_path("stamp-resize", extension);
        let args = self.command.render_args(&[
            ("input", path_arg(input_path)),
            ("output", path_arg(&temp_path)),
            ("limit", limit.to_string()),
        ]);

        debug!(
            "Running resize tool {} for {} (limit {})",
            self.command.program.display(),
            file_name(input_path),
            limit
        );

        let output = Command::new(&self.command.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                StampError::tool(format!("Failed to run {}: {}", self.command.program.display(), e))
            })?;

        if !output.status.success() {
            let _ = remove_file_if_exists(&temp_path);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StampError::resize(format!(
                "Resize tool exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        if temp_path.is_file() {
            Ok(Some(temp_path))
        } else {
            Ok(None)
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> ToolCommand {
        ToolCommand::new("sh", ["-c", script, "sh", "{input}", "{limit}", "{output}"])
    }

    fn limit() -> ResizeLimit {
        ResizeLimit::new(2048).unwrap()
    }

    #[test]
    fn returns_temp_copy_when_tool_writes_one() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("big.jpg");
        std::fs::write(&input, b"huge").unwrap();

        let resizer = CommandResizer::new(sh(r#"printf '%s' "$2" > "$3""#));
        let temp = resizer.resize(&input, limit()).unwrap().expect("temp copy");

        assert_ne!(temp, input);
        assert_eq!(temp.extension().unwrap(), "jpg");
        assert_eq!(std::fs::read_to_string(&temp).unwrap(), "2048");
        assert!(input.exists());
        std::fs::remove_file(temp).unwrap();
    }

    #[test]
    fn no_output_means_within_limit() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("small.png");
        std::fs::write(&input, b"tiny").unwrap();

        let resizer = CommandResizer::new(sh("true"));
        assert_eq!(resizer.resize(&input, limit()).unwrap(), None);
    }

    #[test]
    fn nonzero_exit_is_a_resize_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.mov");
        std::fs::write(&input, b"frames").unwrap();

        let resizer = CommandResizer::new(sh(r#"echo partial > "$3"; echo 'decoder crashed' >&2; exit 1"#));
        match resizer.resize(&input, limit()) {
            Err(StampError::Resize(msg)) => assert!(msg.contains("decoder crashed"), "{msg}"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
