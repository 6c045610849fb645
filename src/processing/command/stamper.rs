use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

use crate::core::{StampReport, ToolCommand};
use crate::processing::primitives::{StampRequest, WatermarkStamper};
use crate::utils::{StampError, StampResult, file_name, file_size};

use super::types::ToolMessage;

/// Stamps each item by running an external tool once.
///
/// Progress and result messages are read from the tool's stdout as it runs.
pub struct CommandStamper {
    command: ToolCommand,
}

impl CommandStamper {
    pub fn new(command: ToolCommand) -> Self {
        Self { command }
    }

    fn render_args(&self, request: &StampRequest<'_>) -> Vec<String> {
        self.command.render_args(&[
            ("input", path_arg(request.input_path)),
            ("output", path_arg(request.output_path)),
            ("overlay", path_arg(request.overlay_path)),
            ("text", request.text.to_string()),
            ("opacity", request.opacity.to_string()),
        ])
    }
}

impl WatermarkStamper for CommandStamper {
    fn stamp(
        &self,
        request: &StampRequest<'_>,
        on_progress: &mut dyn FnMut(u64, u64),
    ) -> StampResult<StampReport> {
        let program = &self.command.program;
        debug!("Running stamp tool {} for {}", program.display(), file_name(request.input_path));

        let mut child = Command::new(program)
            .args(self.render_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| StampError::tool(format!("Failed to run {}: {}", program.display(), e)))?;

        // Drain stderr on its own thread so a chatty tool cannot block on a full pipe.
        let stderr_reader = child.stderr.take().map(|stderr| {
            thread::spawn(move || {
                let mut buf = String::new();
                let _ = BufReader::new(stderr).read_to_string(&mut buf);
                buf
            })
        });

        let mut reported: Option<(bool, Option<String>)> = None;
        if let Some(stdout) = child.stdout.take() {
            // Read to EOF; non-UTF-8 lines are decoded lossily.
            for raw in BufReader::new(stdout).split(b'\n') {
                let Ok(raw) = raw else { break };
                let line = String::from_utf8_lossy(&raw);
                match ToolMessage::parse(&line) {
                    Some(ToolMessage::Progress { current, total }) => on_progress(current, total),
                    Some(ToolMessage::Result { success, error }) => reported = Some((success, error)),
                    None => debug!("stamp tool: {}", line.trim_end()),
                }
            }
        }

        let status = child
            .wait()
            .map_err(|e| StampError::tool(format!("Failed to wait for {}: {}", program.display(), e)))?;
        let stderr = stderr_reader
            .and_then(|reader| reader.join().ok())
            .unwrap_or_default();

        if !status.success() {
            return Err(StampError::tool(format!(
                "Stamp tool exited with {}: {}",
                status,
                stderr.trim()
            )));
        }

        if let Some((false, error)) = reported {
            return Err(StampError::processing(
                error.unwrap_or_else(|| "Stamp tool reported a failure".to_string()),
            ));
        }

        if !request.output_path.is_file() {
            return Err(StampError::processing(format!(
                "Output file missing: {}",
                request.output_path.display()
            )));
        }

        Ok(StampReport {
            output_path: request.output_path.to_path_buf(),
            output_size: file_size(request.output_path),
        })
    }
}

pub(super) fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::core::Opacity;

    fn sh(script: &str, extra: &[&str]) -> ToolCommand {
        let mut args = vec!["-c".to_string(), script.to_string(), "sh".to_string()];
        args.extend(extra.iter().map(|a| a.to_string()));
        ToolCommand { program: "sh".into(), args }
    }

    struct Files {
        _dir: tempfile::TempDir,
        input: std::path::PathBuf,
        overlay: std::path::PathBuf,
        output: std::path::PathBuf,
    }

    fn files() -> Files {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let overlay = dir.path().join("overlay.png");
        std::fs::write(&input, b"pixels").unwrap();
        std::fs::write(&overlay, b"overlay").unwrap();
        let output = dir.path().join("out.png");
        Files { _dir: dir, input, overlay, output }
    }

    fn request(f: &Files) -> StampRequest<'_> {
        StampRequest {
            input_path: &f.input,
            overlay_path: &f.overlay,
            text: "For Ann - comp - 26/10/17",
            opacity: Opacity::Fixed(0.12),
            output_path: &f.output,
        }
    }

    #[test]
    fn forwards_progress_and_reports_output() {
        let f = files();
        let script = r#"echo '{"type":"progress","current":1,"total":2}'
echo 'working'
echo '{"type":"progress","current":2,"total":2}'
cp "$1" "$2""#;
        let stamper = CommandStamper::new(sh(script, &["{input}", "{output}"]));

        let mut seen = Vec::new();
        let report = stamper
            .stamp(&request(&f), &mut |c: u64, t: u64| seen.push((c, t)))
            .unwrap();

        assert_eq!(seen, vec![(1, 2), (2, 2)]);
        assert_eq!(report.output_path, f.output);
        assert_eq!(report.output_size, 6);
    }

    #[test]
    fn non_utf8_output_does_not_stop_progress() {
        let f = files();
        let script = r#"printf 'frame \377\n'
i=1
while [ $i -le 2000 ]; do
  echo "{\"type\":\"progress\",\"current\":$i,\"total\":2000}"
  i=$((i + 1))
done
cp "$1" "$2""#;
        let stamper = CommandStamper::new(sh(script, &["{input}", "{output}"]));

        let mut calls = 0;
        let report = stamper
            .stamp(&request(&f), &mut |_: u64, _: u64| calls += 1)
            .unwrap();

        assert_eq!(calls, 2000);
        assert_eq!(report.output_size, 6);
    }

    #[test]
    fn placeholders_reach_the_tool() {
        let f = files();
        let script = r#"printf '%s|%s' "$1" "$2" > "$3""#;
        let stamper = CommandStamper::new(sh(script, &["{text}", "{opacity}", "{output}"]));
        stamper.stamp(&request(&f), &mut |_: u64, _: u64| {}).unwrap();
        assert_eq!(
            std::fs::read_to_string(&f.output).unwrap(),
            "For Ann - comp - 26/10/17|0.12"
        );
    }

    #[test]
    fn nonzero_exit_is_a_tool_error() {
        let f = files();
        let stamper = CommandStamper::new(sh("echo 'bad codec' >&2; exit 3", &[]));
        match stamper.stamp(&request(&f), &mut |_: u64, _: u64| {}) {
            Err(StampError::Tool(msg)) => assert!(msg.contains("bad codec"), "{msg}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn reported_failure_and_missing_output_fail_the_item() {
        let f = files();
        let stamper = CommandStamper::new(sh(
            r#"echo '{"type":"result","success":false,"error":"no frames"}'"#,
            &[],
        ));
        match stamper.stamp(&request(&f), &mut |_: u64, _: u64| {}) {
            Err(StampError::Processing(msg)) => assert_eq!(msg, "no frames"),
            other => panic!("unexpected {other:?}"),
        }

        let stamper = CommandStamper::new(sh("true", &[]));
        assert!(matches!(
            stamper.stamp(&request(&f), &mut |_: u64, _: u64| {}),
            Err(StampError::Processing(_))
        ));
    }

    #[test]
    fn missing_program_is_a_tool_error() {
        let f = files();
        let stamper = CommandStamper::new(ToolCommand::new(
            "/nonexistent/stamp-tool",
            Vec::<String>::new(),
        ));
        assert!(matches!(
            stamper.stamp(&request(&f), &mut |_: u64, _: u64| {}),
            Err(StampError::Tool(_))
        ));
    }
}
