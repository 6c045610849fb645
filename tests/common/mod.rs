//! Fake primitives and fixtures shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::mpsc;
use std::time::Duration;

use watermark_stamper_lib::core::{Job, JobItem, Opacity, ResizeLimit, RunEvent, StampReport};
use watermark_stamper_lib::{MediaResizer, StampError, StampRequest, StampResult, WatermarkStamper};

/// Stamps by copying the effective input to the output.
///
/// Inputs whose file name contains `fail` return an error and those
/// containing `panic` panic. With a gate, every call waits for one token.
#[derive(Default)]
pub struct FakeStamper {
    pub seen: Mutex<Vec<PathBuf>>,
    gate: Option<Mutex<mpsc::Receiver<()>>>,
}

impl FakeStamper {
    pub fn gated() -> (Self, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let stamper = Self {
            seen: Mutex::new(Vec::new()),
            gate: Some(Mutex::new(rx)),
        };
        (stamper, tx)
    }

    pub fn seen(&self) -> Vec<PathBuf> {
        self.seen.lock().unwrap().clone()
    }
}

impl WatermarkStamper for FakeStamper {
    fn stamp(
        &self,
        request: &StampRequest<'_>,
        on_progress: &mut dyn FnMut(u64, u64),
    ) -> StampResult<StampReport> {
        self.seen.lock().unwrap().push(request.input_path.to_path_buf());
        if let Some(gate) = &self.gate {
            gate.lock()
                .unwrap()
                .recv_timeout(Duration::from_secs(10))
                .expect("gate was never opened");
        }

        let name = request.input_path.file_name().unwrap().to_string_lossy().into_owned();
        on_progress(1, 2);
        if name.contains("panic") {
            panic!("stamp tool crashed on {name}");
        }
        if name.contains("fail") {
            return Err(StampError::processing(format!("cannot stamp {name}")));
        }

        std::fs::copy(request.input_path, request.output_path)?;
        on_progress(2, 2);
        Ok(StampReport {
            output_path: request.output_path.to_path_buf(),
            output_size: std::fs::metadata(request.output_path)?.len(),
        })
    }
}

/// Writes a temp copy of every input into its own directory.
///
/// Inputs whose name contains `small` are already within the limit and those
/// containing `broken` fail to resize.
pub struct FakeResizer {
    dir: PathBuf,
    pub calls: Mutex<Vec<PathBuf>>,
    pub created: Mutex<Vec<PathBuf>>,
}

impl FakeResizer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            calls: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<PathBuf> {
        self.created.lock().unwrap().clone()
    }
}

impl MediaResizer for FakeResizer {
    fn resize(&self, input_path: &Path, limit: ResizeLimit) -> StampResult<Option<PathBuf>> {
        self.calls.lock().unwrap().push(input_path.to_path_buf());
        let name = input_path.file_name().unwrap().to_string_lossy().into_owned();
        if name.contains("small") {
            return Ok(None);
        }
        if name.contains("broken") {
            return Err(StampError::resize(format!("cannot decode {name}")));
        }

        let temp = self.dir.join(format!("{}-{}", limit.get(), name));
        std::fs::copy(input_path, &temp)?;
        self.created.lock().unwrap().push(temp.clone());
        Ok(Some(temp))
    }
}

/// A scratch directory with an overlay, an output folder and input files.
pub struct Workspace {
    pub dir: tempfile::TempDir,
    pub overlay: PathBuf,
    pub out: PathBuf,
    pub temp: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let overlay = dir.path().join("overlay.png");
        std::fs::write(&overlay, b"overlay").unwrap();
        let out = dir.path().join("Ann_261017");
        std::fs::create_dir(&out).unwrap();
        let temp = dir.path().join("resized");
        std::fs::create_dir(&temp).unwrap();
        Self { dir, overlay, out, temp }
    }

    pub fn input(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, format!("media:{name}")).unwrap();
        path
    }

    pub fn job(&self, names: &[&str]) -> Job {
        let items = names
            .iter()
            .map(|name| JobItem::new(self.input(name), self.out.join(name)))
            .collect();
        Job::new(items, "For Ann - comp - 26/10/17", &self.overlay, Opacity::Fixed(0.12))
    }

    pub fn temp_entries(&self) -> usize {
        std::fs::read_dir(&self.temp).unwrap().count()
    }
}

/// Reads events until the stream ends.
pub async fn collect_events(handle: &mut watermark_stamper_lib::RunHandle) -> Vec<RunEvent> {
    let mut events = Vec::new();
    while let Some(event) = handle.next_event().await {
        events.push(event);
    }
    events
}

pub fn completed_indices(events: &[RunEvent]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|event| match event {
            RunEvent::ItemCompleted(outcome) => Some(outcome.index),
            _ => None,
        })
        .collect()
}

pub fn terminal_count(events: &[RunEvent]) -> usize {
    events.iter().filter(|event| event.is_terminal()).count()
}

pub fn unique(paths: &[PathBuf]) -> usize {
    paths.iter().collect::<HashSet<_>>().len()
}
