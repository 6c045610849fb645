use std::collections::HashSet;
use std::path::Path;
use crate::core::{Job, JobItem, Opacity};
use crate::utils::{StampResult, ValidationError, format_from_path};

/// Validates a job before a run is allowed to start
pub fn validate_job(job: &Job) -> StampResult<()> {
    if job.is_empty() {
        return Err(ValidationError::EmptyJob.into());
    }

    validate_overlay_path(&job.overlay_path)?;
    validate_opacity(job.opacity)?;

    let mut outputs = HashSet::with_capacity(job.len());
    for item in &job.items {
        validate_item(item)?;
        if !outputs.insert(item.output_path.as_path()) {
            return Err(ValidationError::settings(format!(
                "Output path is used by more than one item: {}",
                item.output_path.display()
            ))
            .into());
        }
    }

    Ok(())
}

/// Validates one input/output pair
pub fn validate_item(item: &JobItem) -> StampResult<()> {
    validate_input_path(&item.input_path)?;
    validate_output_path(&item.output_path)?;

    if item.input_path == item.output_path {
        return Err(ValidationError::same_as_input(&item.output_path).into());
    }
    Ok(())
}

/// Validates the input file path and format
pub fn validate_input_path(path: &Path) -> StampResult<()> {
    if !path.exists() {
        return Err(ValidationError::path_not_found(path).into());
    }

    if !path.is_file() {
        return Err(ValidationError::not_a_file(path).into());
    }

    // This will validate the extension and format
    format_from_path(path).map_err(|e| ValidationError::settings(e.to_string()))?;
    Ok(())
}

/// Validates the output file path; its directory must already exist
pub fn validate_output_path(path: &Path) -> StampResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(ValidationError::missing_parent(parent).into());
        }
    }

    format_from_path(path).map_err(|e| ValidationError::settings(e.to_string()))?;
    Ok(())
}

/// Validates the overlay image path
pub fn validate_overlay_path(path: &Path) -> StampResult<()> {
    if !path.exists() {
        return Err(ValidationError::path_not_found(path).into());
    }
    if !path.is_file() {
        return Err(ValidationError::not_a_file(path).into());
    }
    Ok(())
}

/// Validates opacity bounds; every value must lie strictly between 0 and 1
pub fn validate_opacity(opacity: Opacity) -> StampResult<()> {
    let in_range = |value: f32| value > 0.0 && value < 1.0;

    match opacity {
        Opacity::Fixed(value) if !in_range(value) => Err(ValidationError::settings(format!(
            "Invalid opacity value: {}. Must be between 0 and 1", value
        ))
        .into()),
        Opacity::Adaptive { low, high } if !in_range(low) || !in_range(high) || low > high => {
            Err(ValidationError::settings(format!(
                "Invalid adaptive opacity range: {}..{}", low, high
            ))
            .into())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{PathError, StampError};
    use std::path::PathBuf;

    struct Fixture {
        dir: tempfile::TempDir,
        overlay: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let overlay = dir.path().join("overlay.png");
            std::fs::write(&overlay, b"overlay").unwrap();
            std::fs::create_dir(dir.path().join("out")).unwrap();
            Self { dir, overlay }
        }

        fn input(&self, name: &str) -> PathBuf {
            let path = self.dir.path().join(name);
            std::fs::write(&path, b"media").unwrap();
            path
        }

        fn output(&self, name: &str) -> PathBuf {
            self.dir.path().join("out").join(name)
        }

        fn job(&self, items: Vec<JobItem>) -> Job {
            Job::new(items, "For Ann - comp - 26/10/17", &self.overlay, Opacity::Fixed(0.12))
        }
    }

    fn invalid(result: StampResult<()>) -> ValidationError {
        match result {
            Err(StampError::InvalidJob(e)) => e,
            other => panic!("expected an invalid job, got {other:?}"),
        }
    }

    #[test]
    fn accepts_well_formed_job() {
        let fx = Fixture::new();
        let job = fx.job(vec![
            JobItem::new(fx.input("a.jpg"), fx.output("a.jpg")),
            JobItem::new(fx.input("b.pdf"), fx.output("b.pdf")),
        ]);
        validate_job(&job).unwrap();
    }

    #[test]
    fn rejects_empty_job() {
        let fx = Fixture::new();
        assert!(matches!(invalid(validate_job(&fx.job(vec![]))), ValidationError::EmptyJob));
    }

    #[test]
    fn rejects_missing_overlay_and_inputs() {
        let fx = Fixture::new();
        let mut job = fx.job(vec![JobItem::new(fx.input("a.png"), fx.output("a.png"))]);
        job.overlay_path = fx.dir.path().join("missing.png");
        assert!(matches!(
            invalid(validate_job(&job)),
            ValidationError::Path(PathError::NotFound(_))
        ));

        let job = fx.job(vec![JobItem::new(fx.dir.path().join("nope.png"), fx.output("a.png"))]);
        assert!(matches!(
            invalid(validate_job(&job)),
            ValidationError::Path(PathError::NotFound(_))
        ));
    }

    #[test]
    fn rejects_bad_outputs() {
        let fx = Fixture::new();
        let input = fx.input("a.png");

        let job = fx.job(vec![JobItem::new(&input, &input)]);
        assert!(matches!(
            invalid(validate_job(&job)),
            ValidationError::Path(PathError::SameAsInput(_))
        ));

        let job = fx.job(vec![JobItem::new(&input, fx.dir.path().join("absent/a.png"))]);
        assert!(matches!(
            invalid(validate_job(&job)),
            ValidationError::Path(PathError::MissingParent(_))
        ));

        let job = fx.job(vec![
            JobItem::new(&input, fx.output("same.png")),
            JobItem::new(fx.input("b.png"), fx.output("same.png")),
        ]);
        assert!(matches!(invalid(validate_job(&job)), ValidationError::Settings(_)));
    }

    #[test]
    fn rejects_unsupported_input_format() {
        let fx = Fixture::new();
        let job = fx.job(vec![JobItem::new(fx.input("notes.txt"), fx.output("notes.txt"))]);
        assert!(matches!(invalid(validate_job(&job)), ValidationError::Settings(_)));
    }

    #[test]
    fn opacity_bounds() {
        assert!(validate_opacity(Opacity::Fixed(0.5)).is_ok());
        assert!(validate_opacity(Opacity::Fixed(0.0)).is_err());
        assert!(validate_opacity(Opacity::Fixed(1.0)).is_err());
        assert!(validate_opacity(Opacity::Adaptive { low: 0.075, high: 0.15 }).is_ok());
        assert!(validate_opacity(Opacity::Adaptive { low: 0.3, high: 0.1 }).is_err());
        assert!(validate_opacity(Opacity::Adaptive { low: 0.0, high: 0.1 }).is_err());
    }
}
