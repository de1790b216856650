//! Operation source generation.
//!
//! Renders the template once per operation and writes each result to
//! `<output_dir>/<name>.<ext>`:
//!
//! ```text
//! operations/generated/
//! ├── add.c
//! ├── subtract.c
//! ├── multiply.c
//! ├── divide.c
//! └── gamma.c
//! ```
//!
//! ## Write Policy
//!
//! Files are created or truncated unconditionally. Operations are processed
//! in list order and the run stops at the first failed write; files already
//! written stay in place. Two operations sharing a name write the same path,
//! so the later one wins, and [`check`] compares only that later one.
//!
//! Rendering is deterministic: the same operations and template always give
//! byte-identical files, which is what [`check`] relies on.

use crate::operation::OperationSpec;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::template::Template;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("cannot create output directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("cannot write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
}

/// Where and how artifacts are written.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub output_dir: PathBuf,
    /// File extension without the leading dot.
    pub extension: String,
}

/// Rendered text for one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedArtifact {
    pub filename: String,
    pub contents: String,
}

/// A file written by [`generate`].
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenFile {
    pub filename: String,
    pub path: PathBuf,
    pub bytes: usize,
}

/// Files written by a generate run, in write order.
#[derive(Debug, Clone, Default)]
pub struct GenerateSummary {
    pub files: Vec<WrittenFile>,
}

impl GenerateSummary {
    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(|f| f.bytes).sum()
    }
}

/// State of one artifact compared with what is on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactStatus {
    UpToDate,
    Stale,
    Missing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckEntry {
    pub filename: String,
    pub status: ArtifactStatus,
}

/// Result of [`check`], in operation order.
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub entries: Vec<CheckEntry>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.entries
            .iter()
            .all(|e| e.status == ArtifactStatus::UpToDate)
    }

    pub fn count(&self, status: ArtifactStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }
}

/// Render every operation without touching the filesystem.
pub fn render_all(
    operations: &[OperationSpec],
    template: &Template,
    extension: &str,
) -> Vec<GeneratedArtifact> {
    operations
        .iter()
        .map(|op| GeneratedArtifact {
            filename: op.filename(extension),
            contents: template.render(op, extension),
        })
        .collect()
}

/// Render and write one file per operation, reporting progress to `sink`.
///
/// Stops at the first failed write.
pub fn generate(
    operations: &[OperationSpec],
    template: &Template,
    options: &GenerateOptions,
    sink: &mut impl ProgressSink,
) -> Result<GenerateSummary, GenerateError> {
    fs::create_dir_all(&options.output_dir).map_err(|source| GenerateError::CreateDir {
        path: options.output_dir.clone(),
        source,
    })?;

    let mut summary = GenerateSummary::default();
    for op in operations {
        let filename = op.filename(&options.extension);
        let path = options.output_dir.join(&filename);
        let contents = template.render(op, &options.extension);

        sink.report(ProgressEvent::Generating {
            filename: filename.clone(),
        });
        write_artifact(&path, &contents).map_err(|source| GenerateError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(file = %path.display(), bytes = contents.len(), "wrote operation");

        sink.report(ProgressEvent::Written {
            filename: filename.clone(),
            bytes: contents.len(),
        });
        summary.files.push(WrittenFile {
            filename,
            path,
            bytes: contents.len(),
        });
    }
    Ok(summary)
}

/// The handle is dropped before returning, on success and on error.
fn write_artifact(path: &Path, contents: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())?;
    file.flush()
}

/// Compare what [`generate`] would write against the files on disk.
///
/// Nothing is written. When several operations share a filename only the
/// last one is checked, since that is the one left on disk.
pub fn check(
    operations: &[OperationSpec],
    template: &Template,
    options: &GenerateOptions,
) -> Result<CheckReport, GenerateError> {
    let artifacts = render_all(operations, template, &options.extension);
    let mut report = CheckReport::default();
    for (i, artifact) in artifacts.iter().enumerate() {
        if artifacts[i + 1..].iter().any(|a| a.filename == artifact.filename) {
            tracing::debug!(file = %artifact.filename, "overwritten by a later operation, skipped");
            continue;
        }
        let path = options.output_dir.join(&artifact.filename);
        let status = match fs::read(&path) {
            Ok(existing) if existing == artifact.contents.as_bytes() => ArtifactStatus::UpToDate,
            Ok(_) => ArtifactStatus::Stale,
            Err(e) if e.kind() == io::ErrorKind::NotFound => ArtifactStatus::Missing,
            Err(source) => return Err(GenerateError::Read { path, source }),
        };
        tracing::debug!(file = %path.display(), ?status, "checked operation");
        report.entries.push(CheckEntry {
            filename: artifact.filename.clone(),
            status,
        });
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::builtin_operations;
    use crate::progress::Silent;
    use tempfile::TempDir;

    fn options(dir: &Path) -> GenerateOptions {
        GenerateOptions {
            output_dir: dir.to_path_buf(),
            extension: "c".to_string(),
        }
    }

    fn simple_template() -> Template {
        Template::parse("// @title@ (@filename@)\n@formula@;\nvalue = @default@;\n").unwrap()
    }

    #[test]
    fn generate_writes_one_file_per_operation() {
        let tmp = TempDir::new().unwrap();
        let ops = builtin_operations();
        let summary = generate(&ops, &simple_template(), &options(tmp.path()), &mut Silent).unwrap();

        assert_eq!(summary.files.len(), 5);
        for op in &ops {
            assert!(tmp.path().join(format!("{}.c", op.name)).is_file());
        }
    }

    #[test]
    fn generate_renders_add_example() {
        let tmp = TempDir::new().unwrap();
        let ops = vec![OperationSpec::new("add", "result = input + value", 0.0)];
        generate(&ops, &simple_template(), &options(tmp.path()), &mut Silent).unwrap();

        let text = fs::read_to_string(tmp.path().join("add.c")).unwrap();
        assert_eq!(
            text,
            "// Add (add.c)\nresult = input + value;\nvalue = 0.0;\n"
        );
    }

    #[test]
    fn generate_reports_progress_in_order() {
        let tmp = TempDir::new().unwrap();
        let ops = builtin_operations();
        let mut events: Vec<ProgressEvent> = Vec::new();
        generate(&ops, &simple_template(), &options(tmp.path()), &mut events).unwrap();

        let generating: Vec<String> = events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Generating { filename } => Some(filename.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            generating,
            ["add.c", "subtract.c", "multiply.c", "divide.c", "gamma.c"]
        );
        assert_eq!(events.len(), 10);
    }

    #[test]
    fn generate_creates_output_dir() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("operations/generated");
        let ops = builtin_operations();
        generate(&ops, &simple_template(), &options(&out), &mut Silent).unwrap();
        assert!(out.join("gamma.c").is_file());
    }

    #[test]
    fn generate_overwrites_existing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("add.c");
        fs::write(&path, "stale contents that are longer than the new ones ".repeat(10)).unwrap();

        let ops = vec![OperationSpec::new("add", "result = input + value", 0.0)];
        generate(&ops, &simple_template(), &options(tmp.path()), &mut Silent).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("// Add"));
        assert!(!text.contains("stale"));
    }

    #[test]
    fn duplicate_names_last_write_wins() {
        let tmp = TempDir::new().unwrap();
        let ops = vec![
            OperationSpec::new("op", "result = input", 0.0),
            OperationSpec::new("op", "result = value", 2.0),
        ];
        let summary = generate(&ops, &simple_template(), &options(tmp.path()), &mut Silent).unwrap();

        assert_eq!(summary.files.len(), 2);
        let text = fs::read_to_string(tmp.path().join("op.c")).unwrap();
        assert!(text.contains("result = value;"));
        assert!(text.contains("2.0"));
        assert!(!text.contains("result = input;"));
    }

    #[test]
    fn check_clean_after_duplicate_names() {
        let tmp = TempDir::new().unwrap();
        let ops = vec![
            OperationSpec::new("op", "result = input", 0.0),
            OperationSpec::new("op", "result = value", 2.0),
        ];
        let template = simple_template();
        generate(&ops, &template, &options(tmp.path()), &mut Silent).unwrap();

        let report = check(&ops, &template, &options(tmp.path())).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].filename, "op.c");
    }

    #[test]
    fn generate_twice_is_byte_identical() {
        let tmp = TempDir::new().unwrap();
        let ops = builtin_operations();
        let template = Template::builtin();
        generate(&ops, &template, &options(tmp.path()), &mut Silent).unwrap();
        let first: Vec<Vec<u8>> = ops
            .iter()
            .map(|op| fs::read(tmp.path().join(op.filename("c"))).unwrap())
            .collect();

        generate(&ops, &template, &options(tmp.path()), &mut Silent).unwrap();
        let second: Vec<Vec<u8>> = ops
            .iter()
            .map(|op| fs::read(tmp.path().join(op.filename("c"))).unwrap())
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn generate_aborts_on_first_write_failure() {
        let tmp = TempDir::new().unwrap();
        // A directory where the second file should go makes File::create fail.
        fs::create_dir(tmp.path().join("subtract.c")).unwrap();

        let ops = builtin_operations();
        let mut events: Vec<ProgressEvent> = Vec::new();
        let err = generate(&ops, &simple_template(), &options(tmp.path()), &mut events).unwrap_err();

        match err {
            GenerateError::Write { path, .. } => assert_eq!(path, tmp.path().join("subtract.c")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(tmp.path().join("add.c").is_file());
        assert!(!tmp.path().join("multiply.c").exists());
        assert_eq!(
            events.last(),
            Some(&ProgressEvent::Generating {
                filename: "subtract.c".into()
            })
        );
    }

    #[test]
    fn write_error_names_the_file() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("add.c")).unwrap();
        let ops = vec![OperationSpec::new("add", "result = input + value", 0.0)];
        let err = generate(&ops, &simple_template(), &options(tmp.path()), &mut Silent).unwrap_err();
        assert!(err.to_string().contains("add.c"));
    }

    #[test]
    fn generate_uses_configured_extension() {
        let tmp = TempDir::new().unwrap();
        let opts = GenerateOptions {
            output_dir: tmp.path().to_path_buf(),
            extension: "cl".to_string(),
        };
        let ops = vec![OperationSpec::new("gamma", "result = pow (input, value)", 1.0)];
        generate(&ops, &simple_template(), &opts, &mut Silent).unwrap();
        let text = fs::read_to_string(tmp.path().join("gamma.cl")).unwrap();
        assert!(text.contains("(gamma.cl)"));
    }

    #[test]
    fn render_all_matches_written_files() {
        let tmp = TempDir::new().unwrap();
        let ops = builtin_operations();
        let template = Template::builtin();
        generate(&ops, &template, &options(tmp.path()), &mut Silent).unwrap();

        for artifact in render_all(&ops, &template, "c") {
            let on_disk = fs::read_to_string(tmp.path().join(&artifact.filename)).unwrap();
            assert_eq!(on_disk, artifact.contents);
        }
    }

    #[test]
    fn summary_counts_bytes() {
        let tmp = TempDir::new().unwrap();
        let ops = vec![OperationSpec::new("add", "result = input + value", 0.0)];
        let summary = generate(&ops, &simple_template(), &options(tmp.path()), &mut Silent).unwrap();
        let len = fs::metadata(tmp.path().join("add.c")).unwrap().len() as usize;
        assert_eq!(summary.total_bytes(), len);
    }

    #[test]
    fn check_classifies_artifacts() {
        let tmp = TempDir::new().unwrap();
        let ops = builtin_operations();
        let template = simple_template();
        generate(&ops, &template, &options(tmp.path()), &mut Silent).unwrap();

        fs::write(tmp.path().join("divide.c"), "hand edited").unwrap();
        fs::remove_file(tmp.path().join("gamma.c")).unwrap();

        let report = check(&ops, &template, &options(tmp.path())).unwrap();
        let statuses: Vec<ArtifactStatus> = report.entries.iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            [
                ArtifactStatus::UpToDate,
                ArtifactStatus::UpToDate,
                ArtifactStatus::UpToDate,
                ArtifactStatus::Stale,
                ArtifactStatus::Missing,
            ]
        );
        assert!(!report.is_clean());
        assert_eq!(report.count(ArtifactStatus::UpToDate), 3);
    }

    #[test]
    fn check_does_not_write() {
        let tmp = TempDir::new().unwrap();
        let ops = builtin_operations();
        let report = check(&ops, &simple_template(), &options(tmp.path())).unwrap();
        assert_eq!(report.count(ArtifactStatus::Missing), 5);
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn check_clean_after_generate() {
        let tmp = TempDir::new().unwrap();
        let ops = builtin_operations();
        let template = Template::builtin();
        generate(&ops, &template, &options(tmp.path()), &mut Silent).unwrap();
        assert!(check(&ops, &template, &options(tmp.path())).unwrap().is_clean());
    }
}
