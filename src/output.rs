//! CLI output formatting.
//!
//! Each command has a `format_*` function returning lines (pure, no I/O, easy
//! to test) and a `print_*` wrapper that writes them to stdout.
//!
//! # Output Format
//!
//! ## Generate
//!
//! ```text
//! generating add.c
//! generating subtract.c
//! ...
//! Generated 5 operations in operations/generated (14210 bytes)
//! ```
//!
//! ## Check
//!
//! ```text
//! add.c: up to date
//! divide.c: stale
//! gamma.c: missing
//! 1 up to date, 1 stale, 1 missing
//! ```
//!
//! ## List
//!
//! ```text
//! 001 Add → add.c
//!     Formula: result = input + value
//!     Default: 0.0
//! ```

use crate::generate::{ArtifactStatus, CheckReport, GenerateSummary};
use crate::operation::OperationSpec;
use crate::progress::ProgressEvent;
use crate::template::format_default;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

// ============================================================================
// Progress
// ============================================================================

/// The console line for a progress event, if it has one.
///
/// Only `Generating` is shown; completed writes are logged at debug level.
pub fn format_event(event: &ProgressEvent) -> Option<String> {
    match event {
        ProgressEvent::Generating { filename } => Some(format!("generating {}", filename)),
        ProgressEvent::Written { .. } => None,
    }
}

// ============================================================================
// Generate
// ============================================================================

pub fn format_generate_summary(summary: &GenerateSummary, output_dir: &Path) -> Vec<String> {
    let noun = if summary.files.len() == 1 {
        "operation"
    } else {
        "operations"
    };
    vec![format!(
        "Generated {} {} in {} ({} bytes)",
        summary.files.len(),
        noun,
        output_dir.display(),
        summary.total_bytes()
    )]
}

pub fn print_generate_summary(summary: &GenerateSummary, output_dir: &Path) {
    for line in format_generate_summary(summary, output_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

fn status_label(status: ArtifactStatus) -> &'static str {
    match status {
        ArtifactStatus::UpToDate => "up to date",
        ArtifactStatus::Stale => "stale",
        ArtifactStatus::Missing => "missing",
    }
}

pub fn format_check_report(report: &CheckReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .entries
        .iter()
        .map(|e| format!("{}: {}", e.filename, status_label(e.status)))
        .collect();
    lines.push(format!(
        "{} up to date, {} stale, {} missing",
        report.count(ArtifactStatus::UpToDate),
        report.count(ArtifactStatus::Stale),
        report.count(ArtifactStatus::Missing)
    ));
    lines
}

pub fn print_check_report(report: &CheckReport) {
    for line in format_check_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// List
// ============================================================================

pub fn format_operation_list(operations: &[OperationSpec], extension: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, op) in operations.iter().enumerate() {
        lines.push(format!(
            "{} {} → {}",
            format_index(i + 1),
            op.title(),
            op.filename(extension)
        ));
        lines.push(format!("{}Formula: {}", indent(1), op.formula));
        lines.push(format!(
            "{}Default: {}",
            indent(1),
            format_default(op.default_value)
        ));
    }
    lines
}

pub fn print_operation_list(operations: &[OperationSpec], extension: &str) {
    for line in format_operation_list(operations, extension) {
        println!("{}", line);
    }
}
