//! Operation template parsing and rendering.
//!
//! A template is plain target-language source with `@key@` substitution
//! points. It is parsed once into literal runs and placeholders; rendering is
//! then a single pass that never re-scans substituted text, so a formula may
//! contain anything (including `@`) and still lands verbatim.
//!
//! ## Placeholders
//!
//! | Marker        | Value for `add` with extension `c` |
//! |---------------|------------------------------------|
//! | `@name@`      | `add`                              |
//! | `@title@`     | `Add`                              |
//! | `@filename@`  | `add.c`                            |
//! | `@formula@`   | `result = input + value`           |
//! | `@default@`   | `0.0`                              |
//!
//! `@@` produces a literal `@`. A lone `@` that does not open a marker is kept
//! as-is. A marker with an unrecognised lowercase key is a parse error rather
//! than silently surviving into the output.

use crate::operation::OperationSpec;
use std::fs;
use std::path::Path;
use thiserror::Error;

const BUILTIN: &str = include_str!("../templates/point_composer.c.in");

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown placeholder @{key}@ on line {line}")]
    UnknownPlaceholder { key: String, line: usize },
}

/// A substitution point in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Name,
    Title,
    Filename,
    Formula,
    Default,
}

impl Placeholder {
    pub const ALL: [Placeholder; 5] = [
        Placeholder::Name,
        Placeholder::Title,
        Placeholder::Filename,
        Placeholder::Formula,
        Placeholder::Default,
    ];

    /// The key between the `@` delimiters.
    pub fn key(self) -> &'static str {
        match self {
            Placeholder::Name => "name",
            Placeholder::Title => "title",
            Placeholder::Filename => "filename",
            Placeholder::Formula => "formula",
            Placeholder::Default => "default",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Field(Placeholder),
}

/// A parsed template, immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse template text into literal runs and placeholders.
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = text;

        while let Some(at) = rest.find('@') {
            literal.push_str(&rest[..at]);
            let after = &rest[at + 1..];

            if let Some(stripped) = after.strip_prefix('@') {
                literal.push('@');
                rest = stripped;
                continue;
            }

            let Some(key) = marker_key(after) else {
                literal.push('@');
                rest = after;
                continue;
            };

            let placeholder = Placeholder::from_key(key).ok_or_else(|| {
                let offset = text.len() - rest.len() + at;
                TemplateError::UnknownPlaceholder {
                    key: key.to_string(),
                    line: text[..offset].matches('\n').count() + 1,
                }
            })?;

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Field(placeholder));
            rest = &after[key.len() + 1..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    /// The GEGL point-composer template bundled with the binary.
    pub fn builtin() -> Self {
        Self::parse(BUILTIN).expect("bundled template must parse")
    }

    /// Read and parse a template file.
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Whether the template contains at least one `placeholder` marker.
    pub fn uses(&self, placeholder: Placeholder) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Field(p) if *p == placeholder))
    }

    /// Render the template for one operation.
    pub fn render(&self, op: &OperationSpec, ext: &str) -> String {
        let title = op.title();
        let filename = op.filename(ext);
        let default = format_default(op.default_value);

        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(Placeholder::Name) => out.push_str(&op.name),
                Segment::Field(Placeholder::Title) => out.push_str(&title),
                Segment::Field(Placeholder::Filename) => out.push_str(&filename),
                Segment::Field(Placeholder::Formula) => out.push_str(&op.formula),
                Segment::Field(Placeholder::Default) => out.push_str(&default),
            }
        }
        out
    }
}

/// Return the marker key if `s` starts with `key@` where key is `[a-z_]+`.
fn marker_key(s: &str) -> Option<&str> {
    let end = s.find('@')?;
    let key = &s[..end];
    let is_key = !key.is_empty() && key.bytes().all(|b| b.is_ascii_lowercase() || b == b'_');
    is_key.then_some(key)
}

/// Format a default value as a floating-point literal.
///
/// Integral values keep their fractional part (`1.0`, not `1`) so the
/// generated source reads as a double.
pub fn format_default(value: f64) -> String {
    format!("{:?}", value)
}
