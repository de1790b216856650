//! Operation descriptions: one `(name, formula, default_value)` triple per
//! generated file.
//!
//! ## Derived Names
//!
//! Every operation name feeds two derived forms used by the template:
//! - `add` → `Add` (display title, first character upper-cased)
//! - `add` + `c` → `add.c` (output filename)
//!
//! The formula is target-language source (C for the bundled template). It is
//! carried as an opaque string and inserted verbatim.

use serde::{Deserialize, Serialize};

/// A single math operation to generate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationSpec {
    /// Lowercase identifier, also the output file stem (e.g. `"divide"`).
    pub name: String,
    /// Statement computing `result` from `input` and `value`.
    pub formula: String,
    /// Default for the operation's `value` property.
    pub default_value: f64,
}

impl OperationSpec {
    pub fn new(name: impl Into<String>, formula: impl Into<String>, default_value: f64) -> Self {
        Self {
            name: name.into(),
            formula: formula.into(),
            default_value,
        }
    }

    /// Display title: the name with its first character upper-cased.
    pub fn title(&self) -> String {
        capitalize(&self.name)
    }

    /// Output filename: `<name>.<ext>`.
    pub fn filename(&self, ext: &str) -> String {
        format!("{}.{}", self.name, ext)
    }
}

/// Upper-case the first character, leaving the rest untouched.
///
/// - `"gamma"` → `"Gamma"`
/// - `"Add"` → `"Add"`
/// - `""` → `""`
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The stock operation set, in generation order.
pub fn builtin_operations() -> Vec<OperationSpec> {
    vec![
        OperationSpec::new("add", "result = input + value", 0.0),
        OperationSpec::new("subtract", "result = input - value", 0.0),
        OperationSpec::new("multiply", "result = input * value", 1.0),
        OperationSpec::new("divide", "result = value==0.0f?0.0f:input/value", 1.0),
        OperationSpec::new("gamma", "result = powf (input, value)", 1.0),
    ]
}
