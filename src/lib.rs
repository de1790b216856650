//! # mathop-gen
//!
//! Generates GEGL's per-pixel math operations (`add`, `subtract`, `multiply`,
//! `divide`, `gamma`) from one C template. The operations differ only in a
//! one-line formula and the default of their `value` property, so instead of
//! five hand-maintained copies there is a template and a list.
//!
//! # Pipeline
//!
//! ```text
//! mathop-gen.toml ─┐
//!                  ├─→ OperationSpec list ─┐
//! stock defaults ──┘                       ├─→ render ─→ <output_dir>/<name>.<ext>
//! template (.c.in) ────────────────────────┘
//! ```
//!
//! One pass, in list order, one file per operation. Output is deterministic,
//! so `mathop-gen check` can tell whether checked-in files match the inputs.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`operation`] | `OperationSpec` triples and the stock operation list |
//! | [`template`] | `@key@` template parsing and rendering |
//! | [`generate`] | Writes (or checks) one file per operation |
//! | [`progress`] | Progress events and pluggable sinks |
//! | [`config`] | `mathop-gen.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## Opaque Formulas
//!
//! Formulas and template bodies are C, not Rust. They are never parsed or
//! validated here; a bad formula surfaces when the generated file is
//! compiled. The only syntax the generator understands is its own `@key@`
//! markers, and unknown markers are rejected when the template is parsed so
//! none can leak into generated source.
//!
//! ## Abort on First Failure
//!
//! A failed write stops the run immediately. Nothing is rolled back: every
//! file is regenerated from scratch on the next run anyway.

pub mod config;
pub mod generate;
pub mod logging;
pub mod operation;
pub mod output;
pub mod progress;
pub mod template;
