//! Progress events emitted while generating.
//!
//! The generator never prints. It reports to a [`ProgressSink`], and the
//! caller decides where events go: the console printer in [`crate::output`],
//! a channel to another thread, a `Vec` in tests, or nowhere.

use std::sync::mpsc::Sender;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// About to open `filename` for writing.
    Generating { filename: String },
    /// `filename` was written in full.
    Written { filename: String, bytes: usize },
}

pub trait ProgressSink {
    fn report(&mut self, event: ProgressEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl ProgressSink for Silent {
    fn report(&mut self, _event: ProgressEvent) {}
}

impl ProgressSink for Vec<ProgressEvent> {
    fn report(&mut self, event: ProgressEvent) {
        self.push(event);
    }
}

impl ProgressSink for Sender<ProgressEvent> {
    fn report(&mut self, event: ProgressEvent) {
        // A dropped receiver only means nobody is listening.
        let _ = self.send(event);
    }
}
