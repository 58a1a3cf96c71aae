// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::record::DecodedRecord;

/// Consumer of one stream's output.
///
/// Records and errors arrive interleaved in stream order. `on_complete` is
/// called exactly once, after everything else for the stream.
pub trait RecordSink {
    fn on_record(&mut self, _record: DecodedRecord) {}

    fn on_error(&mut self, _message: &str) {}

    fn on_complete(&mut self, _status: &str) {}
}

/// Everything a stream can report, in a form that can be queued or printed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Record(DecodedRecord),
    Error { message: String },
    Complete { status: String },
}

impl StreamEvent {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }
}

impl RecordSink for Vec<StreamEvent> {
    fn on_record(&mut self, record: DecodedRecord) {
        self.push(StreamEvent::Record(record));
    }

    fn on_error(&mut self, message: &str) {
        self.push(StreamEvent::Error { message: message.to_owned() });
    }

    fn on_complete(&mut self, status: &str) {
        self.push(StreamEvent::Complete { status: status.to_owned() });
    }
}

/// Forwards events to a channel. A dropped receiver just discards them.
impl RecordSink for mpsc::UnboundedSender<StreamEvent> {
    fn on_record(&mut self, record: DecodedRecord) {
        let _ = self.send(StreamEvent::Record(record));
    }

    fn on_error(&mut self, message: &str) {
        let _ = self.send(StreamEvent::Error { message: message.to_owned() });
    }

    fn on_complete(&mut self, status: &str) {
        let _ = self.send(StreamEvent::Complete { status: status.to_owned() });
    }
}

type RecordFn<'a> = Box<dyn FnMut(DecodedRecord) + Send + 'a>;
type MessageFn<'a> = Box<dyn FnMut(&str) + Send + 'a>;

/// Closure-backed sink. Unset callbacks are no-ops.
pub struct Callbacks<'a> {
    record: RecordFn<'a>,
    error: MessageFn<'a>,
    complete: MessageFn<'a>,
}

impl Default for Callbacks<'_> {
    fn default() -> Self {
        Self {
            record: Box::new(|_: DecodedRecord| {}),
            error: Box::new(|_: &str| {}),
            complete: Box::new(|_: &str| {}),
        }
    }
}

impl<'a> Callbacks<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(mut self, f: impl FnMut(DecodedRecord) + Send + 'a) -> Self {
        self.record = Box::new(f);
        self
    }

    pub fn error(mut self, f: impl FnMut(&str) + Send + 'a) -> Self {
        self.error = Box::new(f);
        self
    }

    pub fn complete(mut self, f: impl FnMut(&str) + Send + 'a) -> Self {
        self.complete = Box::new(f);
        self
    }
}

impl RecordSink for Callbacks<'_> {
    fn on_record(&mut self, record: DecodedRecord) {
        (self.record)(record);
    }

    fn on_error(&mut self, message: &str) {
        (self.error)(message);
    }

    fn on_complete(&mut self, status: &str) {
        (self.complete)(status);
    }
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
