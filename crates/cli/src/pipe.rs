// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use tracing::warn;

use crate::config::StreamOptions;
use crate::error::FrameError;
use crate::framer::Framer;
use crate::sink::RecordSink;

/// Receiver side of a transport.
///
/// A transport calls `on_snapshot` with the full text received so far each
/// time more arrives, once more with `is_final = true` when the body is
/// complete, and `on_complete` exactly once at the end. Transport failures
/// go to `on_transport_error` instead of a final snapshot.
pub trait SnapshotHandler {
    fn on_snapshot(&mut self, text: &str, is_final: bool) -> Result<(), FrameError>;

    fn on_transport_error(&mut self, message: &str);

    fn on_complete(&mut self, status: &str);
}

/// A framer bound to the sink that receives its records.
#[derive(Debug)]
pub struct JsonPipe<S> {
    framer: Framer,
    sink: S,
}

impl<S: RecordSink> JsonPipe<S> {
    pub fn new(framer: Framer, sink: S) -> Self {
        Self { framer, sink }
    }

    pub fn from_options(options: &StreamOptions, sink: S) -> Result<Self, FrameError> {
        Ok(Self::new(Framer::new(options.delimiter.as_str())?, sink))
    }

    pub fn framer(&self) -> &Framer {
        &self.framer
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<S: RecordSink> SnapshotHandler for JsonPipe<S> {
    fn on_snapshot(&mut self, text: &str, is_final: bool) -> Result<(), FrameError> {
        self.framer.process_snapshot(text, is_final, &mut self.sink)?;
        Ok(())
    }

    fn on_transport_error(&mut self, message: &str) {
        warn!(offset = self.framer.offset(), "stream failed: {message}");
        self.sink.on_error(message);
    }

    fn on_complete(&mut self, status: &str) {
        self.sink.on_complete(status);
    }
}

#[cfg(test)]
#[path = "pipe_tests.rs"]
mod tests;
