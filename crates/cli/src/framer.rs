// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use tracing::{debug, trace};

use crate::error::FrameError;
use crate::record;
use crate::sink::RecordSink;

pub const DEFAULT_DELIMITER: &str = "\n\n";

/// Splits a growing text snapshot into delimiter-bounded records.
///
/// Each call receives the whole text received so far. The framer remembers
/// how far it has consumed and only scans the tail, so every record is
/// produced exactly once no matter how the stream is chunked. An
/// undelimited tail stays pending until the final snapshot.
#[derive(Debug, Clone)]
pub struct Framer {
    delimiter: String,
    offset: usize,
    seen: usize,
    finished: bool,
}

impl Default for Framer {
    fn default() -> Self {
        Self { delimiter: DEFAULT_DELIMITER.to_owned(), offset: 0, seen: 0, finished: false }
    }
}

impl Framer {
    pub fn new(delimiter: impl Into<String>) -> Result<Self, FrameError> {
        let delimiter = delimiter.into();
        if delimiter.is_empty() {
            return Err(FrameError::EmptyDelimiter);
        }
        Ok(Self { delimiter, ..Self::default() })
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Byte offset into the cumulative text up to which everything has been
    /// dispatched or discarded.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// True once the final snapshot has been processed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Frame a snapshot and return the raw records that became complete.
    ///
    /// An empty record at the consumed boundary (a delimiter sitting right at
    /// `offset`) and empty records between adjacent delimiters are skipped.
    /// On the final snapshot any non-empty remainder is returned as the last
    /// record.
    ///
    /// Contract violations leave the framer untouched.
    pub fn split<'t>(&mut self, text: &'t str, is_final: bool) -> Result<Vec<&'t str>, FrameError> {
        if self.finished {
            return Err(FrameError::AfterFinal);
        }
        if text.len() < self.seen {
            return Err(FrameError::Shrunk { previous: self.seen, current: text.len() });
        }
        let unconsumed =
            text.get(self.offset..).ok_or(FrameError::NotCharBoundary { offset: self.offset })?;

        let delimiter = self.delimiter.as_str();
        let mut start = if unconsumed.starts_with(delimiter) { delimiter.len() } else { 0 };
        let mut records = Vec::new();

        while let Some(found) = unconsumed[start..].find(delimiter) {
            let record = &unconsumed[start..start + found];
            if !record.is_empty() {
                records.push(record);
            }
            start += found + delimiter.len();
        }

        self.offset += start;
        self.seen = text.len();

        if is_final {
            let tail = &unconsumed[start..];
            if !tail.is_empty() {
                records.push(tail);
            }
            self.offset = text.len();
            self.finished = true;
        }

        trace!(records = records.len(), offset = self.offset, is_final, "framed snapshot");
        Ok(records)
    }

    /// Frame a snapshot, decode every complete record and hand the results
    /// to `sink` in stream order. Returns the number of records dispatched.
    pub fn process_snapshot<S>(
        &mut self,
        text: &str,
        is_final: bool,
        sink: &mut S,
    ) -> Result<usize, FrameError>
    where
        S: RecordSink + ?Sized,
    {
        let records = self.split(text, is_final)?;
        for raw in &records {
            dispatch(raw, sink);
        }
        Ok(records.len())
    }
}

/// Decode one raw record and report the outcome.
pub fn dispatch<S>(raw: &str, sink: &mut S)
where
    S: RecordSink + ?Sized,
{
    match record::decode(raw) {
        Ok(decoded) => sink.on_record(decoded),
        Err(e) => {
            debug!(code = e.as_str(), len = raw.len(), "record decode failed: {e}");
            sink.on_error(&e.to_string());
        }
    }
}

#[cfg(test)]
#[path = "framer_tests.rs"]
mod tests;
