// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

/// Why a single record could not be decoded.
///
/// Decode failures are local to one record: they are reported through
/// [`crate::sink::RecordSink::on_error`] and never stop the stream.
#[derive(Debug)]
pub enum DecodeError {
    Empty,
    MissingData,
    NotJson,
    Malformed(serde_json::Error),
}

impl DecodeError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "EMPTY",
            Self::MissingData => "MISSING_DATA",
            Self::NotJson => "NOT_JSON",
            Self::Malformed(_) => "MALFORMED",
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("parse error: empty record"),
            Self::MissingData => f.write_str("parse error: missing data line"),
            Self::NotJson => f.write_str("parse error: payload is not a JSON object or array"),
            Self::Malformed(e) => write!(f, "parse error: {e}"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Malformed(e) => Some(e),
            _ => None,
        }
    }
}

/// Framing contract violations. These are integration bugs in whatever
/// drives the framer, not bad stream content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    EmptyDelimiter,
    AfterFinal,
    Shrunk { previous: usize, current: usize },
    NotCharBoundary { offset: usize },
}

impl FrameError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyDelimiter => "EMPTY_DELIMITER",
            Self::AfterFinal => "AFTER_FINAL",
            Self::Shrunk { .. } => "SHRUNK",
            Self::NotCharBoundary { .. } => "NOT_CHAR_BOUNDARY",
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDelimiter => f.write_str("delimiter must not be empty"),
            Self::AfterFinal => f.write_str("snapshot delivered after the final snapshot"),
            Self::Shrunk { previous, current } => {
                write!(f, "snapshot shrank from {previous} to {current} bytes")
            }
            Self::NotCharBoundary { offset } => {
                write!(f, "consumed offset {offset} is not a character boundary of the snapshot")
            }
        }
    }
}

impl std::error::Error for FrameError {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
