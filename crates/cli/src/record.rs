// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

const EVENT_PREFIX: &str = "event: ";
const ID_PREFIX: &str = "id: ";
const DATA_PREFIX: &str = "data:";

/// One decoded stream record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub data: serde_json::Value,
}

impl DecodedRecord {
    pub fn new(data: serde_json::Value) -> Self {
        Self { event: None, id: None, data }
    }

    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Decode one framed record.
///
/// Layout, each line optional except `data:`:
///
/// ```text
/// event: <name>
/// id: <id>
/// data: <json object or array>
/// ```
///
/// Header lines are only recognised in that order and only at the top of the
/// record. Anything after the data line is ignored.
pub fn decode(raw: &str) -> Result<DecodedRecord, DecodeError> {
    if raw.is_empty() {
        return Err(DecodeError::Empty);
    }

    let mut lines = raw.lines();
    let mut line = lines.next().ok_or(DecodeError::Empty)?;

    let event = match line.strip_prefix(EVENT_PREFIX) {
        Some(name) => {
            line = lines.next().ok_or(DecodeError::MissingData)?;
            Some(name.to_owned())
        }
        None => None,
    };

    let id = match line.strip_prefix(ID_PREFIX) {
        Some(id) => {
            line = lines.next().ok_or(DecodeError::MissingData)?;
            Some(id.to_owned())
        }
        None => None,
    };

    let payload = line.strip_prefix(DATA_PREFIX).ok_or(DecodeError::MissingData)?;
    let payload = payload.strip_prefix(' ').unwrap_or(payload);
    let data = parse_payload(payload)?;

    Ok(DecodedRecord { event, id, data })
}

/// Decode a JSON payload, rejecting anything that is not bracketed like an
/// object or array before handing it to `serde_json`.
pub fn parse_payload(payload: &str) -> Result<serde_json::Value, DecodeError> {
    if !looks_like_json(payload) {
        return Err(DecodeError::NotJson);
    }
    serde_json::from_str(payload).map_err(DecodeError::Malformed)
}

fn looks_like_json(payload: &str) -> bool {
    let trimmed = payload.trim();
    trimmed.starts_with(['{', '[']) && trimmed.ends_with(['}', ']'])
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
