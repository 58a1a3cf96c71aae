// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Accumulates a response body as text while bytes are still arriving.
///
/// Only complete UTF-8 sequences are appended to the text; an incomplete
/// trailing sequence is held back until the next chunk. Invalid sequences
/// become U+FFFD. Characters are never revised once appended, so every
/// [`text`](Self::text) is a prefix-extension of the previous one.
#[derive(Debug, Default)]
pub struct SnapshotBuffer {
    text: String,
    pending: Vec<u8>,
}

impl SnapshotBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);

        let mut rest: &[u8] = &self.pending;
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    self.text.push_str(valid);
                    rest = &[];
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    self.text.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match e.error_len() {
                        Some(len) => {
                            self.text.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            rest = after;
                            break;
                        }
                    }
                }
            }
        }

        let held = rest.len();
        let consumed = self.pending.len() - held;
        self.pending.drain(..consumed);
    }

    /// Text decoded so far, excluding any held-back partial character.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Bytes received but not yet decodable.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Flush a truncated trailing sequence as U+FFFD and return the full text.
    pub fn finish(&mut self) -> &str {
        if !self.pending.is_empty() {
            self.pending.clear();
            self.text.push(char::REPLACEMENT_CHARACTER);
        }
        &self.text
    }
}

#[cfg(test)]
#[path = "body_tests.rs"]
mod tests;
