// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared unit-test helpers.

use crate::error::FrameError;
use crate::framer::Framer;
use crate::sink::StreamEvent;

/// Assert that an expression evaluates to `Err` whose Display output
/// contains the given substring.
#[macro_export]
macro_rules! assert_err_contains {
    ($expr:expr, $substr:expr) => {{
        match $expr {
            Ok(_) => unreachable!(concat!("expected Err for: ", stringify!($expr))),
            Err(err) => {
                let msg = err.to_string();
                assert!(msg.contains($substr), "expected error containing {:?}, got: {msg:?}", $substr);
            }
        }
    }};
}

/// Deliver `text` to a fresh framer as a series of growing snapshots, one
/// per entry in `cuts`, followed by the whole text marked final.
pub fn feed_in_steps(
    delimiter: &str,
    text: &str,
    cuts: &[usize],
) -> Result<Vec<StreamEvent>, FrameError> {
    let mut framer = Framer::new(delimiter)?;
    let mut events = Vec::new();
    for &cut in cuts {
        framer.process_snapshot(&text[..cut], false, &mut events)?;
    }
    framer.process_snapshot(text, true, &mut events)?;
    Ok(events)
}
