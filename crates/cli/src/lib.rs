// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Incremental decoding of delimiter-framed JSON records from a growing
//! text stream.

pub mod config;
pub mod error;
pub mod framer;
pub mod pipe;
pub mod record;
pub mod sink;
pub mod test_support;
pub mod transport;

pub use config::StreamOptions;
pub use error::{DecodeError, FrameError};
pub use framer::Framer;
pub use pipe::{JsonPipe, SnapshotHandler};
pub use record::{decode, DecodedRecord};
pub use sink::{Callbacks, RecordSink, StreamEvent};
pub use transport::{flow, spawn_flow, FlowHandle, Transport};
