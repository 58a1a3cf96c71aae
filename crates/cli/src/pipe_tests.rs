// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde_json::json;

use super::{JsonPipe, SnapshotHandler};
use crate::config::StreamOptions;
use crate::error::FrameError;
use crate::framer::Framer;
use crate::record::DecodedRecord;
use crate::sink::StreamEvent;
use crate::test_support::feed_in_steps;

#[test]
fn snapshots_flow_into_the_sink() -> anyhow::Result<()> {
    let mut pipe = JsonPipe::new(Framer::default(), Vec::<StreamEvent>::new());
    pipe.on_snapshot("data: [1]\n\ndata: [", false)?;
    assert_eq!(pipe.sink().len(), 1);
    pipe.on_snapshot("data: [1]\n\ndata: [2]", true)?;
    pipe.on_complete("200 OK");

    assert_eq!(
        pipe.into_sink(),
        vec![
            StreamEvent::Record(DecodedRecord::new(json!([1]))),
            StreamEvent::Record(DecodedRecord::new(json!([2]))),
            StreamEvent::Complete { status: "200 OK".into() },
        ]
    );
    Ok(())
}

#[test]
fn transport_error_reaches_sink_before_complete() {
    let mut pipe = JsonPipe::new(Framer::default(), Vec::<StreamEvent>::new());
    pipe.on_transport_error("503 Service Unavailable");
    pipe.on_complete("503 Service Unavailable");

    assert_eq!(
        pipe.into_sink(),
        vec![
            StreamEvent::Error { message: "503 Service Unavailable".into() },
            StreamEvent::Complete { status: "503 Service Unavailable".into() },
        ]
    );
}

#[test]
fn from_options_uses_configured_delimiter() -> anyhow::Result<()> {
    let options = StreamOptions { delimiter: "\n".into(), ..StreamOptions::default() };
    let mut pipe = JsonPipe::from_options(&options, Vec::<StreamEvent>::new())?;
    assert_eq!(pipe.framer().delimiter(), "\n");

    pipe.on_snapshot("data: {}\ndata: []\n", true)?;
    assert_eq!(pipe.sink().len(), 2);
    Ok(())
}

#[test]
fn from_options_rejects_empty_delimiter() {
    let options = StreamOptions { delimiter: String::new(), ..StreamOptions::default() };
    let result = JsonPipe::from_options(&options, Vec::<StreamEvent>::new());
    assert!(matches!(result, Err(FrameError::EmptyDelimiter)));
}

#[test]
fn contract_violation_surfaces_as_error() -> anyhow::Result<()> {
    let mut pipe = JsonPipe::new(Framer::default(), Vec::<StreamEvent>::new());
    pipe.on_snapshot("data: {}", true)?;
    assert_eq!(pipe.on_snapshot("data: {}\n\n", true), Err(FrameError::AfterFinal));
    Ok(())
}

#[test]
fn chunked_and_whole_deliveries_agree() -> anyhow::Result<()> {
    let text = "\n\nevent: a\ndata: {\"n\":1}\n\nbroken\n\nid: 3\ndata: [3]";
    let whole = feed_in_steps("\n\n", text, &[])?;
    for cut in 0..=text.len() {
        assert_eq!(feed_in_steps("\n\n", text, &[cut])?, whole, "cut at {cut}");
    }
    assert_eq!(whole.len(), 3);
    assert!(matches!(whole[1], StreamEvent::Error { .. }));
    Ok(())
}
