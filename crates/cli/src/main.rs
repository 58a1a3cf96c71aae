// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use jsonpipe::config::Config;
use jsonpipe::record::DecodedRecord;
use jsonpipe::sink::{RecordSink, StreamEvent};

#[tokio::main]
async fn main() {
    let config = Config::parse();

    if let Err(e) = config.validate() {
        eprintln!("error: {e}");
        std::process::exit(2);
    }

    init_tracing(&config);

    match run(config).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("fatal: {e:#}");
            std::process::exit(1);
        }
    }
}

fn init_tracing(config: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries the records.
    match config.log_format.as_str() {
        "json" => {
            fmt::fmt().with_env_filter(filter).with_writer(std::io::stderr).json().init();
        }
        _ => {
            fmt::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
        }
    }
}

/// Returns whether the stream completed with `200 OK`.
async fn run(config: Config) -> anyhow::Result<bool> {
    let options = config.stream_options()?;
    let shutdown = CancellationToken::new();

    {
        let sd = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupted, aborting stream");
                sd.cancel();
            }
        });
    }

    let sink = jsonpipe::flow(&config.url, &options, StdoutSink::default(), shutdown).await?;
    Ok(sink.succeeded)
}

/// Writes every event to stdout as one JSON line.
#[derive(Default)]
struct StdoutSink {
    succeeded: bool,
}

impl StdoutSink {
    fn emit(&self, event: &StreamEvent) {
        let mut out = std::io::stdout().lock();
        let written = serde_json::to_writer(&mut out, event)
            .map_err(std::io::Error::from)
            .and_then(|()| writeln!(out))
            .and_then(|()| out.flush());
        if let Err(e) = written {
            debug!("stdout write failed: {e}");
        }
    }
}

impl RecordSink for StdoutSink {
    fn on_record(&mut self, record: DecodedRecord) {
        self.emit(&StreamEvent::Record(record));
    }

    fn on_error(&mut self, message: &str) {
        self.emit(&StreamEvent::Error { message: message.to_owned() });
    }

    fn on_complete(&mut self, status: &str) {
        self.succeeded = status == "200 OK";
        self.emit(&StreamEvent::Complete { status: status.to_owned() });
    }
}
