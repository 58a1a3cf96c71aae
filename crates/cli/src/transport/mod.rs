// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP transport: issues the request and feeds the growing response body
//! to a [`SnapshotHandler`].

pub mod body;

use std::sync::Once;

use reqwest::header::{HeaderMap, CONTENT_TYPE, TRANSFER_ENCODING};
use reqwest::{Method, RequestBuilder, StatusCode, Version};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::StreamOptions;
use crate::pipe::{JsonPipe, SnapshotHandler};
use crate::sink::{RecordSink, StreamEvent};

use self::body::SnapshotBuffer;

/// Content type added to `POST` requests that don't set one.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

static CRYPTO_INIT: Once = Once::new();

/// Install the ring crypto provider for reqwest/rustls.
/// Safe to call multiple times — only the first call has effect.
pub fn ensure_crypto() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Whether the response body arrives progressively.
///
/// Chunked (or, for some servers, `identity`) transfer encoding means the
/// body can be parsed as it arrives. HTTP/2 and later stream by nature and
/// carry no transfer-encoding header.
pub fn is_streaming(headers: &HeaderMap, version: Version) -> bool {
    if version >= Version::HTTP_2 {
        return true;
    }
    headers
        .get(TRANSFER_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            let v = v.to_ascii_lowercase();
            v.contains("chunked") || v.contains("identity")
        })
        .unwrap_or(false)
}

enum Outcome {
    Finished(String),
    Failed { message: String, status: String },
}

impl Outcome {
    fn failed(reason: &str) -> Self {
        Self::Failed { message: reason.to_owned(), status: reason.to_owned() }
    }
}

/// HTTP client wrapper that drives one [`SnapshotHandler`] per request.
#[derive(Debug, Clone)]
pub struct Transport {
    client: reqwest::Client,
}

impl Transport {
    pub fn new() -> anyhow::Result<Self> {
        ensure_crypto();
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build the request described by `options`.
    pub fn request(&self, url: &str, options: &StreamOptions) -> anyhow::Result<RequestBuilder> {
        let method = options.method()?;
        let add_form_type = method == Method::POST && !options.has_header(CONTENT_TYPE.as_str());

        let mut req = self.client.request(method, url);
        for (name, value) in &options.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        if add_form_type {
            req = req.header(CONTENT_TYPE, FORM_CONTENT_TYPE);
        }
        if let Some(ref data) = options.data {
            req = req.body(data.clone());
        }
        Ok(req)
    }

    /// Run one request to completion.
    ///
    /// `handler.on_complete` is called exactly once, after the final snapshot
    /// or after `on_transport_error`. The only `Err` is a framing contract
    /// violation reported by the handler, which aborts the stream.
    ///
    /// A non-200 response is reported with the full status line, code
    /// included (`"503 Service Unavailable"`), as both the error message and
    /// the completion status. Its body is not read.
    pub async fn fetch<H>(
        &self,
        url: &str,
        options: &StreamOptions,
        handler: &mut H,
        shutdown: CancellationToken,
    ) -> anyhow::Result<()>
    where
        H: SnapshotHandler + ?Sized,
    {
        let request = self.request(url, options)?;
        info!(url, method = %options.method, "opening stream");

        let timeout = options.timeout();
        let outcome = {
            let exchange = exchange(request, &mut *handler);
            let timer = async move {
                match timeout {
                    Some(after) => tokio::time::sleep(after).await,
                    None => std::future::pending::<()>().await,
                }
            };
            tokio::select! {
                outcome = exchange => outcome?,
                _ = timer => Outcome::failed("timeout"),
                _ = shutdown.cancelled() => Outcome::failed("aborted"),
            }
        };

        match outcome {
            Outcome::Finished(status) => {
                debug!(url, %status, "stream complete");
                handler.on_complete(&status);
            }
            Outcome::Failed { message, status } => {
                handler.on_transport_error(&message);
                handler.on_complete(&status);
            }
        }
        Ok(())
    }
}

async fn exchange<H>(request: RequestBuilder, handler: &mut H) -> anyhow::Result<Outcome>
where
    H: SnapshotHandler + ?Sized,
{
    let mut response = match request.send().await {
        Ok(response) => response,
        Err(e) => return Ok(Outcome::Failed { message: e.to_string(), status: String::new() }),
    };

    let status = response.status().to_string();
    if response.status() != StatusCode::OK {
        return Ok(Outcome::Failed { message: status.clone(), status });
    }

    let progressive = is_streaming(response.headers(), response.version());
    debug!(%status, progressive, "response headers received");

    let mut body = SnapshotBuffer::new();
    let mut delivered = 0;
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                body.push(&chunk);
                let text = body.text();
                if progressive && text.len() > delivered {
                    handler.on_snapshot(text, false)?;
                    delivered = text.len();
                }
            }
            Ok(None) => break,
            Err(e) => return Ok(Outcome::Failed { message: e.to_string(), status }),
        }
    }

    handler.on_snapshot(body.finish(), true)?;
    Ok(Outcome::Finished(status))
}

/// Stream `url` into `sink` and hand the sink back when the stream is over.
pub async fn flow<S>(
    url: &str,
    options: &StreamOptions,
    sink: S,
    shutdown: CancellationToken,
) -> anyhow::Result<S>
where
    S: RecordSink,
{
    options.validate()?;
    let transport = Transport::new()?;
    let mut pipe = JsonPipe::from_options(options, sink)?;
    transport.fetch(url, options, &mut pipe, shutdown).await?;
    Ok(pipe.into_sink())
}

/// A stream running on its own task.
pub struct FlowHandle {
    pub events: mpsc::UnboundedReceiver<StreamEvent>,
    pub cancel: CancellationToken,
    pub task: JoinHandle<anyhow::Result<()>>,
}

impl FlowHandle {
    /// Abort the request. The stream still reports `aborted` and completes.
    pub fn abort(&self) {
        self.cancel.cancel();
    }

    /// Wait for the stream to finish and return every event it produced.
    pub async fn collect(mut self) -> anyhow::Result<Vec<StreamEvent>> {
        let mut events = Vec::new();
        while let Some(event) = self.events.recv().await {
            events.push(event);
        }
        self.task.await??;
        Ok(events)
    }
}

/// Spawn [`flow`] on the current tokio runtime, delivering events over a
/// channel.
pub fn spawn_flow(url: impl Into<String>, options: StreamOptions) -> FlowHandle {
    let (event_tx, events) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    let url = url.into();
    let task = tokio::spawn(async move {
        flow(&url, &options, event_tx, shutdown).await?;
        Ok(())
    });
    FlowHandle { events, cancel, task }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
