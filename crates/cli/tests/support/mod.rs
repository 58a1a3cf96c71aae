// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local HTTP server for transport tests.
//!
//! Streamed routes use a channel-backed body, so hyper sends them with
//! chunked transfer encoding; fixed routes send a Content-Length body.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::routing::{any, get};
use axum::Router;
use bytes::Bytes;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Notify};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

pub const TIMEOUT: Duration = Duration::from_secs(5);

/// A running server, shut down on drop.
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    /// Releases the second half of `/gated`.
    pub gate: Arc<Notify>,
}

impl TestServer {
    pub async fn start() -> anyhow::Result<Self> {
        let gate = Arc::new(Notify::new());
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();

        let router = routes(Arc::clone(&gate));
        let sd = shutdown.clone();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).with_graceful_shutdown(sd.cancelled_owned()).await;
        });

        Ok(Self { addr, shutdown, gate })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Body that yields `pieces` one at a time with `delay` in between.
pub fn streamed(pieces: Vec<&'static str>, delay: Duration) -> Body {
    let (tx, rx) = mpsc::channel::<Result<Bytes, std::io::Error>>(8);
    tokio::spawn(async move {
        for piece in pieces {
            if tx.send(Ok(Bytes::from_static(piece.as_bytes()))).await.is_err() {
                return;
            }
            tokio::time::sleep(delay).await;
        }
    });
    Body::from_stream(ReceiverStream::new(rx))
}

fn routes(gate: Arc<Notify>) -> Router {
    Router::new()
        .route("/records", get(records))
        .route("/lines", get(lines))
        .route("/fixed", get(fixed))
        .route("/gated", get(gated))
        .route("/hang", get(hang))
        .route("/unavailable", get(unavailable))
        .route("/echo", any(echo))
        .with_state(gate)
}

/// Three records split mid-record and mid-delimiter, plus a malformed one
/// and an undelimited tail.
async fn records() -> Body {
    streamed(
        vec![
            "\n\ndata: {\"n\":",
            "1}\n",
            "\nevent: update\nid: 7\ndata: {\"n\":2}\n\nnot json",
            "\n\ndata: [3]",
        ],
        Duration::from_millis(20),
    )
}

async fn lines() -> Body {
    streamed(vec!["data: {\"a\":1}\ndata: ", "{\"b\":2}\n"], Duration::from_millis(10))
}

async fn fixed() -> &'static str {
    "data: [1]\n\ndata: [2]"
}

async fn gated(State(gate): State<Arc<Notify>>) -> Body {
    let (tx, rx) = mpsc::channel::<Result<Bytes, std::io::Error>>(2);
    tokio::spawn(async move {
        let _ = tx.send(Ok(Bytes::from_static(b"data: {\"n\":1}\n\ndata: {\"n\""))).await;
        gate.notified().await;
        let _ = tx.send(Ok(Bytes::from_static(b":2}"))).await;
    });
    Body::from_stream(ReceiverStream::new(rx))
}

/// Sends one record and then never finishes.
async fn hang() -> Body {
    let (tx, rx) = mpsc::channel::<Result<Bytes, std::io::Error>>(2);
    tokio::spawn(async move {
        let _ = tx.send(Ok(Bytes::from_static(b"data: {\"first\":true}\n\n"))).await;
        tokio::time::sleep(Duration::from_secs(60)).await;
        drop(tx);
    });
    Body::from_stream(ReceiverStream::new(rx))
}

async fn unavailable() -> (StatusCode, &'static str) {
    (StatusCode::SERVICE_UNAVAILABLE, "data: {\"ignored\":true}")
}

/// Reflects the request back as a single record.
async fn echo(method: Method, headers: HeaderMap, body: String) -> String {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_owned);
    let record = serde_json::json!({
        "method": method.as_str(),
        "content_type": header("content-type"),
        "trace": header("x-trace"),
        "body": body,
    });
    format!("data: {record}\n\n")
}
