// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::framer::DEFAULT_DELIMITER;

/// Per-stream options shared by the framer and the transport.
///
/// Only `delimiter` affects framing; the rest shape the HTTP request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamOptions {
    pub delimiter: String,
    pub timeout_ms: Option<u64>,
    pub headers: IndexMap<String, String>,
    pub method: String,
    pub data: Option<String>,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_owned(),
            timeout_ms: None,
            headers: IndexMap::new(),
            method: "GET".to_owned(),
            data: None,
        }
    }
}

impl StreamOptions {
    /// Load options from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let options = serde_json::from_str(&contents)?;
        Ok(options)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Request method, upper-cased. An empty method means `GET`.
    pub fn method(&self) -> anyhow::Result<reqwest::Method> {
        let method = self.method.trim().to_uppercase();
        if method.is_empty() {
            return Ok(reqwest::Method::GET);
        }
        reqwest::Method::from_bytes(method.as_bytes())
            .map_err(|_| anyhow::anyhow!("invalid method: {}", self.method))
    }

    /// Case-insensitive header lookup.
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.keys().any(|k| k.eq_ignore_ascii_case(name))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.delimiter.is_empty() {
            anyhow::bail!("delimiter must not be empty");
        }
        self.method()?;
        if let Some(name) = self.headers.keys().find(|k| k.trim().is_empty()) {
            anyhow::bail!("invalid header name: {name:?}");
        }
        Ok(())
    }
}

/// Stream newline-delimited JSON records from an HTTP endpoint.
#[derive(Debug, Parser)]
#[command(name = "jsonpipe", version, about)]
pub struct Config {
    /// URL to stream from.
    #[arg(env = "JSONPIPE_URL")]
    pub url: String,

    /// Record delimiter. Backslash escapes (\n, \r, \t, \\) are interpreted.
    #[arg(long, env = "JSONPIPE_DELIMITER")]
    pub delimiter: Option<String>,

    /// HTTP method.
    #[arg(short = 'X', long, env = "JSONPIPE_METHOD")]
    pub method: Option<String>,

    /// Request header as "Name: Value". Repeatable.
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Request body.
    #[arg(short = 'd', long, env = "JSONPIPE_DATA")]
    pub data: Option<String>,

    /// Abort the request after this many milliseconds.
    #[arg(long, env = "JSONPIPE_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// JSON file with base stream options. Flags override its fields.
    #[arg(long, env = "JSONPIPE_OPTIONS")]
    pub options: Option<PathBuf>,

    /// Log format (json or text).
    #[arg(long, env = "JSONPIPE_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "JSONPIPE_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,
}

impl Config {
    /// Validate the configuration after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        reqwest::Url::parse(&self.url)
            .map_err(|e| anyhow::anyhow!("invalid url {:?}: {e}", self.url))?;

        match self.log_format.as_str() {
            "json" | "text" => {}
            other => anyhow::bail!("invalid log format: {other}"),
        }

        self.stream_options()?.validate()
    }

    /// Merge the options file (if any) with the explicit flags.
    pub fn stream_options(&self) -> anyhow::Result<StreamOptions> {
        let mut options = match self.options {
            Some(ref path) => StreamOptions::from_file(path)
                .map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))?,
            None => StreamOptions::default(),
        };

        if let Some(ref delimiter) = self.delimiter {
            options.delimiter = unescape(delimiter);
        }
        if let Some(ref method) = self.method {
            options.method = method.clone();
        }
        for raw in &self.headers {
            let (name, value) = parse_header(raw)?;
            options.headers.insert(name, value);
        }
        if self.data.is_some() {
            options.data = self.data.clone();
        }
        if self.timeout_ms.is_some() {
            options.timeout_ms = self.timeout_ms;
        }

        Ok(options)
    }
}

/// Parse `Name: Value` into its parts.
pub fn parse_header(raw: &str) -> anyhow::Result<(String, String)> {
    let (name, value) =
        raw.split_once(':').ok_or_else(|| anyhow::anyhow!("invalid header (expected Name: Value): {raw}"))?;
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("invalid header (empty name): {raw}");
    }
    Ok((name.to_owned(), value.trim().to_owned()))
}

/// Interpret `\n`, `\r`, `\t` and `\\`. Other backslashes are kept as-is.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
