//! Source loading.
//!
//! A [`SourceLoader`] turns a URL into raw bytes. [`DefaultLoader`] handles
//! `data:` URLs, `file://` URLs and plain paths, and `http(s)://` when the
//! `network` feature is enabled. [`MemoryLoader`] serves registered bytes
//! and is mostly useful in tests.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::RwLock;

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::error::{SvgError, SvgResult};

/// Boxed future type for loader operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Fetches the bytes behind a URL.
pub trait SourceLoader {
    /// Fetch `url` and return its contents.
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, SvgResult<Vec<u8>>>;
}

/// How a URL string is resolved.
#[derive(Debug, Clone, PartialEq)]
enum SourceKind {
    Data,
    File(PathBuf),
    Http,
    Path(PathBuf),
}

fn classify(url: &str) -> SvgResult<SourceKind> {
    if url.starts_with("data:") {
        return Ok(SourceKind::Data);
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        return Ok(SourceKind::Http);
    }
    if url.starts_with("file:") {
        let parsed = url::Url::parse(url).map_err(|e| SvgError::Load(format!("{}: {}", url, e)))?;
        let path = parsed
            .to_file_path()
            .map_err(|_| SvgError::Load(format!("Not a local file URL: {}", url)))?;
        return Ok(SourceKind::File(path));
    }
    if url.is_empty() {
        return Err(SvgError::Load("Empty URL".to_string()));
    }
    Ok(SourceKind::Path(PathBuf::from(url)))
}

/// Decode a `data:[<mediatype>][;base64],<payload>` URL.
pub fn decode_data_url(url: &str) -> SvgResult<Vec<u8>> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| SvgError::Load("Not a data URL".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| SvgError::Load("Malformed data URL: missing ','".to_string()))?;

    if header.ends_with(";base64") {
        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        STANDARD
            .decode(compact)
            .map_err(|e| SvgError::Load(format!("Invalid base64 payload: {}", e)))
    } else {
        Ok(urlencoding::decode_binary(payload.as_bytes()).into_owned())
    }
}

/// Loader for local and inline sources, plus HTTP with the `network` feature.
///
/// HTTP fetches go through reqwest and must be driven from a tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLoader;

impl DefaultLoader {
    pub fn new() -> Self {
        Self
    }
}

impl SourceLoader for DefaultLoader {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, SvgResult<Vec<u8>>> {
        Box::pin(async move {
            let bytes = match classify(url)? {
                SourceKind::Data => decode_data_url(url)?,
                SourceKind::File(path) | SourceKind::Path(path) => std::fs::read(&path)?,
                SourceKind::Http => fetch_http(url).await?,
            };
            log::debug!("Fetched {} bytes from {}", bytes.len(), preview(url));
            Ok(bytes)
        })
    }
}

#[cfg(feature = "network")]
async fn fetch_http(url: &str) -> SvgResult<Vec<u8>> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| SvgError::Network(e.to_string()))?;
    if !response.status().is_success() {
        return Err(SvgError::Network(format!(
            "HTTP error {} for {}",
            response.status(),
            url
        )));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| SvgError::Network(e.to_string()))?;
    Ok(bytes.to_vec())
}

#[cfg(not(feature = "network"))]
async fn fetch_http(url: &str) -> SvgResult<Vec<u8>> {
    Err(SvgError::Network(format!(
        "HTTP loading requires the `network` feature: {}",
        url
    )))
}

/// Data URLs can be huge; keep log lines short.
fn preview(url: &str) -> &str {
    match url.char_indices().nth(64) {
        Some((idx, _)) => &url[..idx],
        None => url,
    }
}

/// In-memory loader keyed by exact URL.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    sources: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the bytes served for `url`.
    pub fn insert(&self, url: impl Into<String>, data: impl Into<Vec<u8>>) -> SvgResult<()> {
        let mut sources = self
            .sources
            .write()
            .map_err(|e| SvgError::Load(format!("Lock error: {}", e)))?;
        sources.insert(url.into(), data.into());
        Ok(())
    }

    /// Stop serving `url`.
    pub fn remove(&self, url: &str) -> SvgResult<bool> {
        let mut sources = self
            .sources
            .write()
            .map_err(|e| SvgError::Load(format!("Lock error: {}", e)))?;
        Ok(sources.remove(url).is_some())
    }
}

impl SourceLoader for MemoryLoader {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, SvgResult<Vec<u8>>> {
        Box::pin(async move {
            let sources = self
                .sources
                .read()
                .map_err(|e| SvgError::Load(format!("Lock error: {}", e)))?;
            sources
                .get(url)
                .cloned()
                .ok_or_else(|| SvgError::Load(format!("No source registered for {}", url)))
        })
    }
}
