//! Fetch boundary — where page content comes from.
//!
//! A [`PageSource`] hands out raw bytes by relative path.  [`fetch_page`]
//! is the only entry point the scroll controller uses; it folds every
//! failure into `None` so "no more content" and "fetch failed" look the
//! same to its caller.

use std::future::Future;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use thiserror::Error;

use super::page::{FetchedPage, PageContent, PageNumber, Section, TitleTable};

pub const TITLES_PATH: &str = "page-titles.json";
pub const SECTIONS_PATH: &str = "sections.json";

/// Relative path of a page's content file.
pub fn page_path(n: PageNumber) -> String {
    format!("pages/{n}.json")
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("requesting {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("decoding {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Anything that can serve document files by relative path.
pub trait PageSource: Clone + Send + Sync + 'static {
    fn get(&self, path: &str) -> impl Future<Output = Result<Vec<u8>, SourceError>> + Send;
}

// ───────────────────────────────────────── directory ─────────

/// Document stored in a local directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl PageSource for DirSource {
    async fn get(&self, path: &str) -> Result<Vec<u8>, SourceError> {
        let full = self.root.join(path);
        tokio::fs::read(&full)
            .await
            .map_err(|source| SourceError::Io { path: full, source })
    }
}

// ───────────────────────────────────────── http ──────────────

/// Document served over HTTP under a base URL.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base: String,
}

impl HttpSource {
    pub fn new(base: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
        }
    }
}

impl PageSource for HttpSource {
    async fn get(&self, path: &str) -> Result<Vec<u8>, SourceError> {
        let url = format!("{}/{}", self.base, path);
        let fail = |source| SourceError::Http {
            url: url.clone(),
            source,
        };
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(fail)?;
        let bytes = response.bytes().await.map_err(fail)?;
        Ok(bytes.to_vec())
    }
}

// ───────────────────────────────────────── either ────────────

/// Source picked from the command line.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    Dir(DirSource),
    Http(HttpSource),
}

impl DocumentSource {
    /// `http://` and `https://` locations are fetched over the network;
    /// anything else is a directory.
    pub fn from_location(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Http(HttpSource::new(location))
        } else {
            Self::Dir(DirSource::new(location))
        }
    }
}

impl PageSource for DocumentSource {
    async fn get(&self, path: &str) -> Result<Vec<u8>, SourceError> {
        match self {
            Self::Dir(dir) => dir.get(path).await,
            Self::Http(http) => http.get(path).await,
        }
    }
}

// ───────────────────────────────────────── loaders ───────────

async fn get_json<S: PageSource, T: DeserializeOwned>(
    source: &S,
    path: &str,
) -> Result<T, SourceError> {
    let bytes = source.get(path).await?;
    serde_json::from_slice(&bytes).map_err(|source| SourceError::Decode {
        path: path.to_string(),
        source,
    })
}

/// Fetch page `n`.  Pages at or below zero resolve to `None` without
/// touching the source; failures are logged and also resolve to `None`.
pub async fn fetch_page<S: PageSource>(source: &S, n: PageNumber) -> Option<FetchedPage> {
    if n <= 0 {
        return None;
    }
    match get_json::<S, PageContent>(source, &page_path(n)).await {
        Ok(content) if content.is_empty() => {
            tracing::debug!(page = n, "page has no lines");
            None
        }
        Ok(content) => Some(FetchedPage { key: n, content }),
        Err(e) => {
            tracing::error!(page = n, "fetch failed: {e}");
            None
        }
    }
}

pub async fn load_titles<S: PageSource>(source: &S) -> Result<TitleTable, SourceError> {
    get_json(source, TITLES_PATH).await
}

pub async fn load_sections<S: PageSource>(source: &S) -> Result<Vec<Section>, SourceError> {
    get_json(source, SECTIONS_PATH).await
}
