//! Downloading cover images, memoised by resolved URL.
//!
//! [`resolve_image_bytes`] is the entry point: it resolves a [`Link`]'s href
//! against the catalog's base URL, serves the payload from the caller's
//! [`ImageCache`] when possible and otherwise performs one blocking GET
//! through an [`ImageTransport`].
//!
//! The cache is an ordinary value owned by the caller. Nothing here is global
//! and nothing is synchronised; share a cache between threads by wrapping it
//! yourself.

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info, trace};
use url::Url;

use super::model::Link;

/// Failure inside a transport while performing a GET.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed")]
    Request(#[from] reqwest::Error),

    #[error("server answered HTTP {status}")]
    Status { status: u16 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure to obtain image bytes for a link.
///
/// The cache and the link are left untouched whenever this is returned.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("cannot resolve image href {href:?} against base {base:?}")]
    InvalidUrl {
        href: String,
        base: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to download image {url}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },
}

impl FetchError {
    /// The URL (or unresolvable href) the failed fetch was aimed at.
    pub fn url(&self) -> &str {
        match self {
            Self::InvalidUrl { href, .. } => href,
            Self::Transport { url, .. } => url,
        }
    }
}

/// `User-Agent` sent with feed and cover requests.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A blocking HTTP client able to GET a URL and read the full body.
///
/// Timeouts are the transport's business; the fetch code never retries.
pub trait ImageTransport {
    fn get(&self, url: &Url) -> Result<Bytes, TransportError>;
}

/// [`ImageTransport`] backed by a blocking [`reqwest`] client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Build a transport whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self::with_client(client))
    }

    /// Reuse an existing client, e.g. the one that fetches the feed.
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl ImageTransport for HttpTransport {
    fn get(&self, url: &Url) -> Result<Bytes, TransportError> {
        let response = self.client.get(url.as_str()).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.bytes()?)
    }
}

/// In-memory map from resolved image URL to downloaded bytes.
///
/// Grows without bound for as long as the owner keeps it.
#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    entries: HashMap<String, Bytes>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<&Bytes> {
        self.entries.get(url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    pub fn insert(&mut self, url: impl Into<String>, bytes: Bytes) {
        self.entries.insert(url.into(), bytes);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all cached payload sizes.
    pub fn total_bytes(&self) -> usize {
        self.entries.values().map(Bytes::len).sum()
    }
}

/// Resolve `href` against `base_url`.
///
/// Absolute hrefs are returned as-is (normalised), so an unparsable base only
/// matters for relative references.
pub fn resolve_url(href: &str, base_url: &str) -> Result<Url, FetchError> {
    let invalid = |source: url::ParseError| FetchError::InvalidUrl {
        href: href.to_owned(),
        base: base_url.to_owned(),
        source,
    };

    match Url::parse(href) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(base_url)
            .and_then(|base| base.join(href))
            .map_err(invalid),
        Err(e) => Err(invalid(e)),
    }
}

/// Return the bytes behind `href`, downloading them at most once per resolved
/// URL for the lifetime of `cache`.
pub fn fetch_image_bytes<T>(
    href: &str,
    cache: &mut ImageCache,
    transport: &T,
    base_url: &str,
) -> Result<Bytes, FetchError>
where
    T: ImageTransport + ?Sized,
{
    let url = resolve_url(href, base_url)?;

    if let Some(bytes) = cache.get(url.as_str()) {
        trace!(url = %url, "Image cache hit");
        return Ok(bytes.clone());
    }

    info!(url = %url, "Downloading image");
    let bytes = transport.get(&url).map_err(|source| FetchError::Transport {
        url: url.to_string(),
        source,
    })?;

    debug!(url = %url, size = bytes.len(), "Stored image in cache");
    cache.insert(url.as_str(), bytes.clone());
    Ok(bytes)
}

/// Fill `link` with its image bytes and return them.
///
/// `None` in gives `Ok(None)` out without touching the cache or network. On
/// error neither `link` nor `cache` is modified.
pub fn resolve_image_bytes<T>(
    link: Option<&mut Link>,
    cache: &mut ImageCache,
    transport: &T,
    base_url: &str,
) -> Result<Option<Bytes>, FetchError>
where
    T: ImageTransport + ?Sized,
{
    let Some(link) = link else {
        return Ok(None);
    };

    let bytes = fetch_image_bytes(&link.href, cache, transport, base_url)?;
    link.bin_data = Some(bytes.clone());
    Ok(Some(bytes))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
