//! RSS feed source implementation.
//!
//! Catalog sites that publish RSS instead of OPDS usually attach covers
//! through Media RSS (`media:content`, `media:thumbnail`) or a plain image
//! `<enclosure>`. This module maps those onto the image and thumbnail links
//! of an [`Entry`].
//!
//! ## For contributors — adding a new source type
//!
//! Use this file as a template: keep the network call in `fetch()` and the
//! conversion in a pure function so tests can exercise it without I/O.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rss::extension::Extension;
use tracing::debug;

use super::FeedSource;
use crate::catalog::{Content, Entry, Feed, Link};

/// An RSS feed data source.
///
/// Fetches and parses an RSS 2.0 feed over HTTP using the [`rss`] crate.
pub struct RssSource {
    /// The feed URL to fetch.
    pub url: String,
    /// A human-readable label shown in the UI.
    pub label: String,
    client: reqwest::blocking::Client,
}

impl RssSource {
    /// Create a new RSS source using `client` for requests.
    ///
    /// # Arguments
    ///
    /// * `url` — full URL of the RSS feed.
    /// * `label` — short name displayed in the status bar.
    /// * `client` — blocking HTTP client, already configured with a timeout.
    pub fn new(
        url: impl Into<String>,
        label: impl Into<String>,
        client: reqwest::blocking::Client,
    ) -> Self {
        Self {
            url: url.into(),
            label: label.into(),
            client,
        }
    }

    /// Convert an already-fetched [`rss::Channel`] into a [`Feed`].
    ///
    /// Pure (no I/O) so the mapping can be tested directly.
    pub fn parse_channel(channel: &rss::Channel) -> Feed {
        let entries = channel
            .items()
            .iter()
            .map(|item| {
                let updated = item
                    .pub_date()
                    .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
                    .map(|dt| dt.with_timezone(&Utc));

                Entry {
                    id: item
                        .guid()
                        .map(|g| g.value().to_string())
                        .or_else(|| item.link().map(String::from)),
                    title: item.title().unwrap_or("(untitled)").to_string(),
                    updated,
                    content: item.content().map(|text| Content {
                        text: text.to_string(),
                    }),
                    summary: item.description().map(String::from),
                    image_link: image_link(item),
                    thumbnail_link: thumbnail_link(item),
                }
            })
            .collect();

        let link = channel.link().trim();
        Feed {
            id: (!link.is_empty()).then(|| link.to_string()),
            title: Some(channel.title().to_string()).filter(|t| !t.is_empty()),
            entries,
        }
    }
}

/// All `media:<name>` extension elements of `item`.
fn media_elements<'a>(item: &'a rss::Item, name: &str) -> impl Iterator<Item = &'a Extension> {
    item.extensions()
        .get("media")
        .and_then(|media| media.get(name))
        .into_iter()
        .flatten()
}

fn is_image_media(ext: &Extension) -> bool {
    let attrs = ext.attrs();
    attrs.get("medium").is_some_and(|m| m == "image")
        || attrs.get("type").is_some_and(|t| t.starts_with("image/"))
}

/// Full-size cover: an image `media:content`, else an image enclosure.
fn image_link(item: &rss::Item) -> Option<Link> {
    media_elements(item, "content")
        .filter(|ext| is_image_media(ext))
        .find_map(|ext| ext.attrs().get("url"))
        .map(|url| Link::new(url.as_str()))
        .or_else(|| {
            item.enclosure()
                .filter(|enclosure| enclosure.mime_type().starts_with("image/"))
                .map(|enclosure| Link::new(enclosure.url()))
        })
}

fn thumbnail_link(item: &rss::Item) -> Option<Link> {
    media_elements(item, "thumbnail")
        .find_map(|ext| ext.attrs().get("url"))
        .map(|url| Link::new(url.as_str()))
}

impl FeedSource for RssSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn location(&self) -> &str {
        &self.url
    }

    fn fetch(&self) -> Result<Feed> {
        debug!(url = %self.url, "Fetching feed");
        let body = self
            .client
            .get(&self.url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .with_context(|| format!("requesting {}", self.url))?
            .bytes()?;
        let channel = rss::Channel::read_from(body.as_ref())
            .with_context(|| format!("parsing {}", self.url))?;
        Ok(Self::parse_channel(&channel))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
