//! The catalog data model shared by every feed source.
//!
//! A [`Feed`] is an ordered list of [`Entry`] values. Each entry may carry a
//! full-size image link and a thumbnail link; both are plain [`Link`]s whose
//! payload starts out empty and is filled in by
//! [`resolve_image_bytes`](super::resolve_image_bytes).
//!
//! ## For contributors
//!
//! Feed sources construct these types directly. If your source has no notion
//! of a thumbnail, leave `thumbnail_link` as `None`; link selection falls back
//! to whichever link is present.

use bytes::Bytes;
use chrono::{DateTime, Utc};

use super::link::ImagePreference;

/// A reference to a remote resource, plus its downloaded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// The reference as it appeared in the feed. May be relative.
    pub href: String,

    /// Downloaded bytes, `None` until the link has been fetched.
    pub bin_data: Option<Bytes>,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            bin_data: None,
        }
    }

    /// The downloaded payload, if any.
    pub fn bin_data(&self) -> Option<&[u8]> {
        self.bin_data.as_deref()
    }
}

/// Full entry content. Takes precedence over the summary when both exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub text: String,
}

/// A single catalog entry (a book, or a navigation item leading to a
/// sub-catalog).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    /// Stable identifier when the source provides one.
    pub id: Option<String>,

    /// Human-readable headline.
    pub title: String,

    /// Last modification time. `None` when the source had no usable date.
    pub updated: Option<DateTime<Utc>>,

    /// Full content, usually HTML.
    pub content: Option<Content>,

    /// Short summary, usually HTML.
    pub summary: Option<String>,

    /// Link to the full-size cover.
    pub image_link: Option<Link>,

    /// Link to a cover sized for listings.
    pub thumbnail_link: Option<Link>,
}

impl Entry {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_image(mut self, href: impl Into<String>) -> Self {
        self.image_link = Some(Link::new(href));
        self
    }

    pub fn with_thumbnail(mut self, href: impl Into<String>) -> Self {
        self.thumbnail_link = Some(Link::new(href));
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_content(mut self, text: impl Into<String>) -> Self {
        self.content = Some(Content { text: text.into() });
        self
    }

    /// The first present link in the order given by `preference`.
    pub fn image_link_for(&self, preference: ImagePreference) -> Option<&Link> {
        match preference {
            ImagePreference::FullImage => self.image_link.as_ref().or(self.thumbnail_link.as_ref()),
            ImagePreference::Thumbnail => self.thumbnail_link.as_ref().or(self.image_link.as_ref()),
        }
    }

    /// Mutable counterpart of [`image_link_for`](Self::image_link_for), used
    /// to fill the chosen link's payload in place.
    pub fn image_link_for_mut(&mut self, preference: ImagePreference) -> Option<&mut Link> {
        match preference {
            ImagePreference::FullImage => self.image_link.as_mut().or(self.thumbnail_link.as_mut()),
            ImagePreference::Thumbnail => self.thumbnail_link.as_mut().or(self.image_link.as_mut()),
        }
    }
}

/// An ordered list of entries, as returned by one catalog page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feed {
    /// Feed identifier. [`CUSTOM_SITES_ID`](super::CUSTOM_SITES_ID) marks the
    /// synthetic list of user-added sites.
    pub id: Option<String>,

    /// Feed title, if the source provides one.
    pub title: Option<String>,

    pub entries: Vec<Entry>,
}

impl Feed {
    pub fn new(id: Option<String>, entries: Vec<Entry>) -> Self {
        Self {
            id,
            title: None,
            entries,
        }
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Whether this feed describes a single item. See [`super::is_leaf`].
    pub fn is_leaf(&self) -> bool {
        super::is_leaf(self)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
