//! Catalog entries and their cover images.
//!
//! The flow for showing one entry is:
//!
//! 1. [`select_image_link`] picks the thumbnail or the full-size image
//!    depending on the shape of the feed.
//! 2. [`resolve_image_bytes`] downloads that link through an
//!    [`ImageTransport`], memoising the payload in an [`ImageCache`] keyed by
//!    the resolved URL.
//! 3. [`render_icon`] decodes the payload and scales it down to thumbnail
//!    width, or yields [`RenderedIcon::Fallback`].
//! 4. [`select_description`] produces the plain-text blurb.
//!
//! Everything here is synchronous. Callers that need the network work off
//! their UI thread move it there themselves (see the browser's poller).

mod description;
mod fetch;
mod link;
mod model;
mod thumbnail;

pub use description::{abbreviate_text, select_description, HtmlRenderer, PlainTextRenderer};
pub use fetch::{
    fetch_image_bytes, resolve_image_bytes, resolve_url, FetchError, HttpTransport, ImageCache,
    ImageTransport, TransportError, USER_AGENT,
};
pub use link::{is_leaf, select_image_link, ImagePreference};
pub use model::{Content, Entry, Feed, Link};
pub use thumbnail::{
    compute_thumbnail_height, render_icon, thumbnail_dimensions, unknown_cover, InvalidInput,
    RenderedIcon, DECODE_ALLOC_LIMIT, UNKNOWN_COVER_HEIGHT,
};

/// Reserved feed id of the synthetic feed listing user-added catalog sites.
///
/// That feed is never treated as a leaf, even with a single entry.
pub const CUSTOM_SITES_ID: &str = "IdCustomSites";

/// Width in pixels that list thumbnails are scaled down to.
pub const MAX_THUMBNAIL_WIDTH: u32 = 85;

/// Number of characters kept when a description is abbreviated.
pub const ABBREV_TEXT_LEN: usize = 150;
