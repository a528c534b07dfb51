//! catalog-browser — cover resolution and description handling for
//! OPDS-style catalog feeds.
//!
//! * **`catalog`** — the feed/entry/link model plus the pieces that turn an
//!   entry into something displayable: image link selection, the cover
//!   fetch cache, thumbnail scaling and description abbreviation.
//! * **`source`** — the [`FeedSource`](source::FeedSource) trait and the RSS
//!   implementation that produces [`Feed`](catalog::Feed) values.
//!
//! The terminal browser in `main.rs` is one consumer of this library; any
//! other display layer can drive the same functions.

pub mod catalog;
pub mod source;

pub use catalog::{
    Entry, Feed, FetchError, ImageCache, ImageTransport, Link, RenderedIcon, ABBREV_TEXT_LEN,
    CUSTOM_SITES_ID, MAX_THUMBNAIL_WIDTH,
};
