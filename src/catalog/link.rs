//! Choosing which cover image an entry should show.

use super::model::{Entry, Feed, Link};
use super::CUSTOM_SITES_ID;

/// Which of an entry's two image links to try first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagePreference {
    /// Full-size image first, thumbnail as fallback. Used for leaf feeds.
    FullImage,
    /// Thumbnail first, full-size image as fallback. Used for listings.
    Thumbnail,
}

impl ImagePreference {
    pub fn for_feed(feed: &Feed) -> Self {
        if is_leaf(feed) {
            Self::FullImage
        } else {
            Self::Thumbnail
        }
    }
}

/// A feed is a leaf when it holds exactly one entry and is not the custom
/// sites feed.
pub fn is_leaf(feed: &Feed) -> bool {
    feed.entry_count() == 1 && feed.id.as_deref() != Some(CUSTOM_SITES_ID)
}

/// Pick the image link to display for `entry` within `feed`.
///
/// Leaf feeds show a single detailed item and prefer the full-size image;
/// every other feed prefers the thumbnail. Returns `None` only when the entry
/// has neither link.
pub fn select_image_link<'a>(feed: &Feed, entry: &'a Entry) -> Option<&'a Link> {
    entry.image_link_for(ImagePreference::for_feed(feed))
}
