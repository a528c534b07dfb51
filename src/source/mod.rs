//! Feed source abstraction layer.
//!
//! This module defines the [`FeedSource`] trait. Concrete implementations
//! live in sub-modules (currently only [`rss`]) and convert their native
//! format into a [`Feed`].
//!
//! ## For contributors — adding a new source
//!
//! 1. Create a new file in this directory (e.g. `atom.rs`).
//! 2. Define a struct (e.g. `AtomSource`) and implement [`FeedSource`] for it.
//! 3. Add `mod atom;` below and re-export your struct in the `pub use` block.
//! 4. Construct it in `main.rs` in place of (or next to) the RSS source.
//!
//! The poller, cover cache and UI only ever see [`Feed`] values.

mod rss;

pub use self::rss::RssSource;

use anyhow::Result;

use crate::catalog::Feed;

/// Trait that every feed source must implement.
///
/// The poller calls [`fetch()`](FeedSource::fetch) on a background thread,
/// so implementations must be [`Send`].
pub trait FeedSource: Send {
    /// Human-readable label shown in the status bar.
    fn name(&self) -> &str;

    /// Location of the feed. Relative image links are resolved against it
    /// unless the user configured a different base.
    fn location(&self) -> &str;

    /// Fetch and parse the current state of the feed.
    fn fetch(&self) -> Result<Feed>;
}
