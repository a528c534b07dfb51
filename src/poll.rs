//! Background feed and cover loading.
//!
//! Runs on a dedicated thread, periodically fetching the catalog feed and the
//! cover of every entry, and sends results to the UI thread over an
//! [`mpsc`] channel.
//!
//! ## For contributors
//!
//! The worker thread owns the [`ImageCache`], so the cache needs no locking
//! and lives as long as the thread. Covers are fetched one after another in
//! feed order; a refresh only downloads covers whose resolved URL has not
//! been seen before.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use catalog_browser::catalog::{
    resolve_image_bytes, Feed, ImageCache, ImagePreference, ImageTransport,
};
use catalog_browser::source::FeedSource;

use crate::app::CoverState;

/// Messages sent from the worker thread to the UI thread.
#[derive(Debug)]
pub enum PollMsg {
    /// A fresh copy of the feed. Cover messages that follow refer to it.
    Feed(Feed),
    /// The cover of the entry at `index` finished loading.
    Cover { index: usize, cover: CoverState },
    /// Fetching the feed failed with this error description.
    Error(String),
}

/// Everything the worker needs, moved onto its thread.
pub struct Poller {
    pub source: Box<dyn FeedSource>,
    pub transport: Box<dyn ImageTransport + Send>,
    /// Base for resolving relative cover links.
    pub base_url: String,
    /// How often the feed is re-fetched.
    pub interval: Duration,
}

impl Poller {
    /// Spawn the background thread.
    ///
    /// Returns a receiver that the main loop should drain on every tick.
    /// The thread stops once the receiver is dropped.
    pub fn spawn(self) -> mpsc::Receiver<PollMsg> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let mut cache = ImageCache::new();
            while self.poll_once(&mut cache, &tx) {
                thread::sleep(self.interval);
            }
        });

        rx
    }

    /// Fetch the feed and all covers once. Returns `false` when the receiver
    /// is gone and polling should stop.
    fn poll_once(&self, cache: &mut ImageCache, tx: &mpsc::Sender<PollMsg>) -> bool {
        let mut feed = match self.source.fetch() {
            Ok(feed) => feed,
            Err(e) => {
                warn!(source = self.source.name(), error = %e, "Feed fetch failed");
                return tx
                    .send(PollMsg::Error(format!("{}: {e:#}", self.source.name())))
                    .is_ok();
            }
        };

        info!(
            source = self.source.name(),
            entries = feed.entry_count(),
            leaf = feed.is_leaf(),
            "Fetched feed"
        );

        let preference = ImagePreference::for_feed(&feed);
        if tx.send(PollMsg::Feed(feed.clone())).is_err() {
            return false;
        }

        for (index, entry) in feed.entries.iter_mut().enumerate() {
            let link = entry.image_link_for_mut(preference);
            if link.is_none() {
                continue;
            }

            let result = resolve_image_bytes(link, cache, self.transport.as_ref(), &self.base_url);
            let cover = match result {
                Ok(payload) => CoverState::from_payload(payload.as_deref()),
                Err(e) => {
                    warn!(index, url = e.url(), error = %e, "Cover download failed");
                    CoverState::Failed(format!("{:#}", anyhow::Error::from(e)))
                }
            };

            if tx.send(PollMsg::Cover { index, cover }).is_err() {
                return false;
            }
        }

        info!(cached = cache.len(), bytes = cache.total_bytes(), "Cover pass complete");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use bytes::Bytes;
    use catalog_browser::catalog::{Entry, TransportError};
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use url::Url;

    const BASE: &str = "https://books.example.org/catalog/";

    struct StaticSource(Option<Feed>);

    impl FeedSource for StaticSource {
        fn name(&self) -> &str {
            "static"
        }

        fn location(&self) -> &str {
            BASE
        }

        fn fetch(&self) -> Result<Feed> {
            self.0.clone().ok_or_else(|| anyhow!("offline"))
        }
    }

    struct CountingTransport {
        bodies: HashMap<String, Bytes>,
        calls: Arc<AtomicUsize>,
    }

    impl ImageTransport for CountingTransport {
        fn get(&self, url: &Url) -> Result<Bytes, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.bodies
                .get(url.as_str())
                .cloned()
                .ok_or(TransportError::Status { status: 404 })
        }
    }

    fn png(width: u32, height: u32) -> Bytes {
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        Bytes::from(buf)
    }

    fn poller(feed: Option<Feed>, calls: Arc<AtomicUsize>) -> Poller {
        let mut bodies = HashMap::new();
        bodies.insert(format!("{BASE}covers/a.png"), png(170, 340));
        bodies.insert(format!("{BASE}covers/b.png"), Bytes::from_static(b"not an image"));
        Poller {
            source: Box::new(StaticSource(feed)),
            transport: Box::new(CountingTransport { bodies, calls }),
            base_url: BASE.into(),
            interval: Duration::from_secs(60),
        }
    }

    fn listing() -> Feed {
        Feed::new(
            None,
            vec![
                Entry::new("A").with_thumbnail("covers/a.png"),
                Entry::new("B").with_thumbnail("covers/b.png"),
                Entry::new("C").with_thumbnail("covers/missing.png"),
                Entry::new("D"),
            ],
        )
    }

    #[test]
    fn poll_once_sends_feed_then_covers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let poller = poller(Some(listing()), calls.clone());
        let (tx, rx) = mpsc::channel();
        let mut cache = ImageCache::new();

        assert!(poller.poll_once(&mut cache, &tx));
        drop(tx);
        let msgs: Vec<PollMsg> = rx.iter().collect();

        assert!(matches!(&msgs[0], PollMsg::Feed(feed) if feed.entry_count() == 4));
        let covers: Vec<(usize, CoverState)> = msgs
            .into_iter()
            .filter_map(|m| match m {
                PollMsg::Cover { index, cover } => Some((index, cover)),
                _ => None,
            })
            .collect();

        assert_eq!(covers.len(), 3, "entry without links gets no cover message");
        assert!(matches!(
            covers[0],
            (0, CoverState::Loaded { thumbnail: (85, 170), full: (170, 340), .. })
        ));
        assert_eq!(covers[1], (1, CoverState::Unknown));
        assert!(matches!(&covers[2], (2, CoverState::Failed(msg)) if msg.contains("404")));
        assert_eq!(cache.len(), 2, "failed downloads are not cached");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn refresh_reuses_cached_covers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let poller = poller(Some(listing()), calls.clone());
        let (tx, _rx) = mpsc::channel();
        let mut cache = ImageCache::new();

        assert!(poller.poll_once(&mut cache, &tx));
        assert!(poller.poll_once(&mut cache, &tx));

        // a.png and b.png once each, missing.png on both passes.
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn feed_error_is_reported() {
        let poller = poller(None, Arc::new(AtomicUsize::new(0)));
        let (tx, rx) = mpsc::channel();

        assert!(poller.poll_once(&mut ImageCache::new(), &tx));
        match rx.try_recv() {
            Ok(PollMsg::Error(msg)) => assert_eq!(msg, "static: offline"),
            other => panic!("expected error message, got {other:?}"),
        }
    }

    #[test]
    fn stops_when_receiver_is_dropped() {
        let poller = poller(Some(listing()), Arc::new(AtomicUsize::new(0)));
        let (tx, rx) = mpsc::channel();
        drop(rx);

        assert!(!poller.poll_once(&mut ImageCache::new(), &tx));
    }
}
