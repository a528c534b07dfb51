use chrono::{DateTime, Utc};
use ratatui::widgets::ListState;

use catalog_browser::catalog::{
    render_icon, select_description, thumbnail_dimensions, Feed, ImagePreference,
    PlainTextRenderer, RenderedIcon,
};

/// How many entries PageUp / PageDown move the selection.
const PAGE_SIZE: usize = 10;

/// What the UI knows about one entry's cover image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverState {
    /// Download not finished yet.
    Pending,
    /// The entry carries no image links.
    Absent,
    /// Downloaded and decoded.
    Loaded {
        /// Size of the list thumbnail.
        thumbnail: (u32, u32),
        /// Size of the unscaled cover.
        full: (u32, u32),
        /// Payload size in bytes.
        size: usize,
    },
    /// Downloaded but undecodable; the unknown cover stands in.
    Unknown,
    /// Download failed with this message.
    Failed(String),
}

impl CoverState {
    /// Decode a downloaded payload into the state shown by the UI.
    ///
    /// The payload is decoded once, unscaled; the thumbnail size is computed
    /// rather than rendered.
    pub fn from_payload(payload: Option<&[u8]>) -> Self {
        let Some(bytes) = payload else {
            return Self::Absent;
        };

        let full = match render_icon(Some(bytes), false) {
            RenderedIcon::Decoded(image) => (image.width(), image.height()),
            RenderedIcon::Fallback => return Self::Unknown,
        };

        Self::Loaded {
            thumbnail: thumbnail_dimensions(full.0, full.1),
            full,
            size: bytes.len(),
        }
    }

    /// One-line description for the detail pane.
    pub fn label(&self) -> String {
        match self {
            Self::Pending => "cover: loading…".into(),
            Self::Absent => format!("cover: none ({})", placeholder()),
            Self::Loaded {
                thumbnail,
                full,
                size,
            } => format!(
                "cover: {}x{} (thumbnail {}x{}), {} KiB",
                full.0,
                full.1,
                thumbnail.0,
                thumbnail.1,
                size.div_ceil(1024)
            ),
            Self::Unknown => format!("cover: unreadable ({})", placeholder()),
            Self::Failed(e) => format!("cover: download failed: {e}"),
        }
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

fn placeholder() -> String {
    let (width, height) = RenderedIcon::Fallback.dimensions();
    format!("unknown cover {width}x{height}")
}

/// Display-ready form of one catalog entry.
#[derive(Debug, Clone)]
pub struct EntryView {
    pub title: String,
    pub updated: Option<DateTime<Utc>>,
    /// Abbreviated description for the list.
    pub blurb: String,
    /// Full description for the detail pane.
    pub description: String,
    pub cover: CoverState,
}

pub struct App {
    /// Title shown on the list block.
    pub feed_title: String,
    /// Whether the current feed is a single-item (leaf) feed.
    pub leaf: bool,
    /// Entries in feed order.
    pub entries: Vec<EntryView>,
    /// List selection state for scrolling.
    pub list_state: ListState,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last poll status message.
    pub status: String,
    renderer: PlainTextRenderer,
}

impl App {
    pub fn new() -> Self {
        Self {
            feed_title: "Catalog".into(),
            leaf: false,
            entries: Vec::new(),
            list_state: ListState::default(),
            quit: false,
            status: "Starting…".into(),
            renderer: PlainTextRenderer,
        }
    }

    /// Replace the displayed feed. Covers start out pending until the poller
    /// reports them.
    pub fn set_feed(&mut self, feed: &Feed) {
        let preference = ImagePreference::for_feed(feed);

        self.feed_title = feed.title.clone().unwrap_or_else(|| "Catalog".into());
        self.leaf = feed.is_leaf();
        self.entries = feed
            .entries
            .iter()
            .map(|entry| EntryView {
                title: entry.title.clone(),
                updated: entry.updated,
                blurb: select_description(entry, true, &self.renderer),
                description: select_description(entry, false, &self.renderer),
                cover: if entry.image_link_for(preference).is_some() {
                    CoverState::Pending
                } else {
                    CoverState::Absent
                },
            })
            .collect();

        let selected = match (self.list_state.selected(), self.entries.len()) {
            (_, 0) => None,
            (Some(i), len) => Some(i.min(len - 1)),
            (None, _) => Some(0),
        };
        self.list_state.select(selected);
    }

    /// Record the outcome of a cover download. Out-of-range indexes are
    /// ignored.
    pub fn set_cover(&mut self, index: usize, cover: CoverState) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.cover = cover;
        }
    }

    pub fn selected_entry(&self) -> Option<&EntryView> {
        self.list_state.selected().and_then(|i| self.entries.get(i))
    }

    /// Number of entries whose cover is no longer pending.
    pub fn settled_covers(&self) -> usize {
        self.entries.iter().filter(|e| e.cover.is_settled()).count()
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        self.move_selection(1);
    }

    pub fn select_previous(&mut self) {
        self.move_selection(-1);
    }

    pub fn page_down(&mut self) {
        self.move_selection(PAGE_SIZE as isize);
    }

    pub fn page_up(&mut self) {
        self.move_selection(-(PAGE_SIZE as isize));
    }

    pub fn select_first(&mut self) {
        if !self.entries.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.entries.is_empty() {
            self.list_state.select(Some(self.entries.len() - 1));
        }
    }

    fn move_selection(&mut self, delta: isize) {
        if self.entries.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i
                .saturating_add_signed(delta)
                .min(self.entries.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_browser::catalog::{Entry, MAX_THUMBNAIL_WIDTH};
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    fn sample_feed(count: usize) -> Feed {
        let entries = (0..count)
            .map(|i| {
                Entry::new(format!("Book {i}"))
                    .with_thumbnail(format!("covers/{i}.png"))
                    .with_summary(format!("<p>Summary {i}</p>"))
            })
            .collect();
        Feed {
            id: Some("urn:test".into()),
            title: Some("Test Catalog".into()),
            entries,
        }
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    // -- construction --------------------------------------------------------

    #[test]
    fn new_app_starts_empty() {
        let app = App::new();
        assert!(app.entries.is_empty());
        assert!(!app.quit);
        assert!(app.list_state.selected().is_none());
    }

    // -- set_feed ------------------------------------------------------------

    #[test]
    fn set_feed_builds_views_in_feed_order() {
        let mut app = App::new();
        app.set_feed(&sample_feed(3));

        assert_eq!(app.feed_title, "Test Catalog");
        assert!(!app.leaf);
        let titles: Vec<_> = app.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["Book 0", "Book 1", "Book 2"]);
        assert_eq!(app.entries[1].blurb, "Summary 1");
        assert_eq!(app.entries[1].cover, CoverState::Pending);
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn set_feed_marks_entries_without_links_absent() {
        let mut feed = sample_feed(2);
        feed.entries[1].thumbnail_link = None;

        let mut app = App::new();
        app.set_feed(&feed);

        assert_eq!(app.entries[0].cover, CoverState::Pending);
        assert_eq!(app.entries[1].cover, CoverState::Absent);
        assert_eq!(app.settled_covers(), 1);
    }

    #[test]
    fn set_feed_abbreviates_only_the_blurb() {
        let mut feed = sample_feed(1);
        feed.entries[0].summary = Some("z".repeat(300));

        let mut app = App::new();
        app.set_feed(&feed);

        assert!(app.leaf);
        assert_eq!(app.entries[0].blurb.chars().count(), 151);
        assert_eq!(app.entries[0].description.chars().count(), 300);
    }

    #[test]
    fn set_feed_clamps_existing_selection() {
        let mut app = App::new();
        app.set_feed(&sample_feed(5));
        app.select_last();

        app.set_feed(&sample_feed(2));
        assert_eq!(app.list_state.selected(), Some(1));

        app.set_feed(&sample_feed(0));
        assert!(app.list_state.selected().is_none());
    }

    #[test]
    fn set_cover_ignores_unknown_index() {
        let mut app = App::new();
        app.set_feed(&sample_feed(1));

        app.set_cover(7, CoverState::Unknown);
        app.set_cover(0, CoverState::Failed("boom".into()));

        assert_eq!(app.entries[0].cover, CoverState::Failed("boom".into()));
    }

    // -- CoverState ----------------------------------------------------------

    #[test]
    fn cover_state_from_decodable_payload() {
        let bytes = png(170, 250);
        match CoverState::from_payload(Some(&bytes)) {
            CoverState::Loaded {
                thumbnail,
                full,
                size,
            } => {
                assert_eq!(thumbnail, (MAX_THUMBNAIL_WIDTH, 125));
                assert_eq!(full, (170, 250));
                assert_eq!(size, bytes.len());
            }
            other => panic!("expected loaded cover, got {other:?}"),
        }
    }

    #[test]
    fn cover_state_thumbnail_matches_scaled_render() {
        let bytes = png(300, 451);
        let rendered = render_icon(Some(&bytes), true).dimensions();
        match CoverState::from_payload(Some(&bytes)) {
            CoverState::Loaded { thumbnail, .. } => assert_eq!(thumbnail, rendered),
            other => panic!("expected loaded cover, got {other:?}"),
        }
    }

    #[test]
    fn cover_state_from_garbage_is_unknown() {
        assert_eq!(CoverState::from_payload(Some(b"garbage")), CoverState::Unknown);
        assert_eq!(CoverState::from_payload(None), CoverState::Absent);
    }

    #[test]
    fn cover_labels_mention_fallback() {
        assert_eq!(CoverState::Absent.label(), "cover: none (unknown cover 85x120)");
        assert_eq!(CoverState::Unknown.label(), "cover: unreadable (unknown cover 85x120)");
        assert!(CoverState::Failed("HTTP 404".into()).label().contains("HTTP 404"));
        let loaded = CoverState::Loaded {
            thumbnail: (85, 120),
            full: (300, 424),
            size: 2048,
        };
        assert_eq!(loaded.label(), "cover: 300x424 (thumbnail 85x120), 2 KiB");
    }

    // -- navigation ----------------------------------------------------------

    #[test]
    fn navigation_on_empty_is_noop() {
        let mut app = App::new();
        app.select_next();
        app.select_previous();
        app.page_down();
        app.select_first();
        app.select_last();
        assert!(app.list_state.selected().is_none());
    }

    #[test]
    fn select_next_clamps_at_last_entry() {
        let mut app = App::new();
        app.set_feed(&sample_feed(3));

        app.select_next();
        assert_eq!(app.list_state.selected(), Some(1));
        app.select_next();
        app.select_next();
        assert_eq!(app.list_state.selected(), Some(2));
    }

    #[test]
    fn select_previous_clamps_at_zero() {
        let mut app = App::new();
        app.set_feed(&sample_feed(3));

        app.select_previous();
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn paging_moves_by_page_and_clamps() {
        let mut app = App::new();
        app.set_feed(&sample_feed(25));

        app.page_down();
        assert_eq!(app.list_state.selected(), Some(10));
        app.page_down();
        app.page_down();
        assert_eq!(app.list_state.selected(), Some(24));
        app.page_up();
        assert_eq!(app.list_state.selected(), Some(14));
        app.page_up();
        app.page_up();
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn first_and_last_jump() {
        let mut app = App::new();
        app.set_feed(&sample_feed(4));

        app.select_last();
        assert_eq!(app.selected_entry().map(|e| e.title.as_str()), Some("Book 3"));
        app.select_first();
        assert_eq!(app.selected_entry().map(|e| e.title.as_str()), Some("Book 0"));
    }
}
