//! Command-line configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

/// Feed shown when no URL is given.
pub const DEFAULT_FEED_URL: &str = "https://standardebooks.org/feeds/rss/new-releases";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "catalog-browser",
    version,
    about = "Browse a book catalog feed and its cover images in the terminal",
    long_about = None
)]
pub struct CliArgs {
    /// Catalog feed URL.
    #[arg(default_value = DEFAULT_FEED_URL)]
    pub url: String,

    /// Base URL for relative cover links. Defaults to the feed URL.
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// HTTP timeout for feed and cover requests.
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// How often the feed is re-fetched.
    #[arg(long, value_name = "SECS", default_value_t = 300)]
    pub refresh_secs: u64,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level. `RUST_LOG` takes precedence when set.
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

impl CliArgs {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs.max(1))
    }

    /// Where logs go. The terminal belongs to the UI, so always a file.
    pub fn effective_log_path(&self) -> PathBuf {
        self.log_path
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("catalog-browser.log"))
    }
}
