//! Naver Blog Poster
//!
//! An HTTP bridge that publishes posts to Naver Blog by driving a real
//! Chrome browser over the Chrome DevTools Protocol: log in once at process
//! start, then per request navigate into the SmartEditor iframe, type the
//! post character-by-character, and save.

pub mod browser;
pub mod poster;
pub mod web;

use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use poster::BlogPublisher;

/// Application configuration, read from the environment at startup.
///
/// - `NAVER_ID` / `NAVER_PW` — Naver login credentials (required)
/// - `NAVER_POST_WEB_PORT` — server port (default: 8080)
/// - `NAVER_POST_HEADLESS` — force headless mode on/off (default: headless
///   only when no `DISPLAY` is available)
#[derive(Debug, Clone)]
pub struct Config {
    pub naver_id: String,
    pub naver_pw: String,
    pub port: u16,
    pub headless: bool,
}

impl Config {
    /// Load configuration from environment variables. Missing credentials
    /// are a startup error.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let naver_id = std::env::var("NAVER_ID")
            .map_err(|_| anyhow::anyhow!("NAVER_ID environment variable is not set"))?;
        let naver_pw = std::env::var("NAVER_PW")
            .map_err(|_| anyhow::anyhow!("NAVER_PW environment variable is not set"))?;

        let port: u16 = std::env::var("NAVER_POST_WEB_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        // Explicit override wins; otherwise headless only without a display
        let headless = match std::env::var("NAVER_POST_HEADLESS").ok().as_deref() {
            Some("1") | Some("true") => true,
            Some("0") | Some("false") => false,
            _ => !std::env::var("DISPLAY").map(|d| !d.is_empty()).unwrap_or(false),
        };

        Ok(Self { naver_id, naver_pw, port, headless })
    }
}

/// Application state shared across request handlers
pub struct AppState {
    /// The publisher the HTTP layer talks to
    pub publisher: Arc<dyn BlogPublisher>,
}

impl AppState {
    pub fn new(publisher: Arc<dyn BlogPublisher>) -> Self {
        Self { publisher }
    }
}

/// Get log directory path
pub fn log_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("naver-blog-poster").join("logs"))
}

/// Initialize logging: console layer plus a daily-rolling file layer when a
/// log directory is available.
pub fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false);

    if let Some(log_dir) = log_dir() {
        let _ = std::fs::create_dir_all(&log_dir);
        let file_appender = tracing_appender::rolling::daily(&log_dir, "naver-blog-poster.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(non_blocking);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();

        info!("Log files saved to: {}", log_dir.display());
        Some(guard)
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .init();

        None
    }
}
