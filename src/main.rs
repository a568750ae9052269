//! Naver Blog Poster — server entry point.
//!
//! Launches Chrome, logs into Naver once, then serves the HTTP API until
//! shutdown.
//!
//! Environment variables:
//! - `NAVER_ID` / `NAVER_PW` - Naver credentials (required)
//! - `NAVER_POST_WEB_PORT` - Server port (default: 8080)
//! - `NAVER_POST_WEB_USER` - Basic auth username (default: "admin")
//! - `NAVER_POST_WEB_PASS` - Basic auth password (auth disabled if not set)
//! - `NAVER_POST_HEADLESS` - Force headless on/off

use std::sync::Arc;
use tracing::info;

use naver_blog_poster::browser::actions::NaverCredentials;
use naver_blog_poster::browser::{BrowserSession, BrowserSessionConfig};
use naver_blog_poster::poster::NaverPublisher;
use naver_blog_poster::{web, AppState, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _guard = naver_blog_poster::init_logging();

    info!("Starting Naver Blog Poster");

    let config = Config::from_env()?;

    if std::env::var("NAVER_POST_WEB_PASS").map(|p| !p.is_empty()).unwrap_or(false) {
        let user = std::env::var("NAVER_POST_WEB_USER").unwrap_or_else(|_| "admin".to_string());
        info!("Basic auth enabled (user: {})", user);
    } else {
        info!("Basic auth disabled (set NAVER_POST_WEB_PASS to enable)");
    }

    if config.headless {
        info!("No display override detected - running Chrome headless");
    }

    // One browser for the whole process lifetime
    let session = Arc::new(
        BrowserSession::launch(BrowserSessionConfig::default().headless(config.headless)).await?,
    );

    let publisher = Arc::new(NaverPublisher::new(session.clone()));

    // Log in once at startup; a failed login is fatal
    let credentials = NaverCredentials {
        id: config.naver_id.clone(),
        password: config.naver_pw.clone(),
    };
    publisher.login(&credentials).await?;

    let state = Arc::new(AppState::new(publisher));

    info!("Ready to accept post requests on port {}", config.port);

    let result = web::start_server(state, config.port).await;

    // Don't leave Chrome processes behind on shutdown
    session.close().await?;

    result
}
