//! Publishing facade between the HTTP layer and the browser.
//!
//! The web routes depend on [`BlogPublisher`] rather than the concrete
//! browser session so the HTTP surface is testable without Chrome.

use std::sync::Arc;
use async_trait::async_trait;
use tracing::info;

use crate::browser::{BrowserError, BrowserSession, NaverActions};

/// Maximum length of a title derived from the body
const DERIVED_TITLE_MAX_CHARS: usize = 40;

/// Snapshot of the publisher's readiness
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublisherStatus {
    /// Browser process is up and the CDP connection is alive
    pub browser_alive: bool,
    /// Startup login completed
    pub logged_in: bool,
}

/// Something that can publish a post and report its readiness
#[async_trait]
pub trait BlogPublisher: Send + Sync {
    /// Publish a post; returns the effective title
    async fn publish(&self, title: &str, body: &str) -> Result<String, BrowserError>;

    /// Current readiness
    fn status(&self) -> PublisherStatus;
}

/// Publisher backed by the shared Naver browser session.
///
/// The HTTP layer may see concurrent requests, but there is exactly one
/// browser; every publish holds `ui_lock` for the whole open-editor plus
/// write-and-save sequence so UI actions never interleave.
pub struct NaverPublisher {
    session: Arc<BrowserSession>,
    ui_lock: tokio::sync::Mutex<()>,
    logged_in: std::sync::atomic::AtomicBool,
}

impl NaverPublisher {
    pub fn new(session: Arc<BrowserSession>) -> Self {
        Self {
            session,
            ui_lock: tokio::sync::Mutex::new(()),
            logged_in: std::sync::atomic::AtomicBool::new(false),
        }
    }

    /// Run the startup login. Called once from `main`; no retries (a failed
    /// login is fatal at startup).
    pub async fn login(&self, credentials: &crate::browser::actions::NaverCredentials)
        -> Result<(), BrowserError>
    {
        let _guard = self.ui_lock.lock().await;
        NaverActions::login(&self.session, credentials).await?;
        self.logged_in.store(true, std::sync::atomic::Ordering::Relaxed);
        Ok(())
    }

    /// Access to the underlying session (for shutdown)
    pub fn session(&self) -> &Arc<BrowserSession> {
        &self.session
    }
}

#[async_trait]
impl BlogPublisher for NaverPublisher {
    async fn publish(&self, title: &str, body: &str) -> Result<String, BrowserError> {
        let effective_title = derive_title(title, body);

        // One post at a time on the one browser
        let _guard = self.ui_lock.lock().await;

        info!("Publishing post: {}", effective_title);
        NaverActions::open_write_page(&self.session).await?;
        NaverActions::write_post(&self.session, &effective_title, body).await?;

        Ok(effective_title)
    }

    fn status(&self) -> PublisherStatus {
        PublisherStatus {
            browser_alive: self.session.is_alive(),
            logged_in: self.logged_in.load(std::sync::atomic::Ordering::Relaxed),
        }
    }
}

/// Effective post title: the given title trimmed, or, when empty, the first
/// 40 characters of the body's first line. Characters, not bytes — titles
/// are mostly Korean.
pub fn derive_title(title: &str, body: &str) -> String {
    let trimmed = title.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    body.trim()
        .lines()
        .next()
        .unwrap_or("")
        .chars()
        .take(DERIVED_TITLE_MAX_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_title_is_passed_through_trimmed() {
        assert_eq!(derive_title("  오늘의 일기  ", "본문"), "오늘의 일기");
    }

    #[test]
    fn empty_title_falls_back_to_first_body_line() {
        assert_eq!(derive_title("", "첫 줄\n둘째 줄"), "첫 줄");
        assert_eq!(derive_title("   ", "\n\n  첫 줄\n둘째 줄"), "첫 줄");
    }

    #[test]
    fn derived_title_is_capped_at_forty_chars() {
        let body: String = "가".repeat(100);
        let title = derive_title("", &body);
        assert_eq!(title.chars().count(), 40);
    }

    #[test]
    fn empty_title_and_body_yield_empty_title() {
        assert_eq!(derive_title("", ""), "");
    }
}
