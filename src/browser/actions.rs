//! Naver Blog automation workflows
//!
//! Three sequential workflows against the Naver web UI:
//! 1. Log in at nid.naver.com (once, at process start)
//! 2. Open the blog write page and enter the editor iframe, dismissing the
//!    resume-draft popup and help panels
//! 3. Type title and body character-by-character and save, confirming via
//!    the success toast or a URL change
//!
//! The SmartEditor lives inside `iframe#mainFrame`, which is same-origin
//! with blog.naver.com, so DOM queries go through the frame's
//! `contentDocument` while keystrokes and clicks are dispatched as raw CDP
//! input events at top-level page coordinates.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{BrowserError, BrowserSession};

/// Naver login credentials
#[derive(Debug, Clone)]
pub struct NaverCredentials {
    pub id: String,
    pub password: String,
}

/// Naver page URLs
mod urls {
    pub const LOGIN: &str = "https://nid.naver.com/nidlogin.login";
    pub const BLOG_WRITE: &str = "https://blog.naver.com/GoBlogWrite.naver";
}

/// Naver DOM selectors (login form and SmartEditor)
mod selectors {
    pub const LOGIN_ID: &str = "#id";
    pub const LOGIN_PW: &str = "#pw";
    // The literal element id is "log.login"; the dot needs escaping in CSS
    pub const LOGIN_SUBMIT: &str = "#log\\\\.login";
    pub const MAIN_FRAME: &str = "iframe#mainFrame";
    pub const DRAFT_CANCEL: &str = ".se-popup-button-cancel";
    pub const POPUP_DIM: &str = ".se-popup-dim";
    pub const HELP_CLOSE: &str = ".se-help-panel-close-button";
    pub const TITLE_AREA: &str = ".se-section-documentTitle";
    pub const BODY_AREA: &str = ".se-section-text";
    pub const SAVE_BUTTON: &str = ".save_btn__bzc5B";
    pub const SAVE_TOAST: &str = ".toast_item__success, .se-toast-item__success";
}

/// How long the draft popup gets to show up before we assume there is none
const DRAFT_POPUP_WAIT: Duration = Duration::from_secs(3);

/// How long to wait for the save toast / URL change before giving up
/// gracefully
const SAVE_CONFIRM_WAIT: Duration = Duration::from_secs(7);

/// Escape a string for embedding in a double-quoted JS literal
fn js_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "")
}

/// Naver Blog browser workflows
pub struct NaverActions;

impl NaverActions {
    /// Log into Naver. Credentials are injected by setting the field value
    /// and dispatching an `input` event (the clipboard-paste equivalent of
    /// the manual flow) rather than typed per-key: the login form has no
    /// per-key listeners, and fast injection avoids its bot heuristics.
    pub async fn login(
        session: &Arc<BrowserSession>,
        credentials: &NaverCredentials,
    ) -> Result<(), BrowserError> {
        info!("Logging into Naver as {}", credentials.id);

        session.navigate(urls::LOGIN).await?;

        session
            .wait_until(
                "login form",
                &format!(
                    "!!document.querySelector(\"{}\")",
                    selectors::LOGIN_ID
                ),
                session.wait_timeout(),
            )
            .await?;

        let fill_script = format!(
            r#"
            (function() {{
                const idInput = document.querySelector("{id_sel}");
                const pwInput = document.querySelector("{pw_sel}");
                if (!idInput || !pwInput) return {{ success: false, error: 'login inputs not found' }};

                idInput.focus();
                idInput.value = "{id}";
                idInput.dispatchEvent(new Event('input', {{ bubbles: true }}));

                pwInput.focus();
                pwInput.value = "{pw}";
                pwInput.dispatchEvent(new Event('input', {{ bubbles: true }}));

                return {{ success: true }};
            }})()
            "#,
            id_sel = selectors::LOGIN_ID,
            pw_sel = selectors::LOGIN_PW,
            id = js_escape(&credentials.id),
            pw = js_escape(&credentials.password),
        );

        let fill_result = session.execute_js(&fill_script).await?;
        if fill_result.get("success").and_then(|v| v.as_bool()) != Some(true) {
            let error = fill_result
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error");
            return Err(BrowserError::LoginFailed(error.to_string()));
        }

        session
            .execute_js(&format!(
                r#"
                (function() {{
                    const btn = document.querySelector("{}");
                    if (!btn) return false;
                    btn.click();
                    return true;
                }})()
                "#,
                selectors::LOGIN_SUBMIT
            ))
            .await?;

        // Successful login redirects away from nid.naver.com
        let redirected = session
            .wait_until(
                "login redirect",
                "!window.location.href.includes('nidlogin')",
                session.wait_timeout(),
            )
            .await;

        if redirected.is_err() {
            let url = session.current_url().await.unwrap_or_default();
            return Err(BrowserError::LoginFailed(format!(
                "still on login page after submit (url: {})",
                url
            )));
        }

        info!("Naver login complete");
        Ok(())
    }

    /// Open the blog write page: wait for the editor iframe, cancel the
    /// resume-draft popup if one appears, close any help panels.
    pub async fn open_write_page(session: &Arc<BrowserSession>) -> Result<(), BrowserError> {
        info!("Opening blog write page");

        session.navigate(urls::BLOG_WRITE).await?;

        // The editor bootstraps inside iframe#mainFrame; wait until the
        // frame document is attached and loaded
        session
            .wait_until(
                "editor iframe",
                &format!(
                    r#"
                    (function() {{
                        const frame = document.querySelector("{}");
                        return !!(frame && frame.contentDocument
                            && frame.contentDocument.readyState === 'complete');
                    }})()
                    "#,
                    selectors::MAIN_FRAME
                ),
                session.wait_timeout(),
            )
            .await?;

        Self::dismiss_draft_popup(session).await?;
        Self::close_help_panels(session).await?;

        Ok(())
    }

    /// Cancel the "resume draft?" popup if it shows up. Absence of the
    /// popup is the common case and not an error.
    async fn dismiss_draft_popup(session: &Arc<BrowserSession>) -> Result<(), BrowserError> {
        let cancel_visible = session
            .wait_until(
                "draft popup",
                &frame_query_script(selectors::DRAFT_CANCEL),
                DRAFT_POPUP_WAIT,
            )
            .await;

        match cancel_visible {
            Ok(_) => {
                debug!("Draft popup present, cancelling");
                session
                    .execute_js(&frame_click_script(selectors::DRAFT_CANCEL))
                    .await?;

                // The dim layer fades out after cancel; the editor is not
                // clickable until it does
                session
                    .wait_until(
                        "popup dim gone",
                        &format!("!({})", frame_query_script(selectors::POPUP_DIM)),
                        session.wait_timeout(),
                    )
                    .await?;
            }
            Err(BrowserError::Timeout(_)) => {
                debug!("No draft popup");
            }
            Err(e) => return Err(e),
        }

        Ok(())
    }

    /// Click the help panel close button until no panel remains
    async fn close_help_panels(session: &Arc<BrowserSession>) -> Result<(), BrowserError> {
        // Panels can stack; cap the loop so a sticky panel can't spin forever
        for _ in 0..20 {
            let clicked = session
                .execute_js(&frame_click_script(selectors::HELP_CLOSE))
                .await?;

            if clicked.as_bool() != Some(true) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        Ok(())
    }

    /// Type title and body into the editor and save the post
    pub async fn write_post(
        session: &Arc<BrowserSession>,
        title: &str,
        body: &str,
    ) -> Result<(), BrowserError> {
        info!("Writing post: {}", title);

        // Title: focus with a real click, then per-character keystrokes so
        // the SmartEditor input listeners fire
        Self::click_editor_element(session, selectors::TITLE_AREA, "title area").await?;
        session.type_text_cdp(title).await?;

        // Body: one line at a time, Enter after each
        Self::click_editor_element(session, selectors::BODY_AREA, "body area").await?;
        for line in body.split('\n') {
            session.type_text_cdp(line.trim_end_matches('\r')).await?;
            session.press_enter().await?;
        }

        Self::save_post(session).await?;

        info!("Post written: {}", title);
        Ok(())
    }

    /// Click the save button and wait for confirmation
    async fn save_post(session: &Arc<BrowserSession>) -> Result<(), BrowserError> {
        session
            .wait_until(
                "save button",
                &frame_query_script(selectors::SAVE_BUTTON),
                session.wait_timeout(),
            )
            .await?;

        // Bring the button into the viewport before computing click
        // coordinates
        session
            .execute_js(&format!(
                r#"
                (function() {{
                    const frame = document.querySelector("{frame}");
                    const el = frame && frame.contentDocument
                        ? frame.contentDocument.querySelector("{sel}") : null;
                    if (el) el.scrollIntoView({{ block: 'center' }});
                    return !!el;
                }})()
                "#,
                frame = selectors::MAIN_FRAME,
                sel = selectors::SAVE_BUTTON,
            ))
            .await?;
        tokio::time::sleep(Duration::from_millis(50)).await;

        let url_before = session.current_url().await.unwrap_or_default();

        // Prefer a real input-event click; fall back to a JS click when the
        // coordinates can't be resolved (e.g. an overlay intercepts)
        match Self::editor_element_center(session, selectors::SAVE_BUTTON).await? {
            Some((x, y)) => session.click_at(x, y).await?,
            None => {
                warn!("Save button coordinates unavailable, falling back to JS click");
                session
                    .execute_js(&frame_click_script(selectors::SAVE_BUTTON))
                    .await?;
            }
        }

        Self::wait_for_save_confirmation(session, &url_before).await;

        // Brief settle so the save request completes before the next
        // navigation
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(())
    }

    /// Wait for the success toast or a URL change. Timing out here is not
    /// an error: the toast is transient and sometimes missed entirely.
    async fn wait_for_save_confirmation(session: &Arc<BrowserSession>, url_before: &str) {
        let deadline = tokio::time::Instant::now() + SAVE_CONFIRM_WAIT;

        loop {
            let toast = session
                .execute_js_with_timeout(&frame_query_script(selectors::SAVE_TOAST), 5)
                .await
                .map(|v| v.as_bool() == Some(true))
                .unwrap_or(false);
            if toast {
                debug!("Save toast observed");
                return;
            }

            if let Ok(url) = session.current_url().await {
                if url != url_before {
                    debug!("URL changed after save: {}", url);
                    return;
                }
            }

            if tokio::time::Instant::now() >= deadline {
                warn!("No save confirmation within {:?}, proceeding", SAVE_CONFIRM_WAIT);
                return;
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    }

    /// Wait for an editor element, then click its center with a real CDP
    /// mouse event to focus it
    async fn click_editor_element(
        session: &Arc<BrowserSession>,
        selector: &str,
        what: &str,
    ) -> Result<(), BrowserError> {
        session
            .wait_until(what, &frame_query_script(selector), session.wait_timeout())
            .await?;

        let (x, y) = Self::editor_element_center(session, selector)
            .await?
            .ok_or_else(|| BrowserError::ElementNotFound(what.to_string()))?;

        session.click_at(x, y).await
    }

    /// Resolve the top-level page coordinates of an element inside the
    /// editor iframe (frame offset + element rect)
    async fn editor_element_center(
        session: &Arc<BrowserSession>,
        selector: &str,
    ) -> Result<Option<(f64, f64)>, BrowserError> {
        let result = session
            .execute_js(&format!(
                r#"
                (function() {{
                    const frame = document.querySelector("{frame}");
                    if (!frame || !frame.contentDocument) return null;
                    const el = frame.contentDocument.querySelector("{sel}");
                    if (!el) return null;
                    const fr = frame.getBoundingClientRect();
                    const r = el.getBoundingClientRect();
                    return {{
                        x: fr.left + r.left + r.width / 2,
                        y: fr.top + r.top + r.height / 2
                    }};
                }})()
                "#,
                frame = selectors::MAIN_FRAME,
                sel = selector,
            ))
            .await?;

        let x = result.get("x").and_then(|v| v.as_f64());
        let y = result.get("y").and_then(|v| v.as_f64());
        Ok(x.zip(y))
    }
}

/// Boolean presence check inside the editor iframe
fn frame_query_script(selector: &str) -> String {
    format!(
        r#"(function() {{
            const frame = document.querySelector("{frame}");
            return !!(frame && frame.contentDocument
                && frame.contentDocument.querySelector("{sel}"));
        }})()"#,
        frame = selectors::MAIN_FRAME,
        sel = selector,
    )
}

/// JS click on the first match inside the editor iframe; returns whether an
/// element was clicked
fn frame_click_script(selector: &str) -> String {
    format!(
        r#"(function() {{
            const frame = document.querySelector("{frame}");
            const el = frame && frame.contentDocument
                ? frame.contentDocument.querySelector("{sel}") : null;
            if (!el) return false;
            el.click();
            return true;
        }})()"#,
        frame = selectors::MAIN_FRAME,
        sel = selector,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_escape_handles_quotes_and_newlines() {
        assert_eq!(js_escape(r#"a"b"#), r#"a\"b"#);
        assert_eq!(js_escape("a\\b"), "a\\\\b");
        assert_eq!(js_escape("line1\nline2"), "line1\\nline2");
        assert_eq!(js_escape("crlf\r\n"), "crlf\\n");
    }

    #[test]
    fn frame_scripts_embed_selector() {
        let script = frame_click_script(selectors::DRAFT_CANCEL);
        assert!(script.contains("iframe#mainFrame"));
        assert!(script.contains(".se-popup-button-cancel"));
        assert!(script.contains("el.click()"));
    }

    #[test]
    fn login_submit_selector_escapes_the_dot() {
        // Embedded in a JS double-quoted string this must read "#log\\.login"
        assert_eq!(selectors::LOGIN_SUBMIT, "#log\\\\.login");
    }
}
