//! Basic auth middleware tests.
//!
//! Kept in their own test binary: the middleware reads `NAVER_POST_WEB_*`
//! from the environment per request, and the single test below owns those
//! variables for the whole process.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use base64::Engine;
use tower::ServiceExt;

use naver_blog_poster::browser::BrowserError;
use naver_blog_poster::poster::{BlogPublisher, PublisherStatus};
use naver_blog_poster::{web, AppState};

struct NoopPublisher;

#[async_trait]
impl BlogPublisher for NoopPublisher {
    async fn publish(&self, title: &str, _body: &str) -> Result<String, BrowserError> {
        Ok(title.to_string())
    }

    fn status(&self) -> PublisherStatus {
        PublisherStatus { browser_alive: true, logged_in: true }
    }
}

fn router() -> axum::Router {
    web::build_router(Arc::new(AppState::new(Arc::new(NoopPublisher))))
}

fn health_request(auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/health");
    if let Some(credentials) = auth {
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
        builder = builder.header(header::AUTHORIZATION, format!("Basic {}", encoded));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn basic_auth_gates_requests_when_password_is_set() {
    // Open access when no password is configured
    std::env::remove_var("NAVER_POST_WEB_PASS");
    let response = router().oneshot(health_request(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    std::env::set_var("NAVER_POST_WEB_USER", "operator");
    std::env::set_var("NAVER_POST_WEB_PASS", "hunter2");

    // Missing credentials
    let response = router().oneshot(health_request(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Wrong credentials
    let response = router()
        .oneshot(health_request(Some("operator:wrong")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Correct credentials
    let response = router()
        .oneshot(health_request(Some("operator:hunter2")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    std::env::remove_var("NAVER_POST_WEB_PASS");
    std::env::remove_var("NAVER_POST_WEB_USER");
}
