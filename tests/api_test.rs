//! HTTP API tests against the router with a stub publisher (no Chrome).

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use naver_blog_poster::browser::BrowserError;
use naver_blog_poster::poster::{derive_title, BlogPublisher, PublisherStatus};
use naver_blog_poster::{web, AppState};

/// Publisher stub: derives the title like the real one, optionally fails.
struct StubPublisher {
    fail_with: Option<String>,
}

impl StubPublisher {
    fn ok() -> Arc<Self> {
        Arc::new(Self { fail_with: None })
    }

    fn failing(msg: &str) -> Arc<Self> {
        Arc::new(Self { fail_with: Some(msg.to_string()) })
    }
}

#[async_trait]
impl BlogPublisher for StubPublisher {
    async fn publish(&self, title: &str, body: &str) -> Result<String, BrowserError> {
        if let Some(ref msg) = self.fail_with {
            return Err(BrowserError::Timeout(msg.clone()));
        }
        Ok(derive_title(title, body))
    }

    fn status(&self) -> PublisherStatus {
        PublisherStatus { browser_alive: true, logged_in: true }
    }
}

fn router(publisher: Arc<StubPublisher>) -> axum::Router {
    web::build_router(Arc::new(AppState::new(publisher)))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("body is JSON")
}

fn post_request(json: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/post-to-naver")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_returns_ok() {
    let app = router(StubPublisher::ok());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn status_reports_publisher_readiness() {
    let app = router(StubPublisher::ok());

    let response = app
        .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["browserAlive"], true);
    assert_eq!(json["loggedIn"], true);
}

#[tokio::test]
async fn malformed_json_is_rejected_with_client_error() {
    let app = router(StubPublisher::ok());

    let response = app.oneshot(post_request("{not json")).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn missing_fields_are_rejected_with_client_error() {
    let app = router(StubPublisher::ok());

    let response = app.oneshot(post_request(r#"{"title": "only a title"}"#)).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn post_returns_success_with_effective_title() {
    let app = router(StubPublisher::ok());

    let response = app
        .oneshot(post_request(r#"{"title": "오늘의 일기", "body": "본문입니다"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["title"], "오늘의 일기");
}

#[tokio::test]
async fn empty_title_falls_back_to_first_body_line() {
    let app = router(StubPublisher::ok());

    let response = app
        .oneshot(post_request(r#"{"title": "  ", "body": "첫 줄입니다\n둘째 줄"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["title"], "첫 줄입니다");
}

#[tokio::test]
async fn publisher_error_surfaces_as_500_with_detail() {
    let app = router(StubPublisher::failing("save button never appeared"));

    let response = app
        .oneshot(post_request(r#"{"title": "t", "body": "b"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(
        json["error"].as_str().unwrap().contains("save button never appeared"),
        "error detail should carry the failure message"
    );
}
