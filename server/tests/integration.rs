//! Integration tests for the HTTP surface

mod common;

use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use tower::ServiceExt;

use common::*;

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, body.to_vec())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app(Options::default());
    let (status, _, body) = send(&app.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn test_process_post_form() {
    let app = create_test_app(Options::default());
    let (status, content_type, body) =
        send(&app.router, post_form("/process", "INPUT_TEXT=hello")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("audio/wav"));
    assert!(!body.is_empty());
    assert_eq!(&body[0..4], b"RIFF");

    let requests = app.recorder.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].text, "hello");
    assert_eq!(requests[0].reference_wav, None);
}

#[tokio::test]
async fn test_process_post_without_content_type() {
    let app = create_test_app(Options::default());
    let request = Request::builder()
        .method("POST")
        .uri("/process")
        .body(Body::from("INPUT_TEXT=good+morning&LOCALE=en_US"))
        .unwrap();
    let (status, _, _) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.recorder.requests()[0].text, "good morning");
}

#[tokio::test]
async fn test_process_get_uses_reference_wav() {
    let app = create_test_app(Options { reference_wav: true, ..Default::default() });
    let (status, content_type, _) = send(&app.router, get("/process?INPUT_TEXT=hi%20there")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("audio/wav"));

    let requests = app.recorder.requests();
    assert_eq!(requests[0].text, "hi there");
    assert_eq!(requests[0].reference_wav, Some(app.model_dir.join("reference.wav")));
}

#[tokio::test]
async fn test_api_tts_query_params() {
    let app = create_test_app(Options::default());
    let (status, content_type, body) = send(
        &app.router,
        get("/api/tts?text=Hello%20world&speaker_id=p225&language_id=en"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("audio/wav"));
    assert!(body.len() > 44);

    let req = &app.recorder.requests()[0];
    assert_eq!(req.text, "Hello world");
    assert_eq!(req.speaker.as_deref(), Some("p225"));
    assert_eq!(req.language.as_deref(), Some("en"));
    assert_eq!(req.style_wav, None);
    assert_eq!(req.reference_wav, None);
}

#[tokio::test]
async fn test_api_tts_headers_take_precedence() {
    let app = create_test_app(Options { reference_wav: true, ..Default::default() });
    let request = Request::builder()
        .method("POST")
        .uri("/api/tts?text=from%20query")
        .header("text", "from header")
        .header("speaker-id", "")
        .header("style-wav", "/voices/style.wav")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("speaker_id=p226&text=from+form"))
        .unwrap();
    let (status, _, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);

    let req = &app.recorder.requests()[0];
    assert_eq!(req.text, "from header");
    assert_eq!(req.speaker.as_deref(), Some("p226"));
    assert_eq!(req.language, None);
    assert_eq!(req.style_wav, Some(PathBuf::from("/voices/style.wav")));
    assert_eq!(req.reference_wav, Some(app.model_dir.join("reference.wav")));
}

#[tokio::test]
async fn test_api_tts_multipart_form() {
    let app = create_test_app(Options::default());
    let body = "--boundary42\r\n\
                Content-Disposition: form-data; name=\"text\"\r\n\r\n\
                multipart hello\r\n\
                --boundary42\r\n\
                Content-Disposition: form-data; name=\"speaker_id\"\r\n\r\n\
                p227\r\n\
                --boundary42--\r\n";
    let request = Request::builder()
        .method("POST")
        .uri("/api/tts")
        .header("content-type", "multipart/form-data; boundary=boundary42")
        .body(Body::from(body))
        .unwrap();
    let (status, content_type, _) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("audio/wav"));
    let req = &app.recorder.requests()[0];
    assert_eq!(req.text, "multipart hello");
    assert_eq!(req.speaker.as_deref(), Some("p227"));
}

#[tokio::test]
async fn test_api_tts_malformed_multipart_is_400() {
    let app = create_test_app(Options::default());
    let request = Request::builder()
        .method("POST")
        .uri("/api/tts")
        .header("content-type", "multipart/form-data")
        .body(Body::from("text=hello"))
        .unwrap();
    let (status, _, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.recorder.requests().is_empty());
}

#[tokio::test]
async fn test_engine_failure_is_500() {
    let app = create_test_app(Options { fail: true, ..Default::default() });
    let (status, _, _) = send(&app.router, get("/api/tts?text=boom")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    // A failed synthesis does not wedge the lock
    let (status, _, _) = send(&app.router, post_form("/process", "INPUT_TEXT=again")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.recorder.requests().len(), 2);
}

#[tokio::test]
async fn test_locales_and_voices_are_stable() {
    let app = create_test_app(Options::default());

    let (status, content_type, first) = send(&app.router, get("/locales")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/plain"));
    let (_, _, second) = send(&app.router, get("/locales")).await;
    assert_eq!(first, second);
    assert_eq!(first, b"en_US\n");

    let (status, _, first) = send(&app.router, get("/voices")).await;
    assert_eq!(status, StatusCode::OK);
    let (_, _, second) = send(&app.router, get("/voices")).await;
    assert_eq!(first, second);
    assert_eq!(first, b"medium en_US u\n");
    assert!(first.ends_with(b"u\n"));

    assert!(app.recorder.requests().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_synthesis_is_serialized() {
    let app = create_test_app(Options {
        delay: Duration::from_millis(25),
        ..Default::default()
    });

    let mut handles = Vec::new();
    for i in 0..8 {
        let router = app.router.clone();
        handles.push(tokio::spawn(async move {
            let request = if i % 2 == 0 {
                Request::builder()
                    .uri(format!("/api/tts?text=request{i}"))
                    .body(Body::empty())
                    .unwrap()
            } else {
                Request::builder()
                    .method("POST")
                    .uri("/process")
                    .body(Body::from(format!("INPUT_TEXT=request{i}")))
                    .unwrap()
            };
            router.oneshot(request).await.unwrap().status()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    assert_eq!(app.recorder.requests().len(), 8);
    assert_eq!(app.recorder.max_active.load(Ordering::SeqCst), 1);
    assert_eq!(app.recorder.active.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_index_page() {
    let app = create_test_app(Options { show_details: true, ..Default::default() });
    let (status, content_type, body) = send(&app.router, get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("/api/tts"));
    assert!(html.contains("href=\"/details\""));
}

#[tokio::test]
async fn test_details_page() {
    let app = create_test_app(Options::default());
    let (status, _, body) = send(&app.router, get("/details")).await;

    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("<h2>Model config</h2>"));
    assert!(html.contains("<tr><th>dataset</th><td>lessac</td></tr>"));
    assert!(html.contains("<h2>Arguments</h2>"));
    assert!(html.contains("<tr><th>port</th><td>5002</td></tr>"));
    assert!(!html.contains("Vocoder config"));
}

#[tokio::test]
async fn test_metrics_after_synthesis() {
    let app = create_test_app(Options::default());
    send(&app.router, get("/api/tts?text=count%20me")).await;

    let (status, _, body) = send(&app.router, get("/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    let metrics: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(metrics["synthesis"]["synthesis_count"], 1);
    assert_eq!(metrics["synthesis"]["error_count"], 0);
    assert!(metrics["timestamp"].is_string());
}

#[tokio::test]
async fn test_not_found_endpoint() {
    let app = create_test_app(Options::default());
    let (status, _, _) = send(&app.router, get("/nonexistent")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
