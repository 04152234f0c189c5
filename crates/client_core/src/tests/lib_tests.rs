use super::*;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use shared::domain::{Platform, SubmissionParameters};
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

#[derive(Debug)]
struct CapturedRequest {
    content_type: Option<String>,
    body: String,
}

#[derive(Clone)]
struct ServerState {
    tx: Arc<Mutex<Option<oneshot::Sender<CapturedRequest>>>>,
    status: StatusCode,
    reply: Vec<u8>,
}

async fn handle_generate(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Vec<u8>) {
    let captured = CapturedRequest {
        content_type: headers
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    if let Some(tx) = state.tx.lock().await.take() {
        let _ = tx.send(captured);
    }
    (state.status, state.reply.clone())
}

async fn spawn_generate_server(
    status: StatusCode,
    reply: &[u8],
) -> (String, oneshot::Receiver<CapturedRequest>) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let (tx, rx) = oneshot::channel();
    let state = ServerState {
        tx: Arc::new(Mutex::new(Some(tx))),
        status,
        reply: reply.to_vec(),
    };
    let app = Router::new()
        .route("/api/generate", post(handle_generate))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), rx)
}

fn request_for(text: &str) -> GenerateRequest {
    GenerateRequest::from(&SubmissionParameters {
        text: text.to_string(),
        ..SubmissionParameters::default()
    })
}

#[test]
fn endpoint_is_resolved_against_base_url() {
    let client = HttpGenerationClient::new("http://127.0.0.1:8000/some/page?welcome_roo=x")
        .expect("client");
    assert_eq!(client.endpoint().as_str(), "http://127.0.0.1:8000/api/generate");
}

#[test]
fn rejects_non_http_base_url() {
    let err = HttpGenerationClient::new("ftp://example.com").expect_err("must fail");
    assert!(matches!(err, GenerateError::InvalidBaseUrl { .. }));

    let err = HttpGenerationClient::new("not a url").expect_err("must fail");
    assert!(err.to_string().contains("not a url"));
}

#[tokio::test]
async fn posts_json_body_and_returns_raw_bytes() {
    let (base_url, captured_rx) = spawn_generate_server(StatusCode::OK, b"\x89PNG-bytes").await;
    let client = HttpGenerationClient::new(&base_url).expect("client");

    let bytes = client.generate(&request_for("hi")).await.expect("generate");
    assert_eq!(bytes, b"\x89PNG-bytes".to_vec());

    let captured = captured_rx.await.expect("captured request");
    assert_eq!(captured.content_type.as_deref(), Some("application/json"));
    assert_eq!(
        captured.body,
        r#"{"text":"hi","margin":0,"gif":false,"loop":true,"frameDelay":100,"hdr":false,"hdrConfirmed":false}"#
    );
}

#[tokio::test]
async fn sends_platform_when_selected() {
    let (base_url, captured_rx) = spawn_generate_server(StatusCode::OK, b"GIF89a").await;
    let client = HttpGenerationClient::new(&base_url).expect("client");
    let request = GenerateRequest::from(&SubmissionParameters {
        text: "a\nb".to_string(),
        gif: true,
        platform: Some(Platform::Wolt),
        ..SubmissionParameters::default()
    });

    client.generate(&request).await.expect("generate");

    let captured = captured_rx.await.expect("captured request");
    let body: serde_json::Value = serde_json::from_str(&captured.body).expect("json body");
    assert_eq!(body["platform"], "wolt");
    assert_eq!(body["gif"], true);
}

#[tokio::test]
async fn maps_error_status_to_service_error() {
    let (base_url, _captured_rx) =
        spawn_generate_server(StatusCode::UNPROCESSABLE_ENTITY, b"text too long").await;
    let client = HttpGenerationClient::new(&base_url).expect("client");

    let err = client
        .generate(&request_for("hi"))
        .await
        .expect_err("must fail");
    assert_eq!(err.code(), Some(ErrorCode::Validation));
    assert_eq!(
        err.to_string(),
        "generation service responded with status 422: text too long"
    );
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let client = HttpGenerationClient::with_timeout(
        &format!("http://{addr}"),
        Duration::from_secs(2),
    )
    .expect("client");
    let err = client
        .generate(&request_for("hi"))
        .await
        .expect_err("must fail");
    assert!(matches!(err, GenerateError::Transport(_)));
    assert_eq!(err.code(), None);
}
