//! Integration tests for the proxy router
#![allow(clippy::expect_used)]

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use application::ports::{ProxyRequest, ProxyResponse, TransportError, TransportPort};
use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    http::{Request, StatusCode, header},
};
use axum_test::TestServer;
use domain::{DelaySpec, Destination, DropProbability, FaultConfig, Seed};
use infrastructure::ReqwestTransport;
use presentation_http::{AppState, ReverseProxy, create_app, create_router, serve_until};
use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header as header_matcher, method, path},
};

/// Transport that records outbound requests and answers with a fixed result
struct RecordingTransport {
    requests: Mutex<Vec<ProxyRequest>>,
    failure: Option<TransportError>,
}

impl RecordingTransport {
    fn ok() -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            failure: None,
        })
    }

    fn failing(err: TransportError) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            failure: Some(err),
        })
    }

    fn count(&self) -> usize {
        self.requests.lock().expect("lock").len()
    }

    fn last_uri_and_host(&self) -> (String, Option<String>) {
        let requests = self.requests.lock().expect("lock");
        let last = requests.last().expect("no request recorded");
        (
            last.uri().to_string(),
            last.headers()
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string),
        )
    }
}

#[async_trait]
impl TransportPort for RecordingTransport {
    async fn round_trip(&self, request: ProxyRequest) -> Result<ProxyResponse, TransportError> {
        let body = request.body().clone();
        self.requests.lock().expect("lock").push(request);
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        let mut response = ProxyResponse::new(body);
        *response.status_mut() = StatusCode::ACCEPTED;
        response
            .headers_mut()
            .insert("x-upstream", "recorded".parse().expect("header"));
        Ok(response)
    }
}

fn destination(url: &str) -> Destination {
    Destination::parse(url).expect("valid destination")
}

fn state_with(config: FaultConfig, inner: Arc<dyn TransportPort>) -> AppState {
    AppState::new(ReverseProxy::assemble(config, inner))
}

fn passthrough_state(inner: Arc<dyn TransportPort>) -> AppState {
    state_with(FaultConfig::passthrough(destination("http://backend:3000")), inner)
}

fn create_test_server(state: AppState) -> TestServer {
    TestServer::new(create_app(state)).expect("Failed to create test server")
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

// ============ Router Tests ============

#[tokio::test]
async fn passthrough_returns_upstream_response() {
    let transport = RecordingTransport::ok();
    let server = create_test_server(passthrough_state(transport.clone()));

    let response = server.post("/echo").text("hello upstream").await;

    response.assert_status(StatusCode::ACCEPTED);
    assert_eq!(response.text(), "hello upstream");
    assert_eq!(response.header("x-upstream"), "recorded");
    assert_eq!(transport.count(), 1);
}

#[tokio::test]
async fn any_method_and_path_is_forwarded() {
    let transport = RecordingTransport::ok();
    let server = create_test_server(passthrough_state(transport.clone()));

    server.get("/").await.assert_status(StatusCode::ACCEPTED);
    server.put("/a/b/c").await.assert_status(StatusCode::ACCEPTED);
    server.delete("/items/7").await.assert_status(StatusCode::ACCEPTED);
    server.patch("/x?y=z").await.assert_status(StatusCode::ACCEPTED);

    assert_eq!(transport.count(), 4);
    let (uri, _) = transport.last_uri_and_host();
    assert_eq!(uri, "http://backend:3000/x?y=z");
}

#[tokio::test]
async fn rewrite_keeps_client_host() {
    let transport = RecordingTransport::ok();
    let app = create_router(passthrough_state(transport.clone()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/status?verbose=1")
                .header(header::HOST, "client.example")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let (uri, host) = transport.last_uri_and_host();
    assert_eq!(uri, "http://backend:3000/v1/status?verbose=1");
    assert_eq!(host.as_deref(), Some("client.example"));
}

#[tokio::test]
async fn always_drop_never_reaches_transport() {
    let transport = RecordingTransport::ok();
    let config = FaultConfig::builder(destination("http://backend:3000"))
        .drop_probability(DropProbability::ALWAYS)
        .build();
    let state = state_with(config, transport.clone());
    let proxy = state.proxy.clone();
    let server = create_test_server(state);

    for _ in 0..5 {
        let response = server.get("/anything").await;
        response.assert_status(StatusCode::GATEWAY_TIMEOUT);
        assert!(response.text().is_empty());
    }

    assert_eq!(transport.count(), 0);
    let stats = proxy.transport().stats();
    assert_eq!(stats.dropped, 5);
    assert_eq!(stats.forwarded, 0);
}

#[tokio::test]
async fn forwarding_error_is_bad_gateway() {
    let transport = RecordingTransport::failing(TransportError::Connect("refused".into()));
    let server = create_test_server(passthrough_state(transport.clone()));

    let response = server.get("/").await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    assert!(response.text().is_empty());
    assert_eq!(transport.count(), 1);
}

#[tokio::test]
async fn declared_oversized_body_is_rejected() {
    let transport = RecordingTransport::ok();
    let state = passthrough_state(transport.clone()).with_max_body_bytes(8);
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/upload")
                .header(header::CONTENT_LENGTH, "32")
                .body(Body::from(vec![b'x'; 32]))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(transport.count(), 0);
}

#[tokio::test]
async fn undeclared_oversized_body_is_rejected() {
    let transport = RecordingTransport::ok();
    let state = passthrough_state(transport.clone()).with_max_body_bytes(8);
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/upload")
                .header(header::TRANSFER_ENCODING, "chunked")
                .body(Body::from(vec![b'x'; 32]))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body_text(response).await.is_empty());
    assert_eq!(transport.count(), 0);
}

#[tokio::test]
async fn body_within_limit_is_forwarded() {
    let transport = RecordingTransport::ok();
    let state = passthrough_state(transport.clone()).with_max_body_bytes(8);
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/upload")
                .body(Body::from("12345678"))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(body_text(response).await, "12345678");
    assert_eq!(transport.count(), 1);
}

#[tokio::test]
async fn shutdown_aborts_request_in_pre_delay() {
    let transport = RecordingTransport::ok();
    // A vanishing rate always clamps to the maximum
    let config = FaultConfig::builder(destination("http://backend:3000"))
        .pre_delay(DelaySpec::from_millis(1e-12, 30_000).expect("spec"))
        .seed(Seed::new(1))
        .build();
    let state = state_with(config, transport.clone());
    let shutdown = state.shutdown.clone();
    let app = create_router(state);

    let pending = tokio::spawn(async move {
        app.oneshot(
            Request::builder()
                .uri("/slow")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response")
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    let start = Instant::now();
    shutdown.cancel();

    let response = tokio::time::timeout(Duration::from_secs(5), pending)
        .await
        .expect("request not aborted")
        .expect("task panicked");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(transport.count(), 0);
}

// ============ End-to-End Tests ============

fn reqwest_state(
    destination_url: &str,
    configure: impl FnOnce(FaultConfig) -> FaultConfig,
) -> AppState {
    let config = configure(FaultConfig::passthrough(destination(destination_url)));
    let inner = Arc::new(ReqwestTransport::new().expect("client"));
    state_with(config, inner)
}

#[tokio::test]
async fn destination_observes_client_host() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/whoami"))
        .respond_with(|request: &wiremock::Request| {
            let host = request
                .headers
                .get("host")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            ResponseTemplate::new(200).set_body_string(host)
        })
        .expect(1)
        .mount(&upstream)
        .await;

    let app = create_router(reqwest_state(&upstream.uri(), |c| c));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/whoami")
                .header(header::HOST, "client.example")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "client.example");
}

#[tokio::test]
async fn passthrough_is_transparent_and_fast() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(header_matcher("x-trace", "t-1"))
        .respond_with(
            ResponseTemplate::new(418)
                .insert_header("x-kettle", "on")
                .set_body_bytes(Bytes::from_static(b"\x00binary\xffbody").to_vec()),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let app = create_router(reqwest_state(&format!("{}/api", upstream.uri()), |c| c));

    let start = Instant::now();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/orders")
                .header("x-trace", "t-1")
                .body(Body::from("{}"))
                .expect("request"),
        )
        .await
        .expect("response");
    let elapsed = start.elapsed();

    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(response.headers()["x-kettle"], "on");
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"\x00binary\xffbody");
    assert!(elapsed < Duration::from_secs(1), "proxy took {elapsed:?}");
}

#[tokio::test]
async fn unreachable_destination_is_bad_gateway() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let app = create_router(reqwest_state(&format!("http://{addr}"), |c| c));
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn drop_all_leaves_destination_untouched() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let app = create_router(reqwest_state(&upstream.uri(), |c| {
        FaultConfig::builder(c.destination().clone())
            .drop_probability(DropProbability::ALWAYS)
            .build()
    }));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn serves_over_tcp_until_cancelled() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .and(header_matcher("host", "client.example"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .expect(2)
        .mount(&upstream)
        .await;

    let state = reqwest_state(&upstream.uri(), |c| c);
    let shutdown = state.shutdown.clone();
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let server = tokio::spawn(serve_until(listener, state, Some(Duration::from_secs(2))));

    let client = reqwest::Client::new();
    for _ in 0..2 {
        let response = client
            .get(format!("http://{addr}/ping"))
            .header(header::HOST, "client.example")
            .send()
            .await
            .expect("proxy reachable");
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert_eq!(response.text().await.expect("body"), "pong");
    }

    shutdown.cancel();
    let stats = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not stop")
        .expect("server task panicked")
        .expect("server error");

    assert_eq!(stats.total_requests, 2);
    assert_eq!(stats.forwarded, 2);
    assert_eq!(stats.dropped, 0);
}

#[tokio::test]
async fn client_disconnect_abandons_delayed_request() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    // A vanishing rate always clamps to the maximum
    let state = reqwest_state(&upstream.uri(), |c| {
        FaultConfig::builder(c.destination().clone())
            .pre_delay(DelaySpec::from_millis(1e-12, 1_500).expect("spec"))
            .seed(Seed::new(3))
            .build()
    });
    let shutdown = CancellationToken::new();
    let state = state.with_shutdown(shutdown.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let server = tokio::spawn(serve_until(listener, state, Some(Duration::from_secs(2))));

    let mut stream = TcpStream::connect(addr).await.expect("connect");
    stream
        .write_all(b"GET /slow HTTP/1.1\r\nHost: client.example\r\n\r\n")
        .await
        .expect("write request");
    tokio::time::sleep(Duration::from_millis(200)).await;
    drop(stream);

    // Outlast the pre-delay so a leaked request would have been forwarded
    tokio::time::sleep(Duration::from_millis(2_500)).await;

    shutdown.cancel();
    let stats = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not stop")
        .expect("server task panicked")
        .expect("server error");

    assert_eq!(stats.total_requests, 1);
    assert_eq!(stats.forwarded, 0);
    assert_eq!(stats.cancelled, 0);
}
