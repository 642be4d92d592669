mod common;

use leader_http::{Credentials, FetchError, FetchRequest, USER_AGENT, fetch_page};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve(route: &str, template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .expect(1)
        .mount(&server)
        .await;
    server
}

async fn only_request(server: &MockServer) -> wiremock::Request {
    let mut received = server.received_requests().await.expect("recording enabled");
    assert_eq!(received.len(), 1, "exactly one round trip");
    received.remove(0)
}

#[tokio::test]
async fn returns_body_with_fixed_user_agent_and_no_auth() {
    common::init_test_tracing();
    let server = serve("/7.html", ResponseTemplate::new(200).set_body_string("hello radio")).await;

    let body = fetch_page(&FetchRequest::new(format!("{}/7.html", server.uri())))
        .await
        .expect("fetch");
    assert_eq!(body, "hello radio");

    let request = only_request(&server).await;
    let ua = request.headers.get("user-agent").expect("user agent");
    assert_eq!(ua.to_str().unwrap(), USER_AGENT);
    assert!(request.headers.get("authorization").is_none());
}

#[tokio::test]
async fn applies_basic_auth_when_both_credentials_present() {
    common::init_test_tracing();
    let server = serve("/admin.cgi", ResponseTemplate::new(200).set_body_string("<ok/>")).await;

    let req = FetchRequest::new(format!("{}/admin.cgi", server.uri()))
        .with_credentials(Credentials::new("admin", "secret"));
    fetch_page(&req).await.expect("fetch");

    let request = only_request(&server).await;
    let auth = request.headers.get("authorization").expect("auth header");
    assert_eq!(auth.to_str().unwrap(), "Basic YWRtaW46c2VjcmV0");
}

#[tokio::test]
async fn half_configured_credentials_send_no_auth() {
    common::init_test_tracing();
    let server = serve("/admin.cgi", ResponseTemplate::new(200).set_body_string("<ok/>")).await;

    let req = FetchRequest::new(format!("{}/admin.cgi", server.uri()))
        .with_credentials(Credentials::new("admin", ""));
    fetch_page(&req).await.expect("fetch");

    let request = only_request(&server).await;
    assert!(request.headers.get("authorization").is_none());
}

#[tokio::test]
async fn error_status_still_returns_the_page() {
    common::init_test_tracing();
    let server = serve("/missing", ResponseTemplate::new(404).set_body_string("not here")).await;

    let body = FetchRequest::new(format!("{}/missing", server.uri()))
        .send()
        .await
        .expect("status codes are not interpreted");
    assert_eq!(body, "not here");
}

#[tokio::test]
async fn silent_server_times_out_as_transport_error() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;

    let req = FetchRequest::new(format!("{}/slow", server.uri()))
        .with_connect_timeout(Duration::from_millis(500))
        .with_io_timeout(Duration::from_millis(500));

    let started = Instant::now();
    let err = fetch_page(&req).await.expect_err("must time out");
    let elapsed = started.elapsed();

    assert!(matches!(err, FetchError::Transport(_)), "got {err:?}");
    assert!(
        elapsed < Duration::from_secs(5),
        "took {elapsed:?}, expected roughly one second"
    );
}

#[tokio::test]
async fn io_deadline_does_not_wait_for_connect_budget() {
    common::init_test_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // Accept and read the request, then never answer.
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let _ = socket.read(&mut buf).await;
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(socket);
    });

    let req = FetchRequest::new(format!("http://{addr}/7.html"))
        .with_connect_timeout(Duration::from_secs(3))
        .with_io_timeout(Duration::from_millis(500));

    let started = Instant::now();
    let err = fetch_page(&req).await.expect_err("server never answers");
    let elapsed = started.elapsed();

    assert!(matches!(err, FetchError::Transport(_)), "got {err:?}");
    assert!(
        elapsed < Duration::from_millis(1500),
        "took {elapsed:?}, expected close to the 500ms io timeout"
    );
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    common::init_test_tracing();
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = fetch_page(&FetchRequest::new(format!("http://127.0.0.1:{port}/")))
        .await
        .expect_err("nobody is listening");
    assert!(matches!(err, FetchError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn truncated_body_is_body_read_error() {
    common::init_test_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let _ = socket.read(&mut buf).await;
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nshort")
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });

    let err = fetch_page(&FetchRequest::new(format!("http://{addr}/")))
        .await
        .expect_err("body is short");
    assert!(matches!(err, FetchError::BodyRead(_)), "got {err:?}");
}

#[tokio::test]
async fn malformed_url_is_request_build_error() {
    common::init_test_tracing();
    for target in ["not a url", "ftp://files.example.com/x", ""] {
        let err = fetch_page(&FetchRequest::new(target))
            .await
            .expect_err("cannot build");
        assert!(matches!(err, FetchError::RequestBuild(_)), "{target:?} gave {err:?}");
    }
}
