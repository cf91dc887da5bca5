use croscan_common::{CroError, StatusPolicy};
use croscan_web::{FetchOptions, HttpPageFetcher, PageFetcher};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(policy: StatusPolicy, timeout: Duration) -> HttpPageFetcher {
    HttpPageFetcher::new(FetchOptions {
        status_policy: policy,
        timeout,
        ..Default::default()
    })
    .expect("fetcher builds")
}

#[tokio::test]
async fn returns_body_and_sends_browser_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/landing"))
        .and(header("user-agent", "Mozilla/5.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Start free trial</h1>"))
        .expect(1)
        .mount(&server)
        .await;

    let html = fetcher(StatusPolicy::OkOnly, Duration::from_secs(20))
        .fetch(&format!("{}/landing", server.uri()))
        .await
        .unwrap();

    assert_eq!(html, "<h1>Start free trial</h1>");
}

#[tokio::test]
async fn not_found_is_a_fetch_error_and_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let err = fetcher(StatusPolicy::OkOnly, Duration::from_secs(20))
        .fetch(&format!("{}/gone", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, CroError::Fetch { status: Some(404), .. }));
    // `expect(1)` is verified when the server drops.
}

#[tokio::test]
async fn timeout_is_a_fetch_error_and_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .expect(1)
        .mount(&server)
        .await;

    let err = fetcher(StatusPolicy::OkOnly, Duration::from_millis(200))
        .fetch(&format!("{}/slow", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, CroError::Fetch { status: None, .. }));
    assert!(err.to_string().contains("timed out"));
}

#[tokio::test]
async fn ok_only_policy_rejects_other_2xx() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(203).set_body_string("<p>cached</p>"))
        .mount(&server)
        .await;

    let err = fetcher(StatusPolicy::OkOnly, Duration::from_secs(20))
        .fetch(&server.uri())
        .await
        .unwrap_err();
    assert!(matches!(err, CroError::Fetch { status: Some(203), .. }));

    let html = fetcher(StatusPolicy::Success, Duration::from_secs(20))
        .fetch(&server.uri())
        .await
        .unwrap();
    assert_eq!(html, "<p>cached</p>");
}

#[tokio::test]
async fn success_policy_still_rejects_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = fetcher(StatusPolicy::Success, Duration::from_secs(20))
        .fetch(&server.uri())
        .await
        .unwrap_err();

    assert!(matches!(err, CroError::Fetch { status: Some(500), .. }));
}

#[tokio::test]
async fn connection_refused_is_a_fetch_error() {
    // Bind then drop to get a port nothing listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let err = fetcher(StatusPolicy::OkOnly, Duration::from_secs(2))
        .fetch(&format!("http://127.0.0.1:{port}/"))
        .await
        .unwrap_err();

    assert!(matches!(err, CroError::Fetch { status: None, .. }));
}

#[tokio::test]
async fn body_is_decoded_with_the_declared_charset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latin1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"<h1>Caf\xe9</h1>".to_vec(), "text/html; charset=iso-8859-1"),
        )
        .mount(&server)
        .await;

    let html = fetcher(StatusPolicy::OkOnly, Duration::from_secs(20))
        .fetch(&format!("{}/latin1", server.uri()))
        .await
        .unwrap();

    assert_eq!(html, "<h1>Café</h1>");
}

#[tokio::test]
async fn body_without_charset_is_read_as_utf8() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/utf8"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>Crème brûlée</p>", "text/html"))
        .mount(&server)
        .await;

    let html = fetcher(StatusPolicy::OkOnly, Duration::from_secs(20))
        .fetch(&format!("{}/utf8", server.uri()))
        .await
        .unwrap();

    assert_eq!(html, "<p>Crème brûlée</p>");
}
