use std::sync::Arc;
use std::time::Duration;

use vuls_engine::{
    FailureKind, FetchSettings, Fetcher, PageFetcher, PageSettings, ReqwestFetcher,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn page_fetcher(server: &MockServer, settings: FetchSettings) -> PageFetcher {
    PageFetcher::new(
        Arc::new(ReqwestFetcher::new(settings).expect("client builds")),
        PageSettings {
            url_template: format!("{}/vulnerability/disclosed/page/{{page}}", server.uri()),
            base_origin: server.uri(),
        },
    )
}

#[tokio::test]
async fn transport_reports_status_and_body_without_judging() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doc"))
        .and(header("user-agent", "ScraperBot/1.0"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>ok</html>", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410).set_body_string("gone"))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default()).expect("client builds");

    let url = format!("{}/doc", server.uri());
    let output = fetcher.fetch(&url).await.expect("fetch ok");
    assert_eq!(output.status, 200);
    assert_eq!(output.body, b"<html>ok</html>");
    assert_eq!(output.final_url, url);
    assert!(output
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("text/html")));

    let output = fetcher
        .fetch(&format!("{}/gone", server.uri()))
        .await
        .expect("non-2xx is still a response");
    assert_eq!(output.status, 410);
}

#[tokio::test]
async fn invalid_url_is_rejected_before_any_request() {
    let fetcher = ReqwestFetcher::new(FetchSettings::default()).expect("client builds");
    let err = fetcher.fetch("::not a url::").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}

#[tokio::test]
async fn page_fetcher_returns_decoded_markup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vulnerability/disclosed/page/3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"caf\xe9".to_vec(), "text/html; charset=ISO-8859-1"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let markup = page_fetcher(&server, FetchSettings::default())
        .fetch_page(3)
        .await
        .expect("page ok");
    assert_eq!(markup, "café");
}

#[tokio::test]
async fn forbidden_is_access_denied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vulnerability/disclosed/page/1"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = page_fetcher(&server, FetchSettings::default())
        .fetch_page(1)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::AccessDenied(403));
}

#[tokio::test]
async fn server_error_is_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = page_fetcher(&server, FetchSettings::default())
        .fetch_page(2)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
}

#[tokio::test]
async fn slow_origin_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let err = page_fetcher(&server, settings)
        .fetch_page(1)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/html")
                .set_body_string("01234567890"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: 10,
        ..FetchSettings::default()
    };
    let fetcher = ReqwestFetcher::new(settings).expect("client builds");
    let err = fetcher
        .fetch(&format!("{}/large", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
}
