use std::sync::{Arc, Once};
use std::time::Duration;

use vuls_engine::{
    EngineCommand, EngineEvent, EngineHandle, FeedCrawler, FetchSettings, PageSettings,
    PageSource,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(vuls_logging::initialize_for_tests);
}

const WAIT: Duration = Duration::from_secs(5);

const LISTING: &str = r#"<div class="title tx-overflow-ellipsis"><a href="/vulnerability/ZD-2024-00100">Live entry</a></div>"#;

#[tokio::test(flavor = "multi_thread")]
async fn handle_loads_pages_in_background() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page/1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(LISTING, "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page/2"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let crawler = Arc::new(FeedCrawler::with_settings(
        FetchSettings::default(),
        PageSettings {
            url_template: format!("{}/page/{{page}}", server.uri()),
            base_origin: server.uri(),
        },
    )
    .expect("client builds"));
    let handle = EngineHandle::new(crawler).expect("engine starts");

    handle.load(1, 1);
    let event = tokio::task::block_in_place(|| handle.recv_timeout(WAIT)).expect("event");
    let EngineEvent::PageLoaded { request, load } = event;
    assert_eq!(request, 1);
    assert_eq!(load.source, PageSource::Live);
    assert_eq!(load.entries[0].title(), "Live entry");

    handle.load(2, 2);
    let event = tokio::task::block_in_place(|| handle.recv_timeout(WAIT)).expect("event");
    let EngineEvent::PageLoaded { request, load } = event;
    assert_eq!(request, 2);
    assert_eq!(load.source, PageSource::Demo);
    assert!(handle.crawler().is_degraded());

    handle.send(EngineCommand::ResetDegraded);
    handle.send(EngineCommand::ClearCache);
    handle.refresh(3, 1);
    let event = tokio::task::block_in_place(|| handle.recv_timeout(WAIT)).expect("event");
    let EngineEvent::PageLoaded { request, load } = event;
    assert_eq!(request, 3);
    assert_eq!(load.source, PageSource::Live);
    assert!(!load.degraded);
}
