mod common;

use std::sync::Arc;
use std::time::Duration;

use chat_core::{ChatEntry, CollectionJob, Filter};
use chat_engine::{
    collect_job, ChatPageFetcher, FailureKind, FetchSettings, JobOutcome, ReqwestFetcher,
};
use common::{init_logging, RecordingSink};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer) -> FetchSettings {
    FetchSettings {
        api_base_url: server.uri(),
        web_base_url: "https://chzzk.example".to_string(),
        ..FetchSettings::default()
    }
}

fn chat(ts: u64, nickname: &str, content: &str) -> serde_json::Value {
    json!({
        "profile": json!({ "nickname": nickname, "userRoleCode": "common_user" }).to_string(),
        "content": content,
        "playerMessageTime": ts,
        "messageTypeCode": 1
    })
}

fn page(chats: Vec<serde_json::Value>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "code": 200,
        "message": null,
        "content": { "videoChats": chats }
    }))
}

#[tokio::test]
async fn fetcher_parses_page_and_sends_cursor() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/videos/6200690/chats"))
        .and(query_param("playerMessageTime", "40000"))
        .and(header("accept", "application/json"))
        .and(header("referer", "https://chzzk.example/video/6200690"))
        .respond_with(page(vec![
            chat(40_000, "A", "hi"),
            json!({ "profile": "{broken", "content": "who", "playerMessageTime": 40_500 }),
        ]))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(settings(&server)).unwrap();
    let entries = fetcher.fetch_page("6200690", 40_000).await.expect("fetch ok");

    assert_eq!(
        entries,
        vec![
            ChatEntry::new(40_000, "A", "hi"),
            ChatEntry::new(40_500, "Unknown", "who"),
        ]
    );
}

#[tokio::test]
async fn fetcher_fails_on_http_status() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(settings(&server)).unwrap();
    let err = fetcher.fetch_page("1", 0).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
}

#[tokio::test]
async fn fetcher_reports_malformed_body() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(settings(&server)).unwrap();
    let err = fetcher.fetch_page("1", 0).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn fetcher_rejects_too_large_response() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/json")
                .set_body_string("{\"content\": {\"videoChats\": []}}"),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings {
        max_page_bytes: 10,
        ..settings(&server)
    })
    .unwrap();
    let err = fetcher.fetch_page("1", 0).await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::TooLarge { max_bytes: 10, .. }));
}

#[tokio::test]
async fn fetcher_times_out_when_configured() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(page(Vec::new()).set_delay(Duration::from_millis(250)))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings {
        request_timeout: Some(Duration::from_millis(50)),
        ..settings(&server)
    })
    .unwrap();
    let err = fetcher.fetch_page("1", 0).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn collection_over_http_follows_cursor_until_empty_page() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/videos/77/chats"))
        .and(query_param("playerMessageTime", "0"))
        .respond_with(page(vec![chat(0, "A", "hi"), chat(10, "B", "yo")]))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/videos/77/chats"))
        .and(query_param("playerMessageTime", "11"))
        .respond_with(page(vec![chat(10, "A", "repeat"), chat(20, "A", "again")]))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/videos/77/chats"))
        .and(query_param("playerMessageTime", "21"))
        .respond_with(page(Vec::new()))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(settings(&server)).unwrap();
    let mut job = CollectionJob::new("77", Arc::new(Filter::new("A", "")));
    let sink = RecordingSink::new();

    let outcome = collect_job(&fetcher, &mut job, 0, &CancellationToken::new(), &sink).await;

    let JobOutcome::Completed(records) = outcome else {
        panic!("expected completion");
    };
    let lines: Vec<String> = records.iter().map(|r| r.display_line()).collect();
    assert_eq!(
        lines,
        vec![
            "00:00:00 - A: hi",
            "00:00:00 - A: repeat",
            "00:00:00 - A: again",
        ]
    );
    assert_eq!(
        records[2].playback_url("https://chzzk.example", "77"),
        "https://chzzk.example/video/77?t=0"
    );
}
