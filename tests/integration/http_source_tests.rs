//! Integration tests for the HTTP source and session provider
//!
//! These tests use wiremock to stand in for the remote API.

use chrono::{TimeZone, Utc};
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;
use timeline_harvester::collector::{Collector, PacingPolicy, StopReason};
use timeline_harvester::config::{Credentials, SessionConfig, SourceConfig};
use timeline_harvester::model::{AccountId, Cursor};
use timeline_harvester::session::{FileSessionProvider, Session, SessionError, SessionProvider};
use timeline_harvester::sink::CsvSink;
use timeline_harvester::source::{HttpSource, RemoteSource, SourceError, RATE_LIMIT_RESET_HEADER};
use wiremock::matchers::{body_json, header, method, path, query_param};
use url::Url;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source_config(base_url: &str) -> SourceConfig {
    SourceConfig {
        base_url: base_url.to_string(),
        page_size: 20,
        user_agent: "TestHarvester/1.0".to_string(),
        timeout_secs: 5,
    }
}

fn session_with_token(server: &MockServer) -> Session {
    let session = Session::default();
    let url = Url::parse(&server.uri()).unwrap();
    assert!(session.store_set_cookie("auth_token=secret", &url).unwrap());
    session
}

fn build_source(server: &MockServer) -> HttpSource {
    HttpSource::new(&source_config(&server.uri()), &session_with_token(server)).unwrap()
}

#[tokio::test]
async fn test_resolve_account() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/by-handle/someone"))
        .and(header("cookie", "auth_token=secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "12345"})))
        .expect(1)
        .mount(&server)
        .await;

    let source = build_source(&server);
    let account_id = source.resolve_account("someone").await.unwrap();

    assert_eq!(account_id, AccountId("12345".to_string()));
}

#[tokio::test]
async fn test_resolve_unknown_account() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/by-handle/nobody"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let source = build_source(&server);
    let result = source.resolve_account("nobody").await;

    assert!(matches!(
        result,
        Err(SourceError::NotFound { ref handle }) if handle == "nobody"
    ));
}

#[tokio::test]
async fn test_fetch_first_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/12345/items"))
        .and(query_param("count", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "id": "1",
                    "account": {"id": "12345", "handle": "someone"},
                    "text": "first",
                    "created_at": "2024-05-01T12:30:00Z",
                    "favorite_count": 4,
                    "view_count": null,
                    "hashtags": ["rust"]
                },
                {"id": "2"}
            ],
            "next_cursor": "C1"
        })))
        .mount(&server)
        .await;

    let source = build_source(&server);
    let page = source
        .fetch_first_page(&AccountId("12345".to_string()), 20)
        .await
        .unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page.next_cursor, Some(Cursor::new("C1")));
    assert_eq!(page.items[0].text.as_deref(), Some("first"));
    assert_eq!(
        page.items[0].created_at,
        Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap())
    );
    assert_eq!(page.items[0].favorite_count, Some(4));
    assert_eq!(page.items[0].view_count, None);
    assert_eq!(page.items[1].text, None);
}

#[tokio::test]
async fn test_fetch_next_page_passes_cursor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("cursor", "abc/def=="))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"items": [], "next_cursor": null})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let source = build_source(&server);
    let page = source
        .fetch_next_page(&Cursor::new("abc/def=="))
        .await
        .unwrap();

    assert!(page.is_empty());
    assert!(page.is_terminal());
}

#[tokio::test]
async fn test_rate_limit_reads_reset_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(
            ResponseTemplate::new(429).insert_header(RATE_LIMIT_RESET_HEADER, "1714566600"),
        )
        .mount(&server)
        .await;

    let source = build_source(&server);
    let result = source.fetch_next_page(&Cursor::new("C1")).await;

    match result {
        Err(SourceError::RateLimited(signal)) => {
            assert_eq!(signal.reset_at, Utc.timestamp_opt(1_714_566_600, 0).unwrap());
        }
        other => panic!("expected RateLimited, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rate_limit_without_reset_header_uses_default() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let source = build_source(&server);
    let before = Utc::now();
    let result = source.fetch_next_page(&Cursor::new("C1")).await;

    match result {
        Err(SourceError::RateLimited(signal)) => {
            let ahead = (signal.reset_at - before).num_seconds();
            assert!((59..=61).contains(&ahead), "reset {}s ahead", ahead);
        }
        other => panic!("expected RateLimited, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let source = build_source(&server);
    let result = source.fetch_next_page(&Cursor::new("C1")).await;

    assert!(matches!(
        result,
        Err(SourceError::Status { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let source = build_source(&server);
    let result = source.fetch_next_page(&Cursor::new("C1")).await;

    assert!(matches!(result, Err(SourceError::Decode { .. })));
}

fn session_config(path: &Path, credentials: Option<Credentials>) -> SessionConfig {
    SessionConfig {
        path: path.to_path_buf(),
        credentials,
    }
}

fn test_credentials() -> Credentials {
    Credentials {
        username: "collector".to_string(),
        email: "collector@example.com".to_string(),
        password: "hunter2".to_string(),
    }
}

#[tokio::test]
async fn test_saved_session_is_reused_without_login() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/session/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let cookie_path = dir.path().join("cookies.json");
    session_with_token(&server).save(&cookie_path).await.unwrap();

    let provider = FileSessionProvider::new(
        &session_config(&cookie_path, Some(test_credentials())),
        &source_config(&server.uri()),
    )
    .unwrap();
    let session = provider.authenticate().await.unwrap();

    assert_eq!(
        session.cookie_value("auth_token").unwrap().as_deref(),
        Some("secret")
    );
}

#[tokio::test]
async fn test_login_saves_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/session/login"))
        .and(body_json(json!({
            "username": "collector",
            "email": "collector@example.com",
            "password": "hunter2"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "auth_token=fresh; Path=/; HttpOnly"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let cookie_path = dir.path().join("cookies.json");

    let provider = FileSessionProvider::new(
        &session_config(&cookie_path, Some(test_credentials())),
        &source_config(&server.uri()),
    )
    .unwrap();
    let session = provider.authenticate().await.unwrap();

    assert_eq!(
        session.cookie_value("auth_token").unwrap().as_deref(),
        Some("fresh")
    );
    let saved = Session::load(&cookie_path).await.unwrap();
    assert_eq!(
        saved.cookie_value("auth_token").unwrap().as_deref(),
        Some("fresh")
    );
}

#[tokio::test]
async fn test_forced_login_ignores_saved_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/session/login"))
        .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "auth_token=fresh"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let cookie_path = dir.path().join("cookies.json");
    session_with_token(&server).save(&cookie_path).await.unwrap();

    let provider = FileSessionProvider::new(
        &session_config(&cookie_path, Some(test_credentials())),
        &source_config(&server.uri()),
    )
    .unwrap()
    .force_login(true);
    let session = provider.authenticate().await.unwrap();

    assert_eq!(
        session.cookie_value("auth_token").unwrap().as_deref(),
        Some("fresh")
    );
}

#[tokio::test]
async fn test_login_cookies_reach_source_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/session/login"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("set-cookie", "auth_token=fresh; Path=/"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/by-handle/someone"))
        .and(header("cookie", "auth_token=fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "12345"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let cookie_path = dir.path().join("cookies.json");
    let config = source_config(&server.uri());

    let session = FileSessionProvider::new(
        &session_config(&cookie_path, Some(test_credentials())),
        &config,
    )
    .unwrap()
    .authenticate()
    .await
    .unwrap();

    let source = HttpSource::new(&config, &session).unwrap();
    let account_id = source.resolve_account("someone").await.unwrap();

    assert_eq!(account_id, AccountId("12345".to_string()));
}

#[tokio::test]
async fn test_login_without_cookies() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/session/login"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let cookie_path = dir.path().join("cookies.json");

    let provider = FileSessionProvider::new(
        &session_config(&cookie_path, Some(test_credentials())),
        &source_config(&server.uri()),
    )
    .unwrap();
    let result = provider.authenticate().await;

    assert!(matches!(result, Err(SessionError::NoCookies)));
    assert!(!cookie_path.exists());
}

#[tokio::test]
async fn test_rejected_login() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/session/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let cookie_path = dir.path().join("cookies.json");

    let provider = FileSessionProvider::new(
        &session_config(&cookie_path, Some(test_credentials())),
        &source_config(&server.uri()),
    )
    .unwrap();
    let result = provider.authenticate().await;

    assert!(matches!(result, Err(SessionError::Login { status: 401 })));
    assert!(!cookie_path.exists());
}

#[tokio::test]
async fn test_missing_session_and_credentials() {
    let dir = TempDir::new().unwrap();
    let cookie_path = dir.path().join("cookies.json");

    let provider = FileSessionProvider::new(
        &session_config(&cookie_path, None),
        &source_config("https://api.example.com/"),
    )
    .unwrap();
    let result = provider.authenticate().await;

    assert!(matches!(result, Err(SessionError::MissingCredentials)));
}

#[tokio::test]
async fn test_full_harvest_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/by-handle/someone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "12345"})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/12345/items"))
        .and(query_param("count", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "1", "text": "hello"}, {"id": "2", "location": "Berlin"}],
            "next_cursor": "C1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("cursor", "C1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"items": [], "next_cursor": null})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("someone.csv");

    let source = build_source(&server);
    let sink = CsvSink::create(&output).unwrap();
    let mut collector = Collector::new(source, sink, PacingPolicy::immediate()).with_page_size(2);

    let summary = collector.run("someone", 100).await.unwrap();

    assert_eq!(summary.items_collected, 2);
    assert_eq!(summary.stop_reason, StopReason::EmptyPage);
    assert_eq!(summary.account_id, Some(AccountId("12345".to_string())));

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][4], "hello");
    assert_eq!(&rows[1][13], "Berlin");
    assert_eq!(&rows[1][4], "");
}
