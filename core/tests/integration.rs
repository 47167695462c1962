//! Fetch scenarios against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, points the client at it through
//! a base URL override, and goes through the real `UreqTransport`. The
//! server's request log is checked to confirm exactly what went over the
//! wire.

use std::net::SocketAddr;

use microcms_core::{ApiError, ClientConfig, ContentList, GetParams, MicroCmsClient};
use mock_server::{MockState, RecordedRequest, RequestLog};
use serde::Deserialize;
use serde_json::json;

const KEY: &str = "key123";
const DRAFT: &str = "draft1";

#[derive(Debug, Deserialize, PartialEq)]
struct Article {
    id: String,
    title: String,
}

fn start_server() -> (SocketAddr, RequestLog) {
    start_server_with(
        MockState::new(KEY)
            .with_global_draft_key(DRAFT)
            .with_content("articles", json!({"id": "abc", "title": "Published"}))
            .with_draft("articles", json!({"id": "wip", "title": "Draft"})),
    )
}

/// Spawn the mock server on its own runtime thread and return its address.
fn start_server_with(state: MockState) -> (SocketAddr, RequestLog) {
    let log = state.request_log();

    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, state).await
        })
        .unwrap();
    });

    (addr, log)
}

fn config(addr: SocketAddr) -> ClientConfig {
    ClientConfig::new("foo", KEY).with_base_url(format!("http://{addr}/api/v1"))
}

#[test]
fn list_without_draft_key() {
    let (addr, log) = start_server();
    let client = MicroCmsClient::new(config(addr)).unwrap();

    let value = client.get_value("articles", &GetParams::new()).unwrap();
    assert_eq!(value["totalCount"], 1);
    assert_eq!(value["contents"][0]["id"], "abc");

    assert_eq!(
        log.snapshot(),
        vec![RecordedRequest {
            method: "GET".to_string(),
            path: "/api/v1/articles".to_string(),
            api_key: Some(KEY.to_string()),
            global_draft_key: None,
        }]
    );
}

#[test]
fn single_item_with_draft_key() {
    let (addr, log) = start_server();
    let client = MicroCmsClient::new(config(addr).with_global_draft_key(DRAFT)).unwrap();

    let article: Article = client
        .get("articles", &GetParams::new().content_id("wip"))
        .unwrap();
    assert_eq!(
        article,
        Article {
            id: "wip".to_string(),
            title: "Draft".to_string(),
        }
    );

    let seen = log.snapshot();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].path, "/api/v1/articles/wip");
    assert_eq!(seen[0].api_key.as_deref(), Some(KEY));
    assert_eq!(seen[0].global_draft_key.as_deref(), Some(DRAFT));
}

#[test]
fn typed_list_decoding() {
    let (addr, _) = start_server();
    let client = MicroCmsClient::new(config(addr).with_global_draft_key(DRAFT)).unwrap();

    let list: ContentList<Article> = client.get("articles", &GetParams::new()).unwrap();
    assert_eq!(list.total_count, 2);
    assert_eq!(list.contents.len(), 2);
}

#[test]
fn draft_hidden_without_key_is_not_found() {
    let (addr, _) = start_server();
    let client = MicroCmsClient::new(config(addr)).unwrap();

    let err = client
        .get_value("articles", &GetParams::new().content_id("wip"))
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
}

#[test]
fn server_error_is_distinguishable() {
    let (addr, _) = start_server();
    let client = MicroCmsClient::new(config(addr)).unwrap();

    let err = client.get_value("broken", &GetParams::new()).unwrap_err();
    assert!(err.is_server_error());
    assert!(matches!(
        err,
        ApiError::Http { status: 500, ref message } if message == "error"
    ));
}

#[test]
fn wrong_api_key_is_client_error() {
    let (addr, _) = start_server();
    let config = ClientConfig::new("foo", "wrong").with_base_url(format!("http://{addr}/api/v1"));
    let client = MicroCmsClient::new(config).unwrap();

    let err = client.get_value("articles", &GetParams::new()).unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(err.is_client_error());
}

#[test]
fn ids_with_reserved_characters_round_trip() {
    let (addr, log) = start_server_with(
        MockState::new(KEY)
            .with_content("articles", json!({"id": "a b", "title": "Spaced"}))
            .with_content("articles", json!({"id": "x?draftKey=1", "title": "Question"}))
            .with_content("articles", json!({"id": "a/b", "title": "Slashed"})),
    );
    let client = MicroCmsClient::new(config(addr)).unwrap();

    for (id, title) in [("a b", "Spaced"), ("x?draftKey=1", "Question"), ("a/b", "Slashed")] {
        let article: Article = client
            .get("articles", &GetParams::new().content_id(id))
            .unwrap();
        assert_eq!(article.id, id);
        assert_eq!(article.title, title);
    }

    let paths: Vec<String> = log.snapshot().into_iter().map(|r| r.path).collect();
    assert_eq!(
        paths,
        vec![
            "/api/v1/articles/a%20b",
            "/api/v1/articles/x%3FdraftKey=1",
            "/api/v1/articles/a%2Fb",
        ]
    );
}

#[test]
fn body_larger_than_ten_megabytes_decodes() {
    let big = "a".repeat(11 * 1024 * 1024);
    let (addr, _) = start_server_with(
        MockState::new(KEY).with_content("archives", json!({"id": "big", "s": big.clone()})),
    );
    let client = MicroCmsClient::new(config(addr)).unwrap();

    let value = client
        .get_value("archives", &GetParams::new().content_id("big"))
        .unwrap();
    assert_eq!(value["s"].as_str().map(str::len), Some(big.len()));
}

#[test]
fn unreachable_server_is_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = ClientConfig::new("foo", KEY).with_base_url(format!("http://127.0.0.1:{port}/api/v1"));
    let client = MicroCmsClient::new(config).unwrap();

    let err = client.get_value("articles", &GetParams::new()).unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
