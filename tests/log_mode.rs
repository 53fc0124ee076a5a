//! End-to-end tests for the logging endpoint.

use std::time::{Duration, Instant};

use httpr::config::{LogFormat, ServerConfig};

mod common;

use common::{client, TestServer};

#[tokio::test]
async fn test_raw_log_with_defaults() {
    let server = TestServer::start(ServerConfig::default()).await;

    let res = client()
        .post(server.url("/orders?id=7"))
        .header("x-trace", "abc")
        .body("payload")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "text/plain; charset=utf-8");
    assert!(res.text().await.unwrap().is_empty());

    let logged = server.logged();
    assert!(logged.starts_with("Remote address: 127.0.0.1:"));
    assert!(logged.contains("POST /orders?id=7 HTTP/1.1"));
    assert!(logged.contains("x-trace: abc"));
    assert!(logged.contains("payload"));
}

#[tokio::test]
async fn test_response_code_and_echo() {
    let mut config = ServerConfig::default();
    config.response_code = 418;
    config.echo = true;
    let server = TestServer::start(config).await;

    let res = client().get(server.url("/brew")).send().await.unwrap();

    assert_eq!(res.status(), 418);
    let body = res.text().await.unwrap();
    assert!(body.contains("GET /brew HTTP/1.1"));
    assert_eq!(body, server.logged());
}

#[tokio::test]
async fn test_pretty_json_echo() {
    let mut config = ServerConfig::default();
    config.log_format = LogFormat::JsonPretty;
    config.echo = true;
    let server = TestServer::start(config).await;

    let res = client()
        .put(server.url("/items/3"))
        .body("{\"n\":3}")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "application/json");
    let record: serde_json::Value = res.json().await.unwrap();
    assert_eq!(record["method"], "PUT");
    assert_eq!(record["url"], "/items/3");
    assert_eq!(record["content_length"], 7);
    assert_eq!(record["body"], "{\"n\":3}");
    assert!(server.logged().contains("\n    \"method\": \"PUT\""));
}

#[tokio::test]
async fn test_failure_cycle_is_never_echoed() {
    let mut config = ServerConfig::default();
    config.echo = true;
    config.failure.enabled = true;
    config.failure.failure_count = 2;
    config.failure.success_count = 1;
    config.failure.failure_code = 502;
    let server = TestServer::start(config).await;

    let client = client();
    let mut seen = Vec::new();
    for _ in 0..6 {
        let res = client.get(server.url("/")).send().await.unwrap();
        let status = res.status().as_u16();
        let body = res.text().await.unwrap();
        if status == 502 {
            assert!(body.is_empty());
        } else {
            assert!(body.contains("GET / HTTP/1.1"));
        }
        seen.push(status);
    }

    assert_eq!(seen, vec![502, 502, 200, 502, 502, 200]);
    assert_eq!(server.logged().matches("GET / HTTP/1.1").count(), 6);
}

#[tokio::test]
async fn test_delay_applies_to_responses() {
    let mut config = ServerConfig::default();
    config.delay_ms = 300;
    let server = TestServer::start(config).await;

    let started = Instant::now();
    let res = client().get(server.url("/")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(started.elapsed() >= Duration::from_millis(300));
}
