//! End-to-end tests for the HTTP API over a real socket.

use catch_log::web::serve_on;
use catch_log::{CatchService, MemoryStore, StatsSettings};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn start() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let service = Arc::new(CatchService::new(MemoryStore::new(), StatsSettings::default()));
    tokio::spawn(async move {
        let _ = serve_on(listener, service).await;
    });
    addr
}

async fn send(addr: SocketAddr, raw: String) -> (u16, serde_json::Value) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    let status: u16 = response
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .expect("status code");
    let body = response.split("\r\n\r\n").nth(1).unwrap_or("");
    (status, serde_json::from_str(body).expect("json body"))
}

fn get(path: &str) -> String {
    format!("GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", path)
}

fn post(path: &str, body: &str) -> String {
    format!(
        "POST {} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
        path,
        body.len(),
        body
    )
}

#[tokio::test]
async fn test_health() {
    let addr = start().await;
    let (status, body) = send(addr, get("/health")).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_post_then_rank() {
    let addr = start().await;
    let payload = r#"[
        {"name":"Ola","species":"Laks","weight":5.0,"date":"2022-07-20"},
        {"name":"Ola","species":"Laks","weight":7.0,"date":"2022-07-21"},
        {"name":"Kari","species":"Laks","weight":9.0,"date":"2022-06-16"}
    ]"#;
    let (status, saved) = send(addr, post("/api/data", payload)).await;
    assert_eq!(status, 201);
    assert_eq!(saved.as_array().unwrap().len(), 3);

    let (status, best) = send(addr, get("/api/best-weeks?species=Laks")).await;
    assert_eq!(status, 200);
    let weeks = best["2022"].as_array().unwrap();
    assert_eq!(weeks[0]["startDate"], "07.20");
    assert_eq!(weeks[0]["count"], 2);
    assert_eq!(weeks[0]["averageWeight"], 6.0);
    assert_eq!(weeks[1]["startDate"], "06.15");

    let (status, angler) = send(addr, get("/api/anglers/Ola?species=Laks")).await;
    assert_eq!(status, 200);
    assert_eq!(angler["anglerStats"]["totalWeight"], 12.0);
}

#[tokio::test]
async fn test_missing_species_is_bad_request() {
    let addr = start().await;
    let (status, body) = send(addr, get("/api/yearly")).await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("species"));
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let addr = start().await;
    let (status, _) = send(addr, get("/does-not-exist")).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_body_split_across_writes() {
    let addr = start().await;
    let body = r#"[{"name":"Per","species":"Laks","weight":2.5,"date":"2021-08-01"}]"#;
    let raw = post("/api/data", body);
    let (head, tail) = raw.split_at(raw.len() - 10);

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(head.as_bytes()).await.unwrap();
    stream.flush().await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    stream.write_all(tail.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.starts_with("HTTP/1.1 201 Created"));
}

#[tokio::test]
async fn test_oversize_content_length_is_rejected() {
    let addr = start().await;
    let raw = "POST /api/data HTTP/1.1\r\nHost: localhost\r\nContent-Length: 999999999999\r\n\r\n".to_string();
    let (status, body) = send(addr, raw).await;
    assert_eq!(status, 413);
    assert!(body["error"].is_string());

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"POST /api/data HTTP/1.1\r\nContent-Length: 18446744073709551615\r\n\r\n[]")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.starts_with("HTTP/1.1 413 Payload Too Large"));

    // The server survives and keeps answering.
    let (status, _) = send(addr, get("/health")).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_wrong_method_on_angler_path() {
    let addr = start().await;
    let (status, _) = send(addr, post("/api/anglers/Ola", "")).await;
    assert_eq!(status, 405);
}
