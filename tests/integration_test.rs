//! Tests de integración para el servidor de libros
//! tests/integration_test.rs
//!
//! Cada test levanta su propio servidor en un puerto efímero
//! (`127.0.0.1:0`) con un store en memoria y le habla HTTP crudo por TCP.

use books_server::config::Config;
use books_server::server::Server;
use books_server::store::{BookStore, SqliteBookStore};
use flate2::read::GzDecoder;
use serde_json::{json, Value};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Response parseada: status, headers (nombre en minúsculas) y body crudo
struct HttpReply {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl HttpReply {
    fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("body should be JSON")
    }
}

/// Helper: levanta un servidor en background y retorna su dirección
fn start_server(gzip_min_bytes: usize) -> SocketAddr {
    let mut config = Config::default();
    config.port = 0;
    config.db_path = ":memory:".to_string();
    config.gzip_min_bytes = gzip_min_bytes;
    config.max_body_bytes = 4096;

    let store: Arc<dyn BookStore> =
        Arc::new(SqliteBookStore::open(&config.db_path).expect("in-memory store"));
    let mut server = Server::new(config, store).expect("router should build");
    let addr = server.bind().expect("bind to ephemeral port");

    thread::spawn(move || {
        let _ = server.run();
    });

    addr
}

/// Helper: envía un request HTTP crudo y retorna la response parseada
fn send(addr: SocketAddr, method: &str, path: &str, headers: &[(&str, &str)], body: Option<&str>) -> HttpReply {
    let mut stream = TcpStream::connect(addr).expect("connect");
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    stream.set_write_timeout(Some(Duration::from_secs(5))).unwrap();

    let mut request = format!("{} {} HTTP/1.0\r\n", method, path);
    for (name, value) in headers {
        request.push_str(&format!("{}: {}\r\n", name, value));
    }
    if let Some(body) = body {
        request.push_str("Content-Type: application/json\r\n");
        request.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    request.push_str("\r\n");
    if let Some(body) = body {
        request.push_str(body);
    }

    stream.write_all(request.as_bytes()).unwrap();
    stream.flush().unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).unwrap();
    parse_reply(&raw)
}

fn parse_reply(raw: &[u8]) -> HttpReply {
    let split = raw
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .expect("response should have a header terminator");
    let head = String::from_utf8_lossy(&raw[..split]).into_owned();
    let mut lines = head.split("\r\n");

    let status_line = lines.next().unwrap();
    assert!(status_line.starts_with("HTTP/1.0 "), "status line: {status_line}");
    let status = status_line[9..12].parse().unwrap();

    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();

    HttpReply {
        status,
        headers,
        body: raw[split + 4..].to_vec(),
    }
}

fn get(addr: SocketAddr, path: &str) -> HttpReply {
    send(addr, "GET", path, &[], None)
}

#[test]
fn test_full_crud_flow() {
    let addr = start_server(0);

    let created = send(
        addr,
        "POST",
        "/books",
        &[],
        Some(r#"{"title":"Dune","author":"Herbert","year":1965}"#),
    );
    assert_eq!(created.status, 201);
    assert_eq!(
        created.json(),
        json!({"id": 1, "title": "Dune", "author": "Herbert", "year": 1965})
    );
    assert_eq!(created.header("Location"), Some("/books/1"));
    assert_eq!(created.header("Connection"), Some("close"));
    assert!(created.header("X-Request-Id").is_some());

    let listed = get(addr, "/books");
    assert_eq!(listed.status, 200);
    assert_eq!(
        listed.json(),
        json!([{"id": 1, "title": "Dune", "author": "Herbert", "year": 1965}])
    );

    let updated = send(addr, "PUT", "/books/1", &[], Some(r#"{"year":1966}"#));
    assert_eq!(updated.status, 200);
    assert_eq!(updated.json()["year"], 1966);
    assert_eq!(updated.json()["title"], "Dune");

    let fetched = get(addr, "/books/1");
    assert_eq!(fetched.json()["year"], 1966);

    let deleted = send(addr, "DELETE", "/books/1", &[], None);
    assert_eq!(deleted.status, 200);
    assert_eq!(deleted.json(), json!({"message": "Book deleted"}));

    let missing = get(addr, "/books/1");
    assert_eq!(missing.status, 404);
    assert!(missing.json()["error"].is_string());

    assert_eq!(get(addr, "/books").json(), json!([]));
}

#[test]
fn test_filter_by_author() {
    let addr = start_server(0);

    for body in [
        r#"{"title":"Dune","author":"Herbert","year":1965}"#,
        r#"{"title":"Emma","author":"Austen","year":1815}"#,
        r#"{"title":"Children of Dune","author":"Herbert","year":"1976"}"#,
    ] {
        assert_eq!(send(addr, "POST", "/books", &[], Some(body)).status, 201);
    }

    let herbert = get(addr, "/books?author=Herbert").json();
    let titles: Vec<&str> = herbert
        .as_array()
        .unwrap()
        .iter()
        .map(|book| book["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Dune", "Children of Dune"]);
    assert_eq!(herbert[1]["year"], 1976);

    assert_eq!(get(addr, "/books?author=Nobody").json(), json!([]));
    assert_eq!(get(addr, "/books?author=herbert").json(), json!([]));
}

#[test]
fn test_invalid_input_persists_nothing() {
    let addr = start_server(0);

    for body in [
        r#"{"author":"Herbert","year":1965}"#,
        r#"{"title":"","author":"Herbert","year":1965}"#,
        r#"{"title":"Dune","year":1965}"#,
        r#"{"title":"Dune","author":"Herbert"}"#,
        r#"{"title":"Dune","author":"Herbert","year":"abc"}"#,
        r#"{"title":"Dune","author":"Herbert","year":19.5}"#,
        r#"["Dune"]"#,
        "not json",
    ] {
        let reply = send(addr, "POST", "/books", &[], Some(body));
        assert_eq!(reply.status, 400, "body {body}");
        assert!(reply.json()["error"].is_string());
    }

    let no_body = send(addr, "POST", "/books", &[], None);
    assert_eq!(no_body.status, 400);

    assert_eq!(get(addr, "/books").json(), json!([]));
}

#[test]
fn test_update_validation_and_unknown_id() {
    let addr = start_server(0);
    send(
        addr,
        "POST",
        "/books",
        &[],
        Some(r#"{"title":"Dune","author":"Herbert","year":1965}"#),
    );

    let bad_year = send(addr, "PUT", "/books/1", &[], Some(r#"{"year":"abc"}"#));
    assert_eq!(bad_year.status, 400);

    let empty_title = send(addr, "PUT", "/books/1", &[], Some(r#"{"title":""}"#));
    assert_eq!(empty_title.status, 400);

    let unknown = send(addr, "PUT", "/books/42", &[], Some(r#"{"year":2000}"#));
    assert_eq!(unknown.status, 404);

    assert_eq!(get(addr, "/books/1").json()["year"], 1965);
    assert_eq!(send(addr, "DELETE", "/books/42", &[], None).status, 404);
}

#[test]
fn test_home_redirects_to_books() {
    let addr = start_server(0);
    let reply = get(addr, "/");

    assert_eq!(reply.status, 302);
    assert_eq!(reply.header("Location"), Some("/books"));
}

#[test]
fn test_unknown_route_and_method() {
    let addr = start_server(0);

    assert_eq!(get(addr, "/authors").status, 404);
    assert_eq!(get(addr, "/books/abc").status, 404);

    let reply = send(addr, "DELETE", "/books", &[], None);
    assert_eq!(reply.status, 405);
    assert_eq!(reply.header("Allow"), Some("GET, POST, HEAD"));
}

#[test]
fn test_malformed_request_is_400() {
    let addr = start_server(0);

    let mut stream = TcpStream::connect(addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    stream.write_all(b"PATCH /books HTTP/1.0\r\n\r\n").unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).unwrap();
    let reply = parse_reply(&raw);

    assert_eq!(reply.status, 400);
    assert!(reply.json()["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request"));
}

#[test]
fn test_oversized_body_is_413() {
    let addr = start_server(0);

    // Se declara un Content-Length mayor al límite; el servidor responde
    // antes de leer el body
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    stream
        .write_all(b"POST /books HTTP/1.0\r\nContent-Length: 999999\r\n\r\n{}")
        .unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).unwrap();
    assert_eq!(parse_reply(&raw).status, 413);

    assert_eq!(get(addr, "/books").json(), json!([]));
}

#[test]
fn test_large_upload_receives_complete_413() {
    let addr = start_server(0);
    let title = "x".repeat(400 * 1024);
    let body = format!(r#"{{"title":"{}","author":"A","year":1}}"#, title);

    let reply = send(addr, "POST", "/books", &[], Some(&body));

    assert_eq!(reply.status, 413);
    assert_eq!(reply.header("Connection"), Some("close"));
    assert!(reply.json()["error"]
        .as_str()
        .unwrap()
        .contains("Request exceeds 4096 bytes"));
    assert_eq!(get(addr, "/books").json(), json!([]));
}

#[test]
fn test_percent_encoded_path() {
    let addr = start_server(0);
    send(
        addr,
        "POST",
        "/books",
        &[],
        Some(r#"{"title":"Dune","author":"Herbert","year":1965}"#),
    );

    let reply = get(addr, "/books/%31");
    assert_eq!(reply.status, 200);
    assert_eq!(reply.json()["title"], "Dune");
}

#[test]
fn test_etag_and_if_none_match() {
    let addr = start_server(0);
    send(
        addr,
        "POST",
        "/books",
        &[],
        Some(r#"{"title":"Dune","author":"Herbert","year":1965}"#),
    );

    let first = get(addr, "/books/1");
    let etag = first.header("ETag").expect("ETag on 200").to_string();

    let cached = send(addr, "GET", "/books/1", &[("If-None-Match", &etag)], None);
    assert_eq!(cached.status, 304);
    assert!(cached.body.is_empty());

    let stale = send(addr, "GET", "/books/1", &[("If-None-Match", "\"stale\"")], None);
    assert_eq!(stale.status, 200);
}

#[test]
fn test_head_returns_headers_only() {
    let addr = start_server(0);
    let reply = send(addr, "HEAD", "/books", &[], None);

    assert_eq!(reply.status, 200);
    assert_eq!(reply.header("Content-Length"), Some("2"));
    assert!(reply.body.is_empty());
}

#[test]
fn test_gzip_listing() {
    let addr = start_server(64);

    for i in 0..10 {
        let body = format!(r#"{{"title":"Book {}","author":"Author","year":{}}}"#, i, 1900 + i);
        assert_eq!(send(addr, "POST", "/books", &[], Some(&body)).status, 201);
    }

    let plain = get(addr, "/books");
    assert_eq!(plain.header("Content-Encoding"), None);

    let compressed = send(addr, "GET", "/books", &[("Accept-Encoding", "gzip, deflate")], None);
    assert_eq!(compressed.status, 200);
    assert_eq!(compressed.header("Content-Encoding"), Some("gzip"));
    assert_eq!(compressed.header("Vary"), Some("Accept-Encoding"));

    let mut decoded = Vec::new();
    GzDecoder::new(compressed.body.as_slice())
        .read_to_end(&mut decoded)
        .unwrap();
    assert_eq!(decoded, plain.body);
}

#[test]
fn test_concurrent_creates_get_distinct_ids() {
    let addr = start_server(0);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            thread::spawn(move || {
                let body = format!(r#"{{"title":"T{}","author":"A","year":2000}}"#, i);
                send(addr, "POST", "/books", &[], Some(&body)).json()["id"]
                    .as_i64()
                    .unwrap()
            })
        })
        .collect();

    let mut ids: Vec<i64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    ids.sort_unstable();
    ids.dedup();

    assert_eq!(ids.len(), 8);
    assert_eq!(get(addr, "/books").json().as_array().unwrap().len(), 8);
}
