// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests panic on failure

//! HTTP submission tests against a minimal local responder.

use crossbeam::channel::{self, Receiver};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;
use tsimport::{BatchSink, HttpSink, ImportConfig, Importer, SubmitError, TimeSeries};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// One request as seen by the responder.
#[derive(Debug)]
struct Captured {
    request_line: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Captured {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Serve one connection per scripted response, then exit.
fn spawn_responder(responses: Vec<(u16, &'static str)>) -> (String, Receiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind responder");
    let addr = listener.local_addr().expect("local addr");
    let (tx, rx) = channel::unbounded();

    thread::spawn(move || {
        for (status, body) in responses {
            let Ok((stream, _)) = listener.accept() else {
                return;
            };
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

            let mut request_line = String::new();
            reader.read_line(&mut request_line).expect("request line");

            let mut headers = Vec::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).expect("header line");
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((k, v)) = line.split_once(':') {
                    headers.push((k.trim().to_string(), v.trim().to_string()));
                }
            }

            let len = headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, v)| v.parse::<usize>().ok())
                .unwrap_or(0);
            let mut request_body = vec![0u8; len];
            reader.read_exact(&mut request_body).expect("request body");

            let _ = tx.send(Captured {
                request_line: request_line.trim_end().to_string(),
                headers,
                body: request_body,
            });

            let response = if status == 204 {
                "HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n".to_string()
            } else {
                format!(
                    "HTTP/1.1 {} Status\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                )
            };
            let mut stream = stream;
            stream.write_all(response.as_bytes()).expect("write response");
            stream.flush().expect("flush response");
        }
    });

    (format!("http://{}", addr), rx)
}

fn config(base_url: &str) -> ImportConfig {
    ImportConfig::default()
        .with_base_url(base_url)
        .with_timeout(Duration::from_secs(5))
        .with_retry_count(0)
}

#[test]
fn test_submit_posts_json_lines() {
    let (base, requests) = spawn_responder(vec![(204, "")]);
    let mut sink = HttpSink::from_config(&config(&base)).expect("sink");

    let body = b"{\"metric\":{\"a\":\"1\"}}\n{\"metric\":{\"b\":\"2\"}}";
    sink.submit(body, 2).expect("204 is success");

    let req = requests.recv_timeout(RECV_TIMEOUT).expect("request");
    assert_eq!(req.request_line, "POST /api/v1/import HTTP/1.1");
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert_eq!(req.body, body.to_vec());
    assert!(req.header("authorization").is_none());
}

#[test]
fn test_non_204_status_is_failure() {
    let (base, requests) = spawn_responder(vec![(400, "cannot parse line"), (200, "ok")]);
    let mut sink = HttpSink::from_config(&config(&base)).expect("sink");

    let err = sink.submit(b"{}", 1).unwrap_err();
    match err {
        SubmitError::Status { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "cannot parse line");
        }
        other => panic!("expected Status, got: {}", other),
    }

    // Even a 200 is not the import protocol's success code.
    let err = sink.submit(b"{}", 1).unwrap_err();
    assert_eq!(err.status_code(), Some(200));

    assert_eq!(requests.try_iter().count(), 2);
}

#[test]
fn test_connection_refused_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let mut sink = HttpSink::from_config(&config(&format!("http://{}", addr))).expect("sink");
    let err = sink.submit(b"{}", 1).unwrap_err();
    assert!(matches!(err, SubmitError::Transport(_)), "got: {}", err);
    assert_eq!(err.status_code(), None);
}

#[test]
fn test_credentials_sent_as_basic_auth() {
    let (base, requests) = spawn_responder(vec![(204, "")]);
    let base = base.replace("http://", "http://user:pass@");
    let mut sink = HttpSink::from_config(&config(&base)).expect("sink");

    sink.submit(b"{}", 1).expect("submit");

    let req = requests.recv_timeout(RECV_TIMEOUT).expect("request");
    // base64("user:pass")
    assert_eq!(req.header("authorization"), Some("Basic dXNlcjpwYXNz"));
}

#[test]
fn test_password_only_credentials_sent_as_basic_auth() {
    let (base, requests) = spawn_responder(vec![(204, "")]);
    let base = base.replace("http://", "http://:secret@");
    let mut sink = HttpSink::from_config(&config(&base)).expect("sink");

    sink.submit(b"{}", 1).expect("submit");

    let req = requests.recv_timeout(RECV_TIMEOUT).expect("request");
    // base64(":secret")
    assert_eq!(req.header("authorization"), Some("Basic OnNlY3JldA=="));
}

#[test]
fn test_custom_import_path() {
    let (base, requests) = spawn_responder(vec![(204, "")]);
    let mut sink =
        HttpSink::from_config(&config(&base).with_url("/api/v1/import?extra_label=env=test"))
            .expect("sink");

    sink.submit(b"{}", 1).expect("submit");

    let req = requests.recv_timeout(RECV_TIMEOUT).expect("request");
    assert_eq!(
        req.request_line,
        "POST /api/v1/import?extra_label=env=test HTTP/1.1"
    );
}

#[test]
fn test_push_series_posts_single_line() {
    let (base, requests) = spawn_responder(vec![(204, "")]);
    let sink = HttpSink::from_config(&config(&base)).expect("sink");

    let mut series = TimeSeries::new([("__name__", "up"), ("job", "node")]);
    series.add_value(1.0, 1_700_000_000_000);
    sink.push_series(&series).expect("push");

    let req = requests.recv_timeout(RECV_TIMEOUT).expect("request");
    assert_eq!(req.body, series.to_json().expect("json"));
    assert!(!req.body.contains(&b'\n'));
}

#[test]
fn test_importer_end_to_end() {
    let (base, requests) = spawn_responder(vec![(204, "")]);
    let config = config(&base)
        .with_batch_size(3)
        .with_submit_interval(Duration::from_secs(60));
    let importer = Importer::new(config).expect("importer");

    let series: Vec<TimeSeries> = (0..3)
        .map(|i| {
            let mut s = TimeSeries::new([("__name__", "requests_total")]);
            s.set_label("instance", format!("i-{}", i));
            s.add_value(f64::from(i), 1_000 * i64::from(i));
            s
        })
        .collect();
    for s in &series {
        importer.add_payload(s.to_json().expect("json"));
    }

    let req = requests.recv_timeout(RECV_TIMEOUT).expect("batch request");
    let lines: Vec<TimeSeries> = req
        .body
        .split(|b| *b == b'\n')
        .map(|line| serde_json::from_slice(line).expect("json line"))
        .collect();
    assert_eq!(lines, series);

    importer.stop();
    importer.wait();
    let stats = importer.stats();
    assert_eq!(stats.delivery.batches_sent, 1);
    assert_eq!(stats.delivery.payloads_delivered, 3);
    assert!(stats.url.ends_with("/api/v1/import"));
}

#[test]
fn test_importer_keeps_running_after_rejected_batch() {
    let (base, requests) = spawn_responder(vec![(500, "storage unavailable"), (204, "")]);
    let config = config(&base)
        .with_batch_size(1)
        .with_submit_interval(Duration::from_secs(60));
    let importer = Importer::new(config).expect("importer");

    importer.add_payload(b"{\"first\":1}".to_vec());
    let first = requests.recv_timeout(RECV_TIMEOUT).expect("first request");
    assert_eq!(first.body, b"{\"first\":1}".to_vec());

    importer.add_payload(b"{\"second\":2}".to_vec());
    let second = requests.recv_timeout(RECV_TIMEOUT).expect("second request");
    assert_eq!(second.body, b"{\"second\":2}".to_vec());

    importer.stop();
    importer.wait();

    let delivery = importer.stats().delivery;
    assert_eq!(delivery.batches_failed, 1);
    assert_eq!(delivery.batches_sent, 1);
}
