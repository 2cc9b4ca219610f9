//! Mock collector shared by the integration tests.

#![allow(dead_code)]

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use native_tls::{Identity, TlsAcceptor};
use sentry_courier::Endpoint;

/// A request as seen by the mock collector.
#[derive(Debug)]
pub struct CapturedRequest {
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("json body")
    }
}

/// Read one HTTP/1.1 request with a `Content-Length` body.
pub fn read_request(stream: impl Read) -> io::Result<CapturedRequest> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let path = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or_default()
        .to_string();

    let mut headers = Vec::new();
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 || line.trim().is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim().to_lowercase();
            let value = value.trim().to_string();
            if key == "content-length" {
                content_length = value.parse().unwrap_or(0);
            }
            headers.push((key, value));
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body)?;
    Ok(CapturedRequest {
        path,
        headers,
        body,
    })
}

/// Render a minimal response with an empty body.
pub fn response(status: u16, extra_headers: &[(&str, &str)]) -> String {
    let mut out = format!("HTTP/1.1 {status} Mock\r\nContent-Length: 0\r\n");
    for (name, value) in extra_headers {
        out.push_str(&format!("{name}: {value}\r\n"));
    }
    out.push_str("\r\n");
    out
}

pub fn ephemeral_listener() -> TcpListener {
    TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener")
}

pub fn plain_endpoint(addr: SocketAddr) -> Endpoint {
    Endpoint::new(&format!("http://{addr}/"), "1", "public", None).expect("endpoint")
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// PEM of the CA that signed the TLS collector's certificate.
pub fn ca_certificate_pem() -> Vec<u8> {
    std::fs::read(fixture("ca.pem")).expect("read CA fixture")
}

/// Acceptor presenting a certificate issued only for `collector.invalid`.
pub fn mismatched_tls_acceptor() -> Arc<TlsAcceptor> {
    let cert = std::fs::read(fixture("server.pem")).expect("read server cert");
    let key = std::fs::read(fixture("server.key")).expect("read server key");
    let identity = Identity::from_pkcs8(&cert, &key).expect("identity");
    Arc::new(TlsAcceptor::new(identity).expect("acceptor"))
}

/// Serve one TLS connection, answering 200 once the handshake succeeds.
///
/// The receiver yields the captured request, or nothing if the client
/// abandoned the handshake.
pub fn spawn_tls_collector(listener: TcpListener) -> mpsc::Receiver<CapturedRequest> {
    let acceptor = mismatched_tls_acceptor();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let Ok((stream, _)) = listener.accept() else {
            return;
        };
        let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
        let Ok(mut tls) = acceptor.accept(stream) else {
            return;
        };
        let Ok(captured) = read_request(&mut tls) else {
            return;
        };
        let _ = tls.write_all(response(200, &[]).as_bytes());
        let _ = tls.flush();
        let _ = tx.send(captured);
    });
    rx
}
