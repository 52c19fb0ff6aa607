#![allow(dead_code)]

//! Shared fixtures: an in-process stub of the GitHub API/archive host
//! and a zip builder shaped like GitHub's archiver output.

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Once};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

pub struct StubResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl StubResponse {
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body: body.into().into_bytes(),
        }
    }

    pub fn zip(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: "application/zip",
            body,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: Vec::new(),
        }
    }
}

/// Minimal HTTP/1.1 responder bound to a random local port. Routes are
/// exact paths (query strings are ignored); anything else is a 404.
pub struct StubGithub {
    pub base_url: String,
}

impl StubGithub {
    pub async fn start(routes: HashMap<String, StubResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("stub local addr");
        let routes = Arc::new(routes);

        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(handle_connection(stream, Arc::clone(&routes)));
            }
        });

        Self {
            base_url: format!("http://{addr}"),
        }
    }
}

async fn handle_connection(stream: TcpStream, routes: Arc<HashMap<String, StubResponse>>) {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).await.is_err() {
        return;
    }
    let path = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .split('?')
        .next()
        .unwrap_or("/")
        .to_string();

    // Drain the request headers; stub requests never carry a body.
    loop {
        let mut header = String::new();
        match reader.read_line(&mut header).await {
            Ok(0) => break,
            Ok(_) if header == "\r\n" || header == "\n" => break,
            Ok(_) => {}
            Err(_) => return,
        }
    }

    let not_found = StubResponse::status(404);
    let response = routes.get(&path).unwrap_or(&not_found);

    let head = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        response.content_type,
        response.body.len()
    );

    let mut stream = reader.into_inner();
    let _ = stream.write_all(head.as_bytes()).await;
    let _ = stream.write_all(&response.body).await;
    let _ = stream.shutdown().await;
}

/// Build a zip shaped like a GitHub archive: one `root` directory
/// wrapping every file.
pub fn repo_zip(root: &str, files: &[(&str, &str)]) -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::SimpleFileOptions::default();
        for (rel, content) in files {
            writer
                .start_file(format!("{root}/{rel}"), options)
                .expect("start zip entry");
            writer.write_all(content.as_bytes()).expect("write zip entry");
        }
        writer.finish().expect("finish zip");
    }
    cursor.into_inner()
}

/// A GitHub commit payload with the fields the sync engine reads.
pub fn commit_json(sha: &str, message: &str) -> String {
    format!(
        r#"{{
            "sha": "{sha}",
            "commit": {{
                "message": "{message}",
                "author": {{ "name": "Ada", "date": "2024-05-01T10:00:00Z" }},
                "committer": {{ "name": "Ada", "date": "2024-05-01T12:00:00Z" }}
            }}
        }}"#
    )
}
