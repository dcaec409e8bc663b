#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use flickr::error::FeedError;
use flickr::fetch::{Connection, Transport};
use serde_json::{json, Value};
use url::Url;

pub enum Reply {
    Body(String),
    OpenError(FeedError),
    ReadError(FeedError),
}

struct State {
    reply: Reply,
    opened: AtomicUsize,
    released: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

/// Transport double that counts opened and released connections.
#[derive(Clone)]
pub struct MockTransport {
    state: Arc<State>,
}

impl MockTransport {
    pub fn new(reply: Reply) -> Self {
        Self {
            state: Arc::new(State {
                reply,
                opened: AtomicUsize::new(0),
                released: AtomicUsize::new(0),
                urls: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn body(body: impl Into<String>) -> Self {
        Self::new(Reply::Body(body.into()))
    }

    pub fn opened(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.state.released.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<String> {
        self.state.urls.lock().unwrap().clone()
    }
}

pub struct MockConnection {
    state: Arc<State>,
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        self.state.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl Connection for MockConnection {
    async fn read_body(&mut self) -> Result<String, FeedError> {
        match &self.state.reply {
            Reply::Body(body) => Ok(body.clone()),
            Reply::ReadError(e) | Reply::OpenError(e) => Err(e.clone()),
        }
    }
}

impl Transport for MockTransport {
    type Conn = MockConnection;

    async fn open(&self, url: &Url) -> Result<MockConnection, FeedError> {
        self.state.urls.lock().unwrap().push(url.to_string());
        if let Reply::OpenError(e) = &self.state.reply {
            return Err(e.clone());
        }
        self.state.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MockConnection {
            state: self.state.clone(),
        })
    }
}

pub fn item(title: &str, author_id: &str, tags: &str, thumbnail: &str) -> Value {
    json!({
        "title": title,
        "link": "https://www.flickr.com/photos/someone/1/",
        "media": { "m": thumbnail },
        "date_taken": "2026-10-01T10:00:00-08:00",
        "description": "",
        "published": "2026-10-02T12:00:00Z",
        "author": format!("nobody@flickr.com (\"{author_id}\")"),
        "author_id": author_id,
        "tags": tags
    })
}

pub fn feed(items: Vec<Value>) -> String {
    json!({
        "title": "Recent Uploads tagged cats",
        "link": "https://www.flickr.com/photos/tags/cats/",
        "description": "",
        "modified": "2026-10-02T12:00:00Z",
        "generator": "https://www.flickr.com",
        "items": items
    })
    .to_string()
}

pub fn sample_feed() -> String {
    feed(vec![
        item(
            "Sleepy cat",
            "111@N01",
            "cat sleep",
            "https://live.staticflickr.com/65535/1_aaa_m.jpg",
        ),
        item(
            "Garden cat",
            "222@N02",
            "cat garden summer",
            "https://live.staticflickr.com/65535/2_bbb_m.jpg",
        ),
        item(
            "Cat on a roof",
            "333@N03",
            "",
            "https://live.staticflickr.com/65535/3_ccc_m.jpg",
        ),
    ])
}

/// Serves exactly one HTTP response on a local port and returns a feed URL pointing at it.
pub fn serve_once(status_line: &str, body: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 8192];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        }
    });
    format!("http://{addr}/services/feeds/photos_public.gne")
}
