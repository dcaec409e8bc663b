use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("no feed URL configured — pass --base-url or check the configured endpoint")]
    NotConfigured,

    #[error("invalid feed URL \"{0}\"")]
    InvalidUrl(String),

    #[error(
        "request timed out — Flickr may be slow or unreachable. \
         Try increasing --timeout or check your connection"
    )]
    Timeout,

    #[error("connection failed — check your internet connection ({0})")]
    ConnectionFailed(String),

    #[error("DNS resolution failed ({0}) — check your internet connection")]
    DnsResolution(String),

    #[error("TLS/SSL error — connection to Flickr failed ({0})")]
    TlsError(String),

    #[error("proxy error — check your --proxy URL is correct ({0})")]
    ProxyError(String),

    #[error("unexpected HTTP status {0} from the photo feed")]
    HttpStatus(u16),

    #[error("failed to read the feed response ({0})")]
    Read(String),

    #[error("feed response is not valid JSON — {0}")]
    Json(String),

    #[error("feed response has no \"items\" array")]
    MissingItems,

    #[error("feed item {index} is malformed — {detail}")]
    InvalidItem { index: usize, detail: String },

    #[error("{0}")]
    Validation(String),

    #[error("saved query storage failed — {0}")]
    Storage(String),

    #[error("background fetch ended without delivering a result")]
    WorkerGone,

    #[error("could not start the async runtime ({0})")]
    Runtime(String),
}

pub fn from_http_error(err: wreq::Error) -> FeedError {
    let msg = err.to_string();
    let lower = msg.to_lowercase();

    if err.is_timeout() {
        return FeedError::Timeout;
    }

    if err.is_connect() {
        if lower.contains("dns") || lower.contains("resolve") || lower.contains("getaddrinfo") {
            return FeedError::DnsResolution(msg);
        }
        return FeedError::ConnectionFailed(msg);
    }

    if lower.contains("proxy") || lower.contains("socks") {
        return FeedError::ProxyError(msg);
    }

    if lower.contains("tls") || lower.contains("ssl") || lower.contains("certificate") {
        return FeedError::TlsError(msg);
    }

    if lower.contains("decod") || lower.contains("body") {
        return FeedError::Read(msg);
    }

    FeedError::ConnectionFailed(msg)
}
