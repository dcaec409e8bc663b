use std::future::Future;
use std::time::Duration;

use tokio::runtime::RuntimeFlavor;
use tokio::sync::oneshot;
use tracing::{debug, warn};
use url::Url;
use wreq::Client;

use crate::error::{self, FeedError};
use crate::model::{FetchStatus, RawData};

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub proxy: Option<String>,
    pub timeout: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout: 30,
        }
    }
}

/// An open response whose body has not been read yet.
///
/// Dropping the value releases the underlying connection, so every exit
/// path out of a download gives it back.
pub trait Connection: Send {
    fn read_body(&mut self) -> impl Future<Output = Result<String, FeedError>> + Send;
}

/// Issues the GET for a download and hands back the open response.
pub trait Transport: Send + Sync {
    type Conn: Connection;

    fn open(&self, url: &Url) -> impl Future<Output = Result<Self::Conn, FeedError>> + Send;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(options: &FetchOptions) -> Result<Self, FeedError> {
        let mut builder = Client::builder().timeout(Duration::from_secs(options.timeout));

        if let Some(ref proxy) = options.proxy {
            builder = builder.proxy(wreq::Proxy::all(proxy).map_err(error::from_http_error)?);
        }

        let client = builder.build().map_err(error::from_http_error)?;
        Ok(Self { client })
    }
}

pub struct HttpConnection {
    response: Option<wreq::Response>,
}

impl Connection for HttpConnection {
    async fn read_body(&mut self) -> Result<String, FeedError> {
        let response = self
            .response
            .take()
            .ok_or_else(|| FeedError::Read("response body already consumed".into()))?;
        response.text().await.map_err(error::from_http_error)
    }
}

impl Transport for HttpTransport {
    type Conn = HttpConnection;

    async fn open(&self, url: &Url) -> Result<HttpConnection, FeedError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(error::from_http_error)?;

        let status = response.status().as_u16();
        debug!(status, "feed responded");
        if !response.status().is_success() {
            return Err(FeedError::HttpStatus(status));
        }

        Ok(HttpConnection {
            response: Some(response),
        })
    }
}

/// Rebuilds a body line by line, ending every line with a single `\n`.
pub fn reassemble_lines(body: &str) -> String {
    let mut out = String::with_capacity(body.len() + 1);
    for line in body.lines() {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Result of a background task, relayed back to whoever started it.
pub struct Pending<T> {
    rx: oneshot::Receiver<T>,
    fallback: T,
}

impl<T> Pending<T> {
    pub(crate) fn new(rx: oneshot::Receiver<T>, fallback: T) -> Self {
        Self { rx, fallback }
    }

    /// Resolves once the worker finishes. A worker that died before sending
    /// resolves to the failure value it was created with.
    pub async fn wait(self) -> T {
        let Pending { rx, fallback } = self;
        match rx.await {
            Ok(value) => value,
            Err(_) => {
                warn!("{}", FeedError::WorkerGone);
                fallback
            }
        }
    }

    /// Waits for the result and hands it to `on_complete` in the caller's context.
    pub async fn deliver<F>(self, on_complete: F)
    where
        F: FnOnce(T),
    {
        on_complete(self.wait().await);
    }
}

/// Runs `future` to completion on the current thread.
///
/// On a multi-thread runtime the worker is handed over with
/// `block_in_place`. A current-thread runtime cannot be re-entered, so the
/// future runs on a scoped thread with its own runtime. Outside any runtime
/// a throwaway current-thread runtime is started.
pub(crate) fn block_on<F>(future: F) -> Result<F::Output, FeedError>
where
    F: Future + Send,
    F::Output: Send,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            Ok(tokio::task::block_in_place(|| handle.block_on(future)))
        }
        Ok(_) => std::thread::scope(|scope| {
            scope
                .spawn(move || run_detached(future))
                .join()
                .map_err(|_| FeedError::Runtime("blocking worker panicked".into()))?
        }),
        Err(_) => run_detached(future),
    }
}

fn run_detached<F: Future>(future: F) -> Result<F::Output, FeedError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| FeedError::Runtime(e.to_string()))?;
    Ok(runtime.block_on(future))
}

/// Downloads one URL. One fetcher per request; its status only moves forward.
pub struct RawDataFetcher<T> {
    transport: T,
    status: FetchStatus,
}

impl<T: Transport> RawDataFetcher<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            status: FetchStatus::Idle,
        }
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    fn advance(&mut self, next: FetchStatus) {
        debug_assert!(
            self.status.can_transition_to(next),
            "illegal status change {} -> {next}",
            self.status
        );
        self.status = next;
    }

    pub async fn download(&mut self, url: Option<&str>) -> Result<String, FeedError> {
        let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
            self.advance(FetchStatus::NotConfigured);
            return Err(FeedError::NotConfigured);
        };

        self.advance(FetchStatus::InProgress);
        debug!(url, "download starts");

        match self.fetch(url).await {
            Ok(body) => {
                self.advance(FetchStatus::Ok);
                debug!(bytes = body.len(), "download complete");
                Ok(body)
            }
            Err(e) => {
                self.advance(FetchStatus::FailedOrEmpty);
                warn!(url, error = %e, "download failed");
                Err(e)
            }
        }
    }

    async fn fetch(&self, raw: &str) -> Result<String, FeedError> {
        let url = Url::parse(raw).map_err(|_| FeedError::InvalidUrl(raw.to_string()))?;
        let mut conn = self.transport.open(&url).await?;
        let body = conn.read_body().await?;
        Ok(reassemble_lines(&body))
    }

    fn completion(&self, result: Result<String, FeedError>) -> RawData {
        match result {
            Ok(body) => RawData {
                body: Some(body),
                status: self.status,
                error: None,
            },
            Err(e) => RawData::failed(self.status, e),
        }
    }

    /// Blocking mode: downloads on the calling thread, then calls `on_complete` once.
    pub fn run_in_same_thread<F>(mut self, url: Option<&str>, on_complete: F)
    where
        F: FnOnce(RawData),
    {
        let data = match block_on(self.download(url)) {
            Ok(result) => self.completion(result),
            Err(e) => {
                warn!(error = %e, "blocking download could not run");
                RawData::failed(FetchStatus::FailedOrEmpty, e)
            }
        };
        on_complete(data);
    }
}

impl<T: Transport + 'static> RawDataFetcher<T> {
    /// Background mode: downloads on a tokio worker and relays the result
    /// through a channel. Must be called from within a tokio runtime.
    pub fn execute(mut self, url: Option<String>) -> Pending<RawData> {
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let result = self.download(url.as_deref()).await;
            let _ = tx.send(self.completion(result));
        });
        Pending::new(
            rx,
            RawData::failed(FetchStatus::FailedOrEmpty, FeedError::WorkerGone),
        )
    }
}
