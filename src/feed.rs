use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::FeedError;
use crate::fetch::{self, Pending, RawDataFetcher, Transport};
use crate::model::{FetchStatus, Photo, PhotoData};
use crate::parse;
use crate::query::{FeedOptions, RequestParameters};

/// Builds feed requests, downloads them and turns the bodies into photos.
#[derive(Clone)]
pub struct FeedClient<T> {
    transport: T,
    options: FeedOptions,
}

impl<T: Transport + Clone> FeedClient<T> {
    pub fn new(transport: T, options: FeedOptions) -> Self {
        Self { transport, options }
    }

    pub fn options(&self) -> &FeedOptions {
        &self.options
    }

    pub fn request(&self, tags: &str) -> RequestParameters {
        RequestParameters::new(&self.options, tags)
    }

    /// Fetch then parse, sequentially. Every failure ends up in the returned status.
    pub async fn fetch_photos(&self, tags: &str) -> PhotoData {
        let url = match self.request(tags).to_url() {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "could not build feed URL");
                return PhotoData::failed(FetchStatus::NotConfigured, e);
            }
        };

        let mut fetcher = RawDataFetcher::new(self.transport.clone());
        let body = match fetcher.download(Some(url.as_str())).await {
            Ok(body) => body,
            Err(e) => return PhotoData::failed(fetcher.status(), e),
        };

        match parse::parse_feed(&body) {
            Ok(photos) => {
                debug!(tags, count = photos.len(), "feed search complete");
                PhotoData::succeeded(photos)
            }
            Err(e) => {
                warn!(error = %e, "error processing feed data");
                PhotoData::failed(FetchStatus::FailedOrEmpty, e)
            }
        }
    }

    pub async fn search(&self, tags: &str) -> Result<Vec<Photo>, FeedError> {
        let data = self.fetch_photos(tags).await;
        match data.error {
            Some(e) => Err(e),
            None => Ok(data.photos),
        }
    }

    /// Blocking mode for callers already off the primary flow.
    pub fn run_in_same_thread<F>(&self, tags: &str, on_data: F)
    where
        F: FnOnce(PhotoData),
    {
        let data = match fetch::block_on(self.fetch_photos(tags)) {
            Ok(data) => data,
            Err(e) => PhotoData::failed(FetchStatus::FailedOrEmpty, e),
        };
        on_data(data);
    }
}

impl<T: Transport + Clone + 'static> FeedClient<T> {
    /// Background mode: fetch and parse on a tokio worker, result relayed
    /// through the returned [`Pending`]. Must be called within a runtime.
    pub fn execute(&self, tags: impl Into<String>) -> Pending<PhotoData> {
        let client = self.clone();
        let tags = tags.into();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let data = client.fetch_photos(&tags).await;
            let _ = tx.send(data);
        });
        Pending::new(
            rx,
            PhotoData::failed(FetchStatus::FailedOrEmpty, FeedError::WorkerGone),
        )
    }
}
