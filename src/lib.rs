pub mod error;
pub mod feed;
pub mod fetch;
pub mod logging;
pub mod mcp;
pub mod model;
pub mod parse;
pub mod query;
pub mod saved;
pub mod table;

use error::FeedError;
use feed::FeedClient;
use fetch::{FetchOptions, HttpTransport};
use model::Photo;
use query::{FeedOptions, RequestParameters};

pub fn client(
    options: FeedOptions,
    fetch_options: &FetchOptions,
) -> Result<FeedClient<HttpTransport>, FeedError> {
    let transport = HttpTransport::new(fetch_options)?;
    Ok(FeedClient::new(transport, options))
}

pub async fn search(
    tags: &str,
    options: FeedOptions,
    fetch_options: FetchOptions,
) -> Result<Vec<Photo>, FeedError> {
    client(options, &fetch_options)?.search(tags).await
}

pub fn feed_url(tags: &str, options: &FeedOptions) -> Result<String, FeedError> {
    RequestParameters::new(options, tags)
        .to_url()
        .map(String::from)
}
