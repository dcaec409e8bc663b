use url::Url;

use crate::error::FeedError;
use crate::model::MatchMode;

pub const FEED_URL: &str = "https://api.flickr.com/services/feeds/photos_public.gne";
pub const DEFAULT_LANGUAGE: &str = "en-us";

const FORMAT: &str = "json";
const NO_JSON_CALLBACK: &str = "1";

/// Per-client formatting options applied to every search.
#[derive(Debug, Clone)]
pub struct FeedOptions {
    pub base_url: String,
    pub language: String,
    pub match_mode: MatchMode,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            base_url: FEED_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            match_mode: MatchMode::All,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestParameters {
    pub base_url: String,
    pub tags: String,
    pub match_mode: MatchMode,
    pub language: String,
}

impl RequestParameters {
    pub fn new(options: &FeedOptions, tags: impl Into<String>) -> Self {
        Self {
            base_url: options.base_url.clone(),
            tags: tags.into(),
            match_mode: options.match_mode,
            language: options.language.clone(),
        }
    }

    fn base(&self) -> Result<Url, FeedError> {
        let raw = self.base_url.trim();
        if raw.is_empty() {
            return Err(FeedError::NotConfigured);
        }
        let url = Url::parse(raw).map_err(|_| FeedError::InvalidUrl(raw.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(FeedError::InvalidUrl(raw.to_string())),
        }
    }

    pub fn validate(&self) -> Result<(), FeedError> {
        self.base()?;
        if self.language.trim().is_empty() {
            return Err(FeedError::Validation("language code must not be empty".into()));
        }
        if self.language.chars().any(char::is_whitespace) {
            return Err(FeedError::Validation(format!(
                "invalid language code \"{}\" — expected something like en-us, de-de, fr-fr",
                self.language
            )));
        }
        Ok(())
    }

    /// Builds the feed URL. Existing query pairs on the base URL stay in front.
    pub fn to_url(&self) -> Result<Url, FeedError> {
        self.validate()?;
        let mut url = self.base()?;
        url.query_pairs_mut()
            .append_pair("tags", &self.tags)
            .append_pair("tagmode", self.match_mode.as_param())
            .append_pair("lang", &self.language)
            .append_pair("format", FORMAT)
            .append_pair("nojsoncallback", NO_JSON_CALLBACK);
        Ok(url)
    }
}

/// Joins CLI tag arguments into the feed's comma-separated tag list.
pub fn join_tags<S: AsRef<str>>(tags: &[S]) -> String {
    tags.iter()
        .flat_map(|t| t.as_ref().split(','))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}
