use serde::Serialize;

use crate::error::FeedError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FetchStatus {
    /// No request issued yet.
    Idle,
    /// Request issued, awaiting the response.
    InProgress,
    /// No usable request target.
    NotConfigured,
    /// Network failure, bad HTTP status, or a body that did not parse.
    FailedOrEmpty,
    Ok,
}

impl FetchStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::NotConfigured | Self::FailedOrEmpty | Self::Ok)
    }

    pub fn can_transition_to(self, next: FetchStatus) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::InProgress)
                | (Self::Idle, Self::NotConfigured)
                | (Self::InProgress, Self::Ok)
                | (Self::InProgress, Self::FailedOrEmpty)
        )
    }
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "IDLE",
            Self::InProgress => "IN_PROGRESS",
            Self::NotConfigured => "NOT_CONFIGURED",
            Self::FailedOrEmpty => "FAILED_OR_EMPTY",
            Self::Ok => "OK",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum MatchMode {
    #[default]
    All,
    Any,
}

impl MatchMode {
    pub fn from_match_all(match_all: bool) -> Self {
        if match_all {
            Self::All
        } else {
            Self::Any
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Any => "ANY",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Photo {
    pub title: String,
    pub author: String,
    pub author_id: String,
    /// Large-size image shown by the detail view.
    pub link: String,
    pub tags: String,
    /// Thumbnail image.
    pub image: String,
}

impl Photo {
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags.split_whitespace().collect()
    }
}

/// Completion value of a raw download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawData {
    pub body: Option<String>,
    pub status: FetchStatus,
    pub error: Option<FeedError>,
}

impl RawData {
    pub fn failed(status: FetchStatus, error: FeedError) -> Self {
        Self {
            body: None,
            status,
            error: Some(error),
        }
    }
}

/// Completion value of a feed search. Failures never carry photos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhotoData {
    pub photos: Vec<Photo>,
    pub status: FetchStatus,
    #[serde(skip)]
    pub error: Option<FeedError>,
}

impl PhotoData {
    pub fn succeeded(photos: Vec<Photo>) -> Self {
        Self {
            photos,
            status: FetchStatus::Ok,
            error: None,
        }
    }

    pub fn failed(status: FetchStatus, error: FeedError) -> Self {
        Self {
            photos: Vec::new(),
            status,
            error: Some(error),
        }
    }
}
