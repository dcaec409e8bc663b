use std::borrow::Cow;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::FeedError;
use crate::model::Photo;

#[derive(Deserialize)]
struct FeedItem {
    title: String,
    author: String,
    author_id: String,
    tags: String,
    media: Media,
}

#[derive(Deserialize)]
struct Media {
    m: String,
}

impl From<FeedItem> for Photo {
    fn from(item: FeedItem) -> Self {
        let link = detail_url(&item.media.m);
        Photo {
            title: item.title,
            author: item.author,
            author_id: item.author_id,
            link,
            tags: item.tags,
            image: item.media.m,
        }
    }
}

/// Swaps the first `_m.` size token for `_b.`; URLs without it pass through.
pub fn detail_url(thumbnail: &str) -> String {
    thumbnail.replacen("_m.", "_b.", 1)
}

/// The public feed escapes apostrophes as `\'`, which JSON does not allow.
pub fn normalize_escapes(body: &str) -> Cow<'_, str> {
    if !body.contains("\\'") {
        return Cow::Borrowed(body);
    }

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\'') => out.push('\''),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    Cow::Owned(out)
}

fn parse_item(index: usize, item: &Value) -> Result<Photo, FeedError> {
    FeedItem::deserialize(item)
        .map(Photo::from)
        .map_err(|e| FeedError::InvalidItem {
            index,
            detail: e.to_string(),
        })
}

/// Parses a feed body into photos, in feed order. One bad item fails the lot.
pub fn parse_feed(body: &str) -> Result<Vec<Photo>, FeedError> {
    let body = normalize_escapes(body);
    let doc: Value = serde_json::from_str(&body).map_err(|e| FeedError::Json(e.to_string()))?;

    let items = doc
        .get("items")
        .and_then(Value::as_array)
        .ok_or(FeedError::MissingItems)?;

    let photos = items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_item(index, item))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(count = photos.len(), "parsed feed items");
    Ok(photos)
}
