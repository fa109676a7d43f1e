use chrono::{DateTime, Utc};

use crate::domain::{Feed, Post};
use crate::errors::NormalizeError;
use crate::sources::ParsedItem;

/// RFC 1123 with a numeric zone, e.g. `Mon, 02 Jan 2006 15:04:05 -0700`.
pub const PUBLISHED_AT_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Turn one parsed item into a post owned by `feed`.
pub fn normalize(item: &ParsedItem, feed: &Feed) -> Result<Post, NormalizeError> {
    let url = item
        .link
        .as_deref()
        .map(str::trim)
        .filter(|link| !link.is_empty())
        .ok_or(NormalizeError::MissingLink)?;

    let raw_date = item
        .pub_date
        .as_deref()
        .ok_or(NormalizeError::MissingPublishDate)?;
    let published_at = parse_published_at(raw_date)?;

    let description = item
        .description
        .clone()
        .filter(|description| !description.is_empty());

    let post = Post::new(
        feed.id,
        item.title.clone().unwrap_or_default(),
        url.to_string(),
        published_at,
    )
    .with_description(description);

    Ok(post)
}

pub fn parse_published_at(raw: &str) -> Result<DateTime<Utc>, NormalizeError> {
    DateTime::parse_from_str(raw.trim(), PUBLISHED_AT_FORMAT)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| NormalizeError::InvalidPublishDate(raw.to_string()))
}
