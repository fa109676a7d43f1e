use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row};
use uuid::Uuid;

use crate::domain::Feed;
use crate::errors::{AggregatorError, AggregatorResult};
use crate::storage::sqlite::{is_unique_violation, SqliteStorage};
use crate::storage::traits::FeedRepository;

const FEED_COLUMNS: &str = "id, name, url, user_id, last_fetched_at, created_at, updated_at";

pub struct SqliteFeedRepository {
    storage: SqliteStorage,
}

impl SqliteFeedRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }
}

fn row_to_feed(row: &Row<'_>) -> rusqlite::Result<Feed> {
    Ok(Feed {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        user_id: row.get(3)?,
        last_fetched_at: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

impl FeedRepository for SqliteFeedRepository {
    fn add(&self, feed: &Feed) -> AggregatorResult<()> {
        let conn = self.storage.connection()?;

        let result = conn.execute(
            "INSERT INTO feeds (id, name, url, user_id, last_fetched_at, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            (
                feed.id,
                &feed.name,
                &feed.url,
                feed.user_id,
                feed.last_fetched_at,
                feed.created_at,
                feed.updated_at,
            ),
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                Err(AggregatorError::FeedAlreadyExists(feed.url.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn get_all(&self) -> AggregatorResult<Vec<Feed>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {FEED_COLUMNS} FROM feeds ORDER BY created_at ASC"
        ))?;

        let feeds = stmt.query_map([], row_to_feed)?;
        feeds.collect::<Result<Vec<_>, _>>().map_err(AggregatorError::from)
    }

    fn get_by_id(&self, id: Uuid) -> AggregatorResult<Option<Feed>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(&format!("SELECT {FEED_COLUMNS} FROM feeds WHERE id = ?1"))?;

        stmt.query_row([id], row_to_feed)
            .optional()
            .map_err(AggregatorError::from)
    }

    fn next_to_fetch(&self, limit: usize) -> AggregatorResult<Vec<Feed>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {FEED_COLUMNS} FROM feeds ORDER BY last_fetched_at ASC NULLS FIRST, created_at ASC LIMIT ?1"
        ))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let feeds = stmt.query_map([limit], row_to_feed)?;
        feeds.collect::<Result<Vec<_>, _>>().map_err(AggregatorError::from)
    }

    fn mark_fetched(&self, id: Uuid, fetched_at: DateTime<Utc>) -> AggregatorResult<()> {
        let conn = self.storage.connection()?;
        let changed = conn.execute(
            "UPDATE feeds SET last_fetched_at = ?1, updated_at = ?1 WHERE id = ?2",
            (fetched_at, id),
        )?;

        if changed == 0 {
            return Err(AggregatorError::FeedNotFound(id.to_string()));
        }
        Ok(())
    }
}
