use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Feed, FeedFollow, Post, User};
use crate::errors::AggregatorResult;

/// Result of an idempotent post insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created,
    /// A post with the same `(feed_id, url)` is already stored.
    Duplicate,
}

#[cfg_attr(test, mockall::automock)]
pub trait FeedRepository: Send + Sync {
    fn add(&self, feed: &Feed) -> AggregatorResult<()>;
    fn get_all(&self) -> AggregatorResult<Vec<Feed>>;
    fn get_by_id(&self, id: Uuid) -> AggregatorResult<Option<Feed>>;

    /// Up to `limit` feeds, least recently fetched first, never-fetched feeds before all others.
    fn next_to_fetch(&self, limit: usize) -> AggregatorResult<Vec<Feed>>;

    /// Sets the fetch watermark. Fails with `FeedNotFound` if the feed is gone.
    fn mark_fetched(&self, id: Uuid, fetched_at: DateTime<Utc>) -> AggregatorResult<()>;
}

#[cfg_attr(test, mockall::automock)]
pub trait PostRepository: Send + Sync {
    fn insert(&self, post: &Post) -> AggregatorResult<InsertOutcome>;
    fn get_for_feed(&self, feed_id: Uuid) -> AggregatorResult<Vec<Post>>;

    /// Newest posts across every feed the user follows.
    fn get_for_user(&self, user_id: Uuid, limit: usize) -> AggregatorResult<Vec<Post>>;
}

#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    fn add(&self, user: &User) -> AggregatorResult<()>;
    fn get_by_api_key(&self, api_key: &str) -> AggregatorResult<Option<User>>;
}

#[cfg_attr(test, mockall::automock)]
pub trait FollowRepository: Send + Sync {
    fn add(&self, follow: &FeedFollow) -> AggregatorResult<()>;
    fn get_for_user(&self, user_id: Uuid) -> AggregatorResult<Vec<FeedFollow>>;
    fn remove(&self, id: Uuid, user_id: Uuid) -> AggregatorResult<()>;
}
