use uuid::Uuid;

use crate::domain::{Feed, FeedFollow, Post, User};
use crate::errors::{AggregatorError, AggregatorResult};
use crate::storage::traits::{FeedRepository, FollowRepository, PostRepository, UserRepository};

/// Default number of posts returned for a user.
pub const DEFAULT_POST_LIMIT: usize = 10;

/// Registration side of the aggregator: users, feeds, follows and reading posts.
pub struct FeedService<U, F, W, P>
where
    U: UserRepository,
    F: FeedRepository,
    W: FollowRepository,
    P: PostRepository,
{
    users: U,
    feeds: F,
    follows: W,
    posts: P,
}

impl<U, F, W, P> FeedService<U, F, W, P>
where
    U: UserRepository,
    F: FeedRepository,
    W: FollowRepository,
    P: PostRepository,
{
    pub fn new(users: U, feeds: F, follows: W, posts: P) -> Self {
        Self {
            users,
            feeds,
            follows,
            posts,
        }
    }

    pub fn create_user(&self, name: &str) -> AggregatorResult<User> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AggregatorError::InvalidInput("User name is empty".to_string()));
        }

        let user = User::new(name.to_string());
        self.users.add(&user)?;
        Ok(user)
    }

    /// Resolve the user owning an API key.
    pub fn authenticate(&self, api_key: &str) -> AggregatorResult<User> {
        let api_key = api_key.trim();
        if api_key.is_empty() || api_key.split_whitespace().count() != 1 {
            return Err(AggregatorError::Unauthorized("Malformed API key".to_string()));
        }

        self.users
            .get_by_api_key(api_key)?
            .ok_or_else(|| AggregatorError::Unauthorized("Unknown API key".to_string()))
    }

    /// Register a feed owned by `user` and follow it on their behalf.
    /// The URL is stored as given.
    pub fn add_feed(&self, user: &User, name: &str, url: &str) -> AggregatorResult<(Feed, FeedFollow)> {
        if name.trim().is_empty() || url.trim().is_empty() {
            return Err(AggregatorError::InvalidInput(
                "Feed name and URL are required".to_string(),
            ));
        }

        let feed = Feed::new(name.trim().to_string(), url.trim().to_string(), user.id);
        self.feeds.add(&feed)?;

        let follow = FeedFollow::new(user.id, feed.id);
        self.follows.add(&follow)?;

        Ok((feed, follow))
    }

    pub fn list_feeds(&self) -> AggregatorResult<Vec<Feed>> {
        self.feeds.get_all()
    }

    pub fn follow(&self, user: &User, feed_id: Uuid) -> AggregatorResult<FeedFollow> {
        if self.feeds.get_by_id(feed_id)?.is_none() {
            return Err(AggregatorError::FeedNotFound(feed_id.to_string()));
        }

        let follow = FeedFollow::new(user.id, feed_id);
        self.follows.add(&follow)?;
        Ok(follow)
    }

    pub fn follows(&self, user: &User) -> AggregatorResult<Vec<FeedFollow>> {
        self.follows.get_for_user(user.id)
    }

    pub fn unfollow(&self, user: &User, follow_id: Uuid) -> AggregatorResult<()> {
        self.follows.remove(follow_id, user.id)
    }

    pub fn posts(&self, user: &User, limit: usize) -> AggregatorResult<Vec<Post>> {
        self.posts.get_for_user(user.id, limit)
    }
}
