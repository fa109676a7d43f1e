use rusqlite::Row;
use uuid::Uuid;

use crate::domain::Post;
use crate::errors::{AggregatorError, AggregatorResult};
use crate::storage::sqlite::{is_unique_violation, SqliteStorage};
use crate::storage::traits::{InsertOutcome, PostRepository};

pub struct SqlitePostRepository {
    storage: SqliteStorage,
}

impl SqlitePostRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }
}

fn row_to_post(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        url: row.get(2)?,
        description: row.get(3)?,
        published_at: row.get(4)?,
        feed_id: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

impl PostRepository for SqlitePostRepository {
    fn insert(&self, post: &Post) -> AggregatorResult<InsertOutcome> {
        let conn = self.storage.connection()?;
        let result = conn.execute(
            "INSERT INTO posts (id, title, url, description, published_at, feed_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            (
                post.id,
                &post.title,
                &post.url,
                &post.description,
                post.published_at,
                post.feed_id,
                post.created_at,
                post.updated_at,
            ),
        );

        match result {
            Ok(_) => Ok(InsertOutcome::Created),
            Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::Duplicate),
            Err(e) => Err(e.into()),
        }
    }

    fn get_for_feed(&self, feed_id: Uuid) -> AggregatorResult<Vec<Post>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, url, description, published_at, feed_id, created_at, updated_at
             FROM posts WHERE feed_id = ?1 ORDER BY published_at DESC",
        )?;

        let posts = stmt.query_map([feed_id], row_to_post)?;
        posts.collect::<Result<Vec<_>, _>>().map_err(AggregatorError::from)
    }

    fn get_for_user(&self, user_id: Uuid, limit: usize) -> AggregatorResult<Vec<Post>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(
            "SELECT p.id, p.title, p.url, p.description, p.published_at, p.feed_id, p.created_at, p.updated_at
             FROM posts p
             JOIN feed_follows ff ON ff.feed_id = p.feed_id
             WHERE ff.user_id = ?1
             ORDER BY p.published_at DESC
             LIMIT ?2",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let posts = stmt.query_map((user_id, limit), row_to_post)?;
        posts.collect::<Result<Vec<_>, _>>().map_err(AggregatorError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Feed, FeedFollow, User};
    use crate::storage::sqlite::{
        SqliteFeedRepository, SqliteFollowRepository, SqliteUserRepository,
    };
    use crate::storage::traits::{FeedRepository, FollowRepository, UserRepository};
    use chrono::{Duration, TimeZone, Utc};

    struct Fixture {
        storage: SqliteStorage,
        posts: SqlitePostRepository,
        user: User,
        feed: Feed,
    }

    fn setup() -> Fixture {
        let storage = SqliteStorage::in_memory().unwrap();
        let user = User::new("Sample User".to_string());
        SqliteUserRepository::new(storage.clone()).add(&user).unwrap();
        let feed = Feed::new(
            "Sample Feed".to_string(),
            "https://example.com/index.xml".to_string(),
            user.id,
        );
        SqliteFeedRepository::new(storage.clone()).add(&feed).unwrap();

        Fixture {
            posts: SqlitePostRepository::new(storage.clone()),
            storage,
            user,
            feed,
        }
    }

    fn post(feed_id: Uuid, url: &str) -> Post {
        Post::new(
            feed_id,
            "A post".to_string(),
            url.to_string(),
            Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_insert_and_read_back() {
        let fx = setup();
        let p = post(fx.feed.id, "https://example.com/a")
            .with_description(Some("Body".to_string()));

        assert_eq!(fx.posts.insert(&p).unwrap(), InsertOutcome::Created);

        let stored = fx.posts.get_for_feed(fx.feed.id).unwrap();
        assert_eq!(stored, vec![p]);
    }

    #[test]
    fn test_duplicate_insert_is_not_an_error() {
        let fx = setup();
        let first = post(fx.feed.id, "https://example.com/a");
        // Fresh id, same (feed, url)
        let second = post(fx.feed.id, "https://example.com/a");

        assert_eq!(fx.posts.insert(&first).unwrap(), InsertOutcome::Created);
        assert_eq!(fx.posts.insert(&second).unwrap(), InsertOutcome::Duplicate);

        assert_eq!(fx.posts.get_for_feed(fx.feed.id).unwrap().len(), 1);
    }

    #[test]
    fn test_same_link_in_different_feeds() {
        let fx = setup();
        let other = Feed::new(
            "Mirror".to_string(),
            "https://mirror.example.com/index.xml".to_string(),
            fx.user.id,
        );
        SqliteFeedRepository::new(fx.storage.clone()).add(&other).unwrap();

        assert_eq!(
            fx.posts.insert(&post(fx.feed.id, "https://example.com/a")).unwrap(),
            InsertOutcome::Created
        );
        assert_eq!(
            fx.posts.insert(&post(other.id, "https://example.com/a")).unwrap(),
            InsertOutcome::Created
        );
    }

    #[test]
    fn test_absent_description_stored_as_null() {
        let fx = setup();
        fx.posts.insert(&post(fx.feed.id, "https://example.com/a")).unwrap();

        let conn = fx.storage.connection().unwrap();
        let nulls: i64 = conn
            .query_row("SELECT COUNT(*) FROM posts WHERE description IS NULL", [], |row| row.get(0))
            .unwrap();
        assert_eq!(nulls, 1);
    }

    #[test]
    fn test_insert_for_missing_feed_fails() {
        let fx = setup();
        let result = fx.posts.insert(&post(Uuid::new_v4(), "https://example.com/a"));

        assert!(matches!(result, Err(AggregatorError::Database(_))));
    }

    #[test]
    fn test_posts_for_user_follow_only_newest_first() {
        let fx = setup();
        SqliteFollowRepository::new(fx.storage.clone())
            .add(&FeedFollow::new(fx.user.id, fx.feed.id))
            .unwrap();

        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        for i in 0..3 {
            let mut p = post(fx.feed.id, &format!("https://example.com/{}", i));
            p.published_at = base + Duration::days(i);
            fx.posts.insert(&p).unwrap();
        }

        let posts = fx.posts.get_for_user(fx.user.id, 2).unwrap();
        let urls: Vec<&str> = posts.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["https://example.com/2", "https://example.com/1"]);

        assert!(fx.posts.get_for_user(Uuid::new_v4(), 10).unwrap().is_empty());
    }
}
