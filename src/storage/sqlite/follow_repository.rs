use uuid::Uuid;

use crate::domain::FeedFollow;
use crate::errors::{AggregatorError, AggregatorResult};
use crate::storage::sqlite::{is_unique_violation, SqliteStorage};
use crate::storage::traits::FollowRepository;

pub struct SqliteFollowRepository {
    storage: SqliteStorage,
}

impl SqliteFollowRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }
}

impl FollowRepository for SqliteFollowRepository {
    fn add(&self, follow: &FeedFollow) -> AggregatorResult<()> {
        let conn = self.storage.connection()?;
        let result = conn.execute(
            "INSERT INTO feed_follows (id, user_id, feed_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                follow.id,
                follow.user_id,
                follow.feed_id,
                follow.created_at,
                follow.updated_at,
            ),
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                Err(AggregatorError::AlreadyFollowing(follow.feed_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn get_for_user(&self, user_id: Uuid) -> AggregatorResult<Vec<FeedFollow>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, feed_id, created_at, updated_at FROM feed_follows WHERE user_id = ?1 ORDER BY created_at ASC",
        )?;

        let follows = stmt.query_map([user_id], |row| {
            Ok(FeedFollow {
                id: row.get(0)?,
                user_id: row.get(1)?,
                feed_id: row.get(2)?,
                created_at: row.get(3)?,
                updated_at: row.get(4)?,
            })
        })?;

        follows.collect::<Result<Vec<_>, _>>().map_err(AggregatorError::from)
    }

    fn remove(&self, id: Uuid, user_id: Uuid) -> AggregatorResult<()> {
        let conn = self.storage.connection()?;
        let removed = conn.execute(
            "DELETE FROM feed_follows WHERE id = ?1 AND user_id = ?2",
            (id, user_id),
        )?;

        if removed == 0 {
            return Err(AggregatorError::FollowNotFound(id.to_string()));
        }
        Ok(())
    }
}
