use rusqlite::OptionalExtension;

use crate::domain::User;
use crate::errors::{AggregatorError, AggregatorResult};
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::UserRepository;

pub struct SqliteUserRepository {
    storage: SqliteStorage,
}

impl SqliteUserRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }
}

impl UserRepository for SqliteUserRepository {
    fn add(&self, user: &User) -> AggregatorResult<()> {
        let conn = self.storage.connection()?;
        conn.execute(
            "INSERT INTO users (id, name, api_key, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            (user.id, &user.name, &user.api_key, user.created_at, user.updated_at),
        )?;
        Ok(())
    }

    fn get_by_api_key(&self, api_key: &str) -> AggregatorResult<Option<User>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, api_key, created_at, updated_at FROM users WHERE api_key = ?1",
        )?;

        stmt.query_row([api_key], |row| {
            Ok(User {
                id: row.get(0)?,
                name: row.get(1)?,
                api_key: row.get(2)?,
                created_at: row.get(3)?,
                updated_at: row.get(4)?,
            })
        })
        .optional()
        .map_err(AggregatorError::from)
    }
}
