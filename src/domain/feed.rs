use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub user_id: Uuid,
    /// `None` until the scheduler has claimed the feed at least once.
    pub last_fetched_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Feed {
    pub fn new(name: String, url: String, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            url,
            user_id,
            last_fetched_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_never_fetched(&self) -> bool {
        self.last_fetched_at.is_none()
    }
}
