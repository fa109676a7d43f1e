pub mod traits;
pub mod sqlite;

pub use traits::{FeedRepository, FollowRepository, InsertOutcome, PostRepository, UserRepository};
pub use sqlite::{
    SqliteFeedRepository, SqliteFollowRepository, SqlitePostRepository, SqliteStorage,
    SqliteUserRepository,
};
