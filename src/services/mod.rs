pub mod feed_service;
pub mod fetch_service;
pub mod normalizer;
pub mod scheduler;

pub use feed_service::{FeedService, DEFAULT_POST_LIMIT};
pub use fetch_service::{CollectStats, FetchOutcome, FetchService};
pub use scheduler::{Scheduler, TickReport};
