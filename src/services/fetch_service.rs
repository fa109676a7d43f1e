use chrono::Utc;
use tracing::{debug, info, warn};

use crate::domain::Feed;
use crate::errors::AggregatorResult;
use crate::services::normalizer;
use crate::sources::{parse_document, DocumentFetcher, ParsedFeedDocument};
use crate::storage::traits::{FeedRepository, InsertOutcome, PostRepository};

/// Per-item counts for a feed that was fetched and parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectStats {
    pub found: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

/// Terminal state of one fetch worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Collected(CollectStats),
    ClaimFailed(String),
    FetchFailed(String),
    ParseFailed(String),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Collected(_))
    }

    pub fn inserted(&self) -> usize {
        match self {
            FetchOutcome::Collected(stats) => stats.inserted,
            _ => 0,
        }
    }
}

pub struct FetchService<F: FeedRepository, P: PostRepository, D: DocumentFetcher> {
    feed_repository: F,
    post_repository: P,
    fetcher: D,
}

impl<F: FeedRepository, P: PostRepository, D: DocumentFetcher> FetchService<F, P, D> {
    pub fn new(feed_repository: F, post_repository: P, fetcher: D) -> Self {
        Self {
            feed_repository,
            post_repository,
            fetcher,
        }
    }

    /// The feeds due next, oldest watermark first.
    pub fn select_batch(&self, limit: usize) -> AggregatorResult<Vec<Feed>> {
        self.feed_repository.next_to_fetch(limit)
    }

    /// Claim, fetch, parse and store one feed. Never fails; every problem is
    /// folded into the returned outcome and logged.
    pub fn fetch_feed(&self, feed: &Feed) -> FetchOutcome {
        // Claim before fetching so an unreachable feed cannot hog every tick
        if let Err(e) = self.feed_repository.mark_fetched(feed.id, Utc::now()) {
            warn!(feed = %feed.name, error = %e, "Failed to mark feed as fetched");
            return FetchOutcome::ClaimFailed(e.to_string());
        }

        let bytes = match self.fetcher.fetch(&feed.url) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(feed = %feed.name, url = %feed.url, error = %e, "Failed to fetch feed");
                return FetchOutcome::FetchFailed(e.to_string());
            }
        };

        let document = match parse_document(&bytes) {
            Ok(document) => document,
            Err(e) => {
                warn!(feed = %feed.name, url = %feed.url, error = %e, "Failed to parse feed");
                return FetchOutcome::ParseFailed(e.to_string());
            }
        };

        let stats = self.save_posts(feed, &document);
        info!(
            feed = %feed.name,
            found = stats.found,
            inserted = stats.inserted,
            duplicates = stats.duplicates,
            skipped = stats.skipped,
            "Feed collected"
        );

        FetchOutcome::Collected(stats)
    }

    fn save_posts(&self, feed: &Feed, document: &ParsedFeedDocument) -> CollectStats {
        let mut stats = CollectStats {
            found: document.items.len(),
            ..Default::default()
        };

        for item in &document.items {
            let post = match normalizer::normalize(item, feed) {
                Ok(post) => post,
                Err(e) => {
                    debug!(feed = %feed.name, error = %e, "Skipping item");
                    stats.skipped += 1;
                    continue;
                }
            };

            match self.post_repository.insert(&post) {
                Ok(InsertOutcome::Created) => stats.inserted += 1,
                Ok(InsertOutcome::Duplicate) => stats.duplicates += 1,
                Err(e) => {
                    warn!(feed = %feed.name, url = %post.url, error = %e, "Failed to save post");
                    stats.skipped += 1;
                }
            }
        }

        stats
    }
}
