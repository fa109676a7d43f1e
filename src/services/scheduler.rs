use std::thread;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::errors::AggregatorResult;
use crate::services::fetch_service::{FetchOutcome, FetchService};
use crate::sources::DocumentFetcher;
use crate::storage::traits::{FeedRepository, PostRepository};

/// Summary of one scheduling tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub selected: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub inserted: usize,
}

/// Timer-driven fan-out/fan-in over the least recently fetched feeds.
///
/// Each tick selects at most `concurrency` feeds, runs one worker thread per
/// feed and waits for every worker before the next tick can start, so no more
/// than `concurrency` fetches are ever in flight.
pub struct Scheduler<F: FeedRepository, P: PostRepository, D: DocumentFetcher> {
    service: FetchService<F, P, D>,
    interval: Duration,
    concurrency: usize,
}

impl<F: FeedRepository, P: PostRepository, D: DocumentFetcher> Scheduler<F, P, D> {
    pub fn new(service: FetchService<F, P, D>, interval: Duration, concurrency: usize) -> Self {
        Self {
            service,
            interval,
            concurrency,
        }
    }

    /// Runs ticks until the process exits. The first tick starts immediately.
    pub fn run(&self) -> ! {
        info!(
            interval_secs = self.interval.as_secs(),
            concurrency = self.concurrency,
            "Starting feed scheduler"
        );

        loop {
            let started = Instant::now();

            if let Err(e) = self.tick() {
                error!(error = %e, "Failed to select feeds, skipping tick");
            }

            thread::sleep(self.interval.saturating_sub(started.elapsed()));
        }
    }

    /// Select one batch, fetch every feed in it concurrently and wait for all of them.
    pub fn tick(&self) -> AggregatorResult<TickReport> {
        let feeds = self.service.select_batch(self.concurrency)?;
        info!(count = feeds.len(), "Found feeds to fetch");

        let outcomes: Vec<FetchOutcome> = thread::scope(|scope| {
            let handles: Vec<_> = feeds
                .iter()
                .map(|feed| (feed, scope.spawn(move || self.service.fetch_feed(feed))))
                .collect();

            handles
                .into_iter()
                .filter_map(|(feed, handle)| match handle.join() {
                    Ok(outcome) => Some(outcome),
                    Err(_) => {
                        warn!(feed = %feed.name, "Fetch worker panicked");
                        None
                    }
                })
                .collect()
        });

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        let report = TickReport {
            selected: feeds.len(),
            succeeded,
            failed: feeds.len() - succeeded,
            inserted: outcomes.iter().map(FetchOutcome::inserted).sum(),
        };

        info!(
            selected = report.selected,
            succeeded = report.succeeded,
            failed = report.failed,
            inserted = report.inserted,
            "Tick complete"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use chrono::{Duration as ChronoDuration, Utc};

    use crate::domain::{Feed, User};
    use crate::errors::{AggregatorError, FetchError};
    use crate::sources::traits::MockDocumentFetcher;
    use crate::storage::sqlite::{
        SqliteFeedRepository, SqlitePostRepository, SqliteStorage, SqliteUserRepository,
    };
    use crate::storage::traits::{MockFeedRepository, MockPostRepository, UserRepository};

    const EMPTY_FEED: &[u8] =
        br#"<rss version="2.0"><channel><title>t</title><link>l</link><description>d</description></channel></rss>"#;

    fn storage_with_feeds(names: &[&str]) -> (SqliteStorage, Vec<Feed>) {
        let storage = SqliteStorage::in_memory().unwrap();
        let user = User::new("Sample User".to_string());
        SqliteUserRepository::new(storage.clone()).add(&user).unwrap();

        let repo = SqliteFeedRepository::new(storage.clone());
        let feeds = names
            .iter()
            .map(|name| {
                let feed = Feed::new(
                    name.to_string(),
                    format!("https://{}.example.com/rss", name),
                    user.id,
                );
                repo.add(&feed).unwrap();
                feed
            })
            .collect();

        (storage, feeds)
    }

    fn scheduler<D: DocumentFetcher>(
        storage: &SqliteStorage,
        fetcher: D,
        concurrency: usize,
    ) -> Scheduler<SqliteFeedRepository, SqlitePostRepository, D> {
        let service = FetchService::new(
            SqliteFeedRepository::new(storage.clone()),
            SqlitePostRepository::new(storage.clone()),
            fetcher,
        );
        Scheduler::new(service, Duration::from_secs(60), concurrency)
    }

    /// Slow fetcher that records how many calls overlap.
    struct SlowFetcher {
        delay: Duration,
        in_flight: AtomicUsize,
        peak: Arc<AtomicUsize>,
        completed: Arc<AtomicUsize>,
    }

    impl SlowFetcher {
        fn new(delay: Duration) -> (Self, Arc<AtomicUsize>, Arc<AtomicUsize>) {
            let peak = Arc::new(AtomicUsize::new(0));
            let completed = Arc::new(AtomicUsize::new(0));
            let fetcher = Self {
                delay,
                in_flight: AtomicUsize::new(0),
                peak: peak.clone(),
                completed: completed.clone(),
            };
            (fetcher, peak, completed)
        }
    }

    impl DocumentFetcher for SlowFetcher {
        fn fetch(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(self.delay);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.completed.fetch_add(1, Ordering::SeqCst);
            Ok(EMPTY_FEED.to_vec())
        }
    }

    #[test]
    fn test_tick_waits_for_every_worker() {
        let (storage, _) = storage_with_feeds(&["a", "b", "c", "d"]);
        let (fetcher, peak, completed) = SlowFetcher::new(Duration::from_millis(300));
        let scheduler = scheduler(&storage, fetcher, 4);

        let started = Instant::now();
        let report = scheduler.tick().unwrap();

        assert_eq!(completed.load(Ordering::SeqCst), 4);
        assert_eq!(report.selected, 4);
        assert_eq!(report.succeeded, 4);
        // Workers overlap rather than run back to back
        assert!(started.elapsed() < Duration::from_millis(1000));
        assert!(peak.load(Ordering::SeqCst) <= 4);
    }

    #[test]
    fn test_batch_size_caps_work_per_tick() {
        let (storage, _) = storage_with_feeds(&["a", "b", "c", "d", "e"]);
        let (fetcher, peak, completed) = SlowFetcher::new(Duration::from_millis(10));
        let scheduler = scheduler(&storage, fetcher, 2);

        let report = scheduler.tick().unwrap();

        assert_eq!(report.selected, 2);
        assert_eq!(completed.load(Ordering::SeqCst), 2);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_successive_ticks_rotate_through_feeds() {
        let (storage, feeds) = storage_with_feeds(&["a", "b", "c"]);
        let mut fetcher = MockDocumentFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_| Ok(EMPTY_FEED.to_vec()));
        let scheduler = scheduler(&storage, fetcher, 2);

        scheduler.tick().unwrap();
        scheduler.tick().unwrap();

        // After two ticks of two, every feed has been claimed at least once
        let repo = SqliteFeedRepository::new(storage.clone());
        for feed in feeds {
            let stored = repo.get_by_id(feed.id).unwrap().unwrap();
            assert!(stored.last_fetched_at.is_some(), "{} never fetched", feed.name);
        }
    }

    #[test]
    fn test_never_fetched_feed_wins_single_slot() {
        let (storage, feeds) = storage_with_feeds(&["old", "new"]);
        SqliteFeedRepository::new(storage.clone())
            .mark_fetched(feeds[0].id, Utc::now() - ChronoDuration::hours(1))
            .unwrap();

        let mut fetcher = MockDocumentFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| url.starts_with("https://new."))
            .times(1)
            .returning(|_| Ok(EMPTY_FEED.to_vec()));

        let report = scheduler(&storage, fetcher, 1).tick().unwrap();
        assert_eq!(report.selected, 1);
    }

    #[test]
    fn test_failing_feed_does_not_stop_the_tick() {
        let (storage, _) = storage_with_feeds(&["down", "up"]);
        let mut fetcher = MockDocumentFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|url| {
                if url.contains("down") {
                    Err(FetchError::Connect("connection refused".to_string()))
                } else {
                    Ok(EMPTY_FEED.to_vec())
                }
            });

        let report = scheduler(&storage, fetcher, 10).tick().unwrap();

        assert_eq!(
            report,
            TickReport {
                selected: 2,
                succeeded: 1,
                failed: 1,
                inserted: 0,
            }
        );
    }

    #[test]
    fn test_selection_failure_is_reported() {
        let mut feeds = MockFeedRepository::new();
        feeds
            .expect_next_to_fetch()
            .returning(|_| Err(AggregatorError::LockPoisoned));
        let mut fetcher = MockDocumentFetcher::new();
        fetcher.expect_fetch().times(0);

        let service = FetchService::new(feeds, MockPostRepository::new(), fetcher);
        let scheduler = Scheduler::new(service, Duration::from_secs(60), 5);

        assert!(scheduler.tick().is_err());
    }

    #[test]
    fn test_empty_store_is_an_empty_tick() {
        let (storage, _) = storage_with_feeds(&[]);
        let mut fetcher = MockDocumentFetcher::new();
        fetcher.expect_fetch().times(0);

        let report = scheduler(&storage, fetcher, 3).tick().unwrap();
        assert_eq!(report, TickReport::default());
    }
}
