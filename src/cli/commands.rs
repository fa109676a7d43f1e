use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::services::DEFAULT_POST_LIMIT;

#[derive(Parser)]
#[command(name = "aggregator")]
#[command(about = "RSS aggregator that periodically collects posts from registered feeds")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Register and list feeds
    Feed {
        #[command(subcommand)]
        command: FeedCommands,
    },

    /// Follow or unfollow feeds
    Follow {
        #[command(subcommand)]
        command: FollowCommands,
    },

    /// Show the newest posts from followed feeds
    Posts {
        /// API key of the user
        #[arg(long, env = "AGGREGATOR_API_KEY", hide_env_values = true)]
        api_key: String,

        /// Maximum number of posts to show
        #[arg(short, long, default_value_t = DEFAULT_POST_LIMIT)]
        limit: usize,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Start the feed-fetch scheduler
    Run {
        /// Run a single tick and exit
        #[arg(long)]
        once: bool,

        /// Seconds between ticks (overrides SCRAPE_INTERVAL_SECS)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,

        /// Feeds fetched per tick (overrides SCRAPE_CONCURRENCY)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        concurrency: Option<u64>,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a user and print its API key
    Create {
        /// Display name
        name: String,
    },

    /// Show the user owning an API key
    Show {
        #[arg(long, env = "AGGREGATOR_API_KEY", hide_env_values = true)]
        api_key: String,
    },
}

#[derive(Subcommand)]
pub enum FeedCommands {
    /// Register a feed and follow it
    Add {
        #[arg(long, env = "AGGREGATOR_API_KEY", hide_env_values = true)]
        api_key: String,

        /// Display name of the feed
        name: String,

        /// Feed URL, stored as given
        url: String,
    },

    /// List all registered feeds
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum FollowCommands {
    /// Follow an existing feed
    Add {
        #[arg(long, env = "AGGREGATOR_API_KEY", hide_env_values = true)]
        api_key: String,

        /// ID of the feed to follow
        feed_id: Uuid,
    },

    /// List the feeds you follow
    List {
        #[arg(long, env = "AGGREGATOR_API_KEY", hide_env_values = true)]
        api_key: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Stop following a feed
    Remove {
        #[arg(long, env = "AGGREGATOR_API_KEY", hide_env_values = true)]
        api_key: String,

        /// ID of the follow to remove
        follow_id: Uuid,
    },
}
