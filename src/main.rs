use clap::Parser;

use aggregator::cli::{Cli, Commands, FeedCommands, FollowCommands, UserCommands};
use aggregator::config::Config;
use aggregator::errors::AggregatorResult;
use aggregator::logging;
use aggregator::services::{FeedService, FetchService, Scheduler};
use aggregator::sources::HttpFetcher;
use aggregator::storage::sqlite::{
    SqliteFeedRepository, SqliteFollowRepository, SqlitePostRepository, SqliteStorage,
    SqliteUserRepository,
};

type Service = FeedService<
    SqliteUserRepository,
    SqliteFeedRepository,
    SqliteFollowRepository,
    SqlitePostRepository,
>;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> AggregatorResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;
    logging::init(&config.log_level);

    // Initialize storage
    let storage = SqliteStorage::new(&config.db_path)?;
    let service = FeedService::new(
        SqliteUserRepository::new(storage.clone()),
        SqliteFeedRepository::new(storage.clone()),
        SqliteFollowRepository::new(storage.clone()),
        SqlitePostRepository::new(storage.clone()),
    );

    match cli.command {
        Commands::User { command } => match command {
            UserCommands::Create { name } => cmd_user_create(&service, &name),
            UserCommands::Show { api_key } => cmd_user_show(&service, &api_key),
        },
        Commands::Feed { command } => match command {
            FeedCommands::Add { api_key, name, url } => {
                cmd_feed_add(&service, &api_key, &name, &url)
            }
            FeedCommands::List { json } => cmd_feed_list(&service, json),
        },
        Commands::Follow { command } => match command {
            FollowCommands::Add { api_key, feed_id } => {
                let user = service.authenticate(&api_key)?;
                let follow = service.follow(&user, feed_id)?;
                println!("Following feed {}", follow.feed_id);
                println!("  Follow ID: {}", follow.id);
                Ok(())
            }
            FollowCommands::List { api_key, json } => cmd_follow_list(&service, &api_key, json),
            FollowCommands::Remove { api_key, follow_id } => {
                let user = service.authenticate(&api_key)?;
                service.unfollow(&user, follow_id)?;
                println!("Unfollowed: {}", follow_id);
                Ok(())
            }
        },
        Commands::Posts {
            api_key,
            limit,
            json,
        } => cmd_posts(&service, &api_key, limit, json),
        Commands::Run {
            once,
            interval,
            concurrency,
        } => cmd_run(storage, &config, once, interval, concurrency),
    }
}

fn cmd_user_create(service: &Service, name: &str) -> AggregatorResult<()> {
    let user = service.create_user(name)?;

    println!("User created: {}", user.name);
    println!("  ID: {}", user.id);
    println!("  API key: {}", user.api_key);
    Ok(())
}

fn cmd_user_show(service: &Service, api_key: &str) -> AggregatorResult<()> {
    let user = service.authenticate(api_key)?;

    println!("{}", user.name);
    println!("  ID: {}", user.id);
    println!("  Created: {}", user.created_at.to_rfc3339());
    Ok(())
}

fn cmd_feed_add(service: &Service, api_key: &str, name: &str, url: &str) -> AggregatorResult<()> {
    let user = service.authenticate(api_key)?;
    let (feed, follow) = service.add_feed(&user, name, url)?;

    println!("Feed added successfully!");
    println!("  Name: {}", feed.name);
    println!("  URL: {}", feed.url);
    println!("  Feed ID: {}", feed.id);
    println!("  Follow ID: {}", follow.id);
    Ok(())
}

fn cmd_feed_list(service: &Service, json: bool) -> AggregatorResult<()> {
    let feeds = service.list_feeds()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&feeds)?);
        return Ok(());
    }

    if feeds.is_empty() {
        println!("No feeds registered.");
        return Ok(());
    }

    println!("Registered feeds:\n");
    for feed in feeds {
        println!("  {} ({})", feed.name, feed.id);
        println!("    URL: {}", feed.url);
        match feed.last_fetched_at {
            Some(at) => println!("    Last fetched: {}", at.to_rfc3339()),
            None => println!("    Last fetched: never"),
        }
        println!();
    }

    Ok(())
}

fn cmd_follow_list(service: &Service, api_key: &str, json: bool) -> AggregatorResult<()> {
    let user = service.authenticate(api_key)?;
    let follows = service.follows(&user)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&follows)?);
        return Ok(());
    }

    if follows.is_empty() {
        println!("Not following any feeds.");
        return Ok(());
    }

    for follow in follows {
        println!("  {} -> feed {}", follow.id, follow.feed_id);
    }
    Ok(())
}

fn cmd_posts(service: &Service, api_key: &str, limit: usize, json: bool) -> AggregatorResult<()> {
    let user = service.authenticate(api_key)?;
    let posts = service.posts(&user, limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&posts)?);
        return Ok(());
    }

    if posts.is_empty() {
        println!("No posts yet.");
        return Ok(());
    }

    for post in posts {
        println!("{} [{}]", post.title, post.published_at.format("%Y-%m-%d %H:%M"));
        println!("  {}", post.url);
        if let Some(description) = post.description {
            println!("  {}", description);
        }
        println!();
    }

    Ok(())
}

fn cmd_run(
    storage: SqliteStorage,
    config: &Config,
    once: bool,
    interval: Option<u64>,
    concurrency: Option<u64>,
) -> AggregatorResult<()> {
    let interval = interval
        .map(std::time::Duration::from_secs)
        .unwrap_or(config.interval);
    let concurrency = concurrency
        .map(|n| n as usize)
        .unwrap_or(config.concurrency);

    let fetch_service = FetchService::new(
        SqliteFeedRepository::new(storage.clone()),
        SqlitePostRepository::new(storage),
        HttpFetcher::new()?,
    );
    let scheduler = Scheduler::new(fetch_service, interval, concurrency);

    if !once {
        scheduler.run();
    }

    let report = scheduler.tick()?;
    println!(
        "Fetched {} feeds: {} succeeded, {} failed, {} new posts.",
        report.selected, report.succeeded, report.failed, report.inserted
    );

    Ok(())
}
