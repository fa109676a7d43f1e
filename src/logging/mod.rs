use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber. `level` is the base filter and
/// `RUST_LOG` still wins when set.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    // A second call (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .try_init();
}

fn default_directives(level: &str) -> String {
    format!("{level},aggregator={level},reqwest=warn,rustls=warn")
}
