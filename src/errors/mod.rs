use thiserror::Error;

#[derive(Error, Debug)]
pub enum AggregatorError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Account errors
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    // Feed errors
    #[error("Feed not found: {0}")]
    FeedNotFound(String),

    #[error("Feed already exists: {0}")]
    FeedAlreadyExists(String),

    // Follow errors
    #[error("Already following feed: {0}")]
    AlreadyFollowing(String),

    #[error("Feed follow not found: {0}")]
    FollowNotFound(String),

    // Network errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // Storage errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // User input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type AggregatorResult<T> = Result<T, AggregatorError>;

/// Failure retrieving a feed document.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("failed to read body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else if err.is_body() || err.is_decode() {
            FetchError::Body(err.to_string())
        } else {
            FetchError::Connect(err.to_string())
        }
    }
}

/// The fetched bytes are not a well-formed RSS document.
#[derive(Error, Debug)]
#[error("malformed feed document: {0}")]
pub struct ParseError(pub String);

/// A single item could not be turned into a post.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("item has no link")]
    MissingLink,

    #[error("item has no publish date")]
    MissingPublishDate,

    #[error("invalid publish date {0:?}")]
    InvalidPublishDate(String),
}
