use crate::errors::FetchError;

#[cfg_attr(test, mockall::automock)]
pub trait DocumentFetcher: Send + Sync {
    /// Retrieve the raw document at `url`. No retries.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}
