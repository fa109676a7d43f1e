use std::time::Duration;

use reqwest::blocking::Client;

use crate::errors::{AggregatorResult, FetchError};
use crate::sources::traits::DocumentFetcher;

/// Upper bound on a single feed request, connect through body.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> AggregatorResult<Self> {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> AggregatorResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("aggregator/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

impl DocumentFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let bytes = response.bytes()?;
        Ok(bytes.to_vec())
    }
}
