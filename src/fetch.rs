//! Network retrieval seam
//!
//! The engine treats fetching as an opaque `fetch(url) -> bytes or failure`
//! operation behind the [`Fetcher`] trait, so tests can script failures and
//! observe attempt counts without touching the network.

use crate::error::FetchError;

/// Browser-like User-Agent sent with every request; some image hosts reject
/// requests without one.
const USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 6.0; Nexus 5 Build/MRA58N) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Mobile Safari/537.36";

/// Abstraction over a single network retrieval attempt
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Attempt one retrieval of `url`, returning the body bytes on success
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Production [`Fetcher`] issuing HTTP GET requests via `reqwest`
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher with the default client settings
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError::Network`] if the HTTP client cannot be
    /// constructed (e.g., TLS backend initialization failure).
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    /// Build a fetcher around an existing client, e.g. one with a custom
    /// timeout or proxy
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}
