use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::error::FetchError;

/// Fetches a single asset, reporting only success or failure. The warm-up
/// never keeps the bytes; the fetch exists to populate downstream caches.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<(), FetchError>;
}

/// HTTP asset loader. Relative asset paths are resolved against the site's
/// base URL; absolute URLs are fetched as-is.
///
/// Clone is cheap - reqwest::Client uses Arc internally for connection
/// pooling.
#[derive(Clone)]
pub struct HttpAssetLoader {
    client: Client,
    base_url: String,
}

impl HttpAssetLoader {
    /// Create a loader for the site at `base_url`.
    ///
    /// The client is built without a request timeout: warm-up loads are
    /// best-effort background work and a slow asset must count as exactly
    /// one attempt, never as a retried or aborted one.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}/{}", self.base_url, url.trim_start_matches('/'))
        }
    }
}

#[async_trait]
impl AssetLoader for HttpAssetLoader {
    async fn fetch(&self, url: &str) -> Result<(), FetchError> {
        let resolved = self.resolve(url);
        let response = self.client.get(&resolved).send().await?;

        let status = response.status();
        if status.is_success() {
            debug!(url = %resolved, "Asset fetched");
            Ok(())
        } else {
            Err(FetchError::Status(status))
        }
    }
}
