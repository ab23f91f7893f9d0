//! Page fetching for the upstream registry listing
//!
//! `PageFetcher` is the seam between the pipeline and the network. The real
//! implementation wraps `reqwest`; tests script an in-memory fake (see
//! `fakes`). One call fetches one page, applies the configured timeout, and
//! reports failure explicitly - no retries at this layer, the pipeline
//! aggregates page-level errors instead.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};

/// One page of the upstream paginated listing, shape
/// `{data: [...], meta: {pagination: {total, pageCount}}}`.
///
/// Records stay raw `Value`s here so one malformed record cannot fail the
/// page; the parser decides per record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPage {
    pub data: Vec<Value>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageMeta {
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page_count: u32,
}

/// Fetches one page of the remote listing.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `page` with `page_size` records. Timeout, connection failure,
    /// and non-2xx status all surface as `Err` - the caller decides whether
    /// that is fatal.
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<RawPage>;
}

/// `PageFetcher` backed by a shared `reqwest` client.
pub struct HttpPageFetcher {
    api_base: String,
    client: reqwest::Client,
}

impl HttpPageFetcher {
    /// Build the client once with the configured per-request timeout.
    pub fn new(config: &RegistryConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(concat!("acpdex/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        HttpPageFetcher {
            api_base: config.api_base.clone(),
            client,
        }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<RawPage> {
        debug!(page, page_size, "Fetching registry page");
        let response = self
            .client
            .get(&self.api_base)
            .query(&[
                ("pagination[page]", page.to_string()),
                ("pagination[pageSize]", page_size.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::UpstreamStatus {
                status: status.as_u16(),
                page,
            });
        }

        Ok(response.json::<RawPage>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_page_deserializes_wire_shape() {
        let page: RawPage = serde_json::from_value(json!({
            "data": [{"name": "A"}, {"name": "B"}],
            "meta": {"pagination": {"total": 250, "pageCount": 3}}
        }))
        .unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.meta.pagination.total, 250);
        assert_eq!(page.meta.pagination.page_count, 3);
    }

    #[test]
    fn test_raw_page_tolerates_missing_meta() {
        let page: RawPage = serde_json::from_value(json!({"data": []})).unwrap();
        assert_eq!(page.meta.pagination.total, 0);
        assert_eq!(page.meta.pagination.page_count, 0);
    }

    #[test]
    fn test_raw_page_tolerates_empty_body() {
        let page: RawPage = serde_json::from_value(json!({})).unwrap();
        assert!(page.data.is_empty());
    }
}
