//! Horizon-backed [`LedgerQueryService`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use strand_types::{balance_map, Balance, BalanceMap, NetworkDetails, RawOperation};
use tracing::debug;

use crate::config::HistoryConfig;
use crate::error::HistoryError;
use crate::service::LedgerQueryService;

#[derive(Debug, Deserialize)]
struct Href {
    href: String,
}

#[derive(Debug, Default, Deserialize)]
struct PageLinks {
    #[serde(default)]
    next: Option<Href>,
}

#[derive(Debug, Deserialize)]
struct Embedded<T> {
    records: Vec<T>,
}

/// One page of a Horizon collection.
#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(rename = "_embedded")]
    embedded: Embedded<T>,
    #[serde(rename = "_links", default)]
    links: PageLinks,
}

#[derive(Debug, Deserialize)]
struct AccountRecord {
    #[serde(default)]
    balances: Vec<Balance>,
}

/// HTTP client for the Horizon REST API.
#[derive(Clone, Debug)]
pub struct HorizonClient {
    http: reqwest::Client,
    page_size: u32,
    max_pages: u32,
}

impl HorizonClient {
    pub fn new(
        request_timeout: Duration,
        connect_timeout: Duration,
        page_size: u32,
        max_pages: u32,
    ) -> Result<Self, HistoryError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| HistoryError::Http(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            page_size,
            max_pages: max_pages.max(1),
        })
    }

    pub fn from_config(config: &HistoryConfig) -> Result<Self, HistoryError> {
        Self::new(
            config.request_timeout(),
            config.connect_timeout(),
            config.page_size,
            config.max_pages,
        )
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, HistoryError> {
        debug!(%url, "horizon request");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HistoryError::Status {
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }
        response
            .json()
            .await
            .map_err(|e| HistoryError::Decode(e.to_string()))
    }
}

pub(crate) fn operations_url(horizon_url: &str, public_key: &str, page_size: u32) -> String {
    format!(
        "{}/accounts/{public_key}/operations?order=desc&limit={page_size}&join=transactions&include_failed=true",
        horizon_url.trim_end_matches('/')
    )
}

pub(crate) fn account_url(horizon_url: &str, public_key: &str) -> String {
    format!("{}/accounts/{public_key}", horizon_url.trim_end_matches('/'))
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[async_trait]
impl LedgerQueryService for HorizonClient {
    async fn fetch_operations(
        &self,
        public_key: &str,
        network: &NetworkDetails,
    ) -> Result<Vec<RawOperation>, HistoryError> {
        let mut url = operations_url(&network.horizon_url, public_key, self.page_size);
        let mut operations = Vec::new();

        for _ in 0..self.max_pages {
            let page: Page<RawOperation> = self.get_json(&url).await?;
            let received = page.embedded.records.len();
            operations.extend(page.embedded.records);
            match page.links.next {
                Some(next) if received as u32 >= self.page_size => url = next.href,
                _ => break,
            }
        }

        Ok(operations)
    }

    async fn fetch_balances(
        &self,
        public_key: &str,
        network: &NetworkDetails,
    ) -> Result<BalanceMap, HistoryError> {
        let url = account_url(&network.horizon_url, public_key);
        match self.get_json::<AccountRecord>(&url).await {
            Ok(account) => Ok(balance_map(account.balances)),
            // Unfunded accounts have no ledger entry yet.
            Err(HistoryError::Status { status: 404, .. }) => Ok(BalanceMap::new()),
            Err(e) => Err(e),
        }
    }
}
