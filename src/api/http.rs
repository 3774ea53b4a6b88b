use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::SwipeApi;
use crate::config::Config;
use crate::models::{FilterCriteria, Holding, SwipeCandidate, SwipeRecord, WatchlistEntry};

#[derive(Debug, Deserialize)]
struct CandidatesResponse {
    #[serde(default)]
    stocks: Vec<SwipeCandidate>,
}

#[derive(Debug, Deserialize)]
struct HoldingsResponse {
    #[serde(default)]
    holdings: Vec<Holding>,
}

#[derive(Debug, Deserialize)]
struct WatchlistResponse {
    #[serde(default)]
    watchlist: Vec<WatchlistEntry>,
}

#[derive(Debug, Serialize)]
struct WatchlistAddRequest<'a> {
    symbol: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
}

/// JSON-over-HTTP client for the swipe backend.
pub struct HttpSwipeApi {
    client: Client,
    base_url: String,
}

impl HttpSwipeApi {
    pub fn new(base_url: &str, cfg: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(cfg.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(resp: Response, what: &str) -> Result<Response> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("{} failed with HTTP {}: {}", what, status, body);
        }
        Ok(resp)
    }
}

#[async_trait]
impl SwipeApi for HttpSwipeApi {
    async fn fetch_candidates(
        &self,
        filters: &FilterCriteria,
        limit: usize,
    ) -> Result<Vec<SwipeCandidate>> {
        let resp = self
            .client
            .get(self.url("/api/stocks/swipeable"))
            .query(&filters.query_params(limit))
            .send()
            .await
            .context("Failed to fetch swipeable stocks")?;
        let resp = Self::check(resp, "Swipeable stocks").await?;

        let data: CandidatesResponse = resp
            .json()
            .await
            .context("Failed to parse swipeable stocks")?;
        debug!("Fetched {} candidates ({})", data.stocks.len(), filters);
        Ok(data.stocks)
    }

    async fn record_swipe(&self, record: &SwipeRecord) -> Result<()> {
        let resp = self
            .client
            .post(self.url("/api/stocks/swipe"))
            .json(record)
            .send()
            .await
            .context("Failed to post swipe")?;
        Self::check(resp, "Swipe recording").await?;
        Ok(())
    }

    async fn fetch_holdings(&self) -> Result<Vec<Holding>> {
        let resp = self
            .client
            .get(self.url("/api/portfolio/holdings"))
            .send()
            .await
            .context("Failed to fetch holdings")?;
        let resp = Self::check(resp, "Portfolio holdings").await?;

        let data: HoldingsResponse = resp.json().await.context("Failed to parse holdings")?;
        Ok(data.holdings)
    }

    async fn fetch_watchlist(&self) -> Result<Vec<WatchlistEntry>> {
        let resp = self
            .client
            .get(self.url("/api/watchlist"))
            .send()
            .await
            .context("Failed to fetch watchlist")?;
        let resp = Self::check(resp, "Watchlist").await?;

        let data: WatchlistResponse = resp.json().await.context("Failed to parse watchlist")?;
        Ok(data.watchlist)
    }

    async fn add_to_watchlist(&self, symbol: &str, note: Option<&str>) -> Result<()> {
        let resp = self
            .client
            .post(self.url("/api/watchlist"))
            .json(&WatchlistAddRequest { symbol, note })
            .send()
            .await
            .context("Failed to add to watchlist")?;
        Self::check(resp, "Watchlist add").await?;
        Ok(())
    }

    async fn remove_from_watchlist(&self, symbol: &str) -> Result<()> {
        let resp = self
            .client
            .delete(self.url(&format!("/api/watchlist/{}", symbol)))
            .send()
            .await
            .context("Failed to remove from watchlist")?;
        Self::check(resp, "Watchlist remove").await?;
        Ok(())
    }
}
