//! HTTP client for the upstream listing and detail endpoints.
//!
//! The listing endpoint is a paginated JSON feed consumed with `limit` and
//! `offset` query parameters; the detail endpoint takes the URL-encoded
//! canonical article URL as a query parameter and returns raw body markup.
//!
//! # Retry strategy
//!
//! Transient failures (transport errors, 5xx, 429) are retried with
//! exponential backoff and jitter:
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
//! ```
//!
//! Non-transient failures (4xx, malformed JSON) surface immediately. Retry
//! exhaustion on the listing endpoint ends the run; on the detail endpoint it
//! costs one article.

use crate::error::ScrapeError;
use crate::models::{ArticleDetail, ArticleSummary, ListingPage};
use rand::{rng, Rng};
use reqwest::header::{HeaderMap, HeaderValue, REFERER, USER_AGENT};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Production listing endpoint (nation section, paginated).
pub const DEFAULT_LISTING_URL: &str =
    "https://od2-content-api.abs-cbn.com/prod/latest?sectionId=nation&brand=OD&partner=imp-01";

/// Production detail endpoint. The canonical article URL goes in the `url`
/// query parameter.
pub const DEFAULT_DETAIL_URL: &str =
    "https://od2-content-api.abs-cbn.com/prod/detail?brand=OD&partner=imp-01";

/// Base site URL used to build canonical article links from sluglines.
pub const DEFAULT_SITE_BASE: &str = "https://news.abs-cbn.com";

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120.0.0.0 Safari/537.36";

/// Outcome of one listing page fetch.
///
/// Callers can distinguish "no more data" from "upstream failed": the latter
/// is a [`ScrapeError`], never a silent empty page.
#[derive(Debug)]
pub enum PageResult {
    /// The page's items, in upstream order.
    Items(Vec<ArticleSummary>),
    /// The upstream returned zero items: pagination is exhausted.
    EndOfData,
}

/// An upstream news source the pipeline can page through.
///
/// [`NewsApi`] implements this over HTTP; tests drive the pipeline with an
/// in-memory implementation instead.
pub trait NewsSource {
    /// Fetch one listing page at the given offset.
    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<PageResult, ScrapeError>;

    /// Fetch the raw body markup for a canonical article URL.
    async fn fetch_article(&self, link: &str) -> Result<String, ScrapeError>;
}

/// HTTP client for the content API.
#[derive(Debug, Clone)]
pub struct NewsApi {
    client: reqwest::Client,
    listing_url: String,
    detail_url: String,
    max_retries: usize,
    base_delay: Duration,
    max_delay: Duration,
}

impl NewsApi {
    /// Build a client for the given endpoints.
    ///
    /// The client sends a browser-like `User-Agent` and the site `Referer`
    /// on every request; the upstream rejects bare default agents.
    pub fn new(
        listing_url: impl Into<String>,
        detail_url: impl Into<String>,
    ) -> Result<Self, ScrapeError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(REFERER, HeaderValue::from_static(DEFAULT_SITE_BASE));
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            listing_url: listing_url.into(),
            detail_url: detail_url.into(),
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        })
    }

    /// Build a client for the production endpoints.
    pub fn production() -> Result<Self, ScrapeError> {
        Self::new(DEFAULT_LISTING_URL, DEFAULT_DETAIL_URL)
    }

    /// Override the maximum retry attempt count.
    pub fn with_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// The listing URL for one page of results.
    fn listing_page_url(&self, offset: usize, limit: usize) -> Result<String, ScrapeError> {
        let mut url = Url::parse(&self.listing_url)?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());
        Ok(url.into())
    }

    /// The detail URL for a canonical article link.
    fn detail_request_url(&self, link: &str) -> String {
        let sep = if self.detail_url.contains('?') { '&' } else { '?' };
        format!("{}{}url={}", self.detail_url, sep, urlencoding::encode(link))
    }

    /// Backoff for the given 1-based attempt: `base * 2^(attempt-1)`, capped
    /// at `max_delay`, plus up to 250ms of jitter. The exponent is clamped so
    /// large retry budgets never overflow the shift.
    fn backoff_delay(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31) as u32;
        let mut delay = self.base_delay.saturating_mul(1u32 << exponent);
        if delay > self.max_delay {
            delay = self.max_delay;
        }
        let jitter_ms: u64 = rng().random_range(0..=250);
        delay + Duration::from_millis(jitter_ms)
    }

    async fn try_get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ScrapeError> {
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                status,
                url: url.to_string(),
            });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// GET a JSON document with bounded exponential backoff on transient errors.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ScrapeError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.try_get_json::<T>(url).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries || !e.is_transient() {
                        warn!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                            error = %e,
                            "request failed; giving up"
                        );
                        return Err(e);
                    }

                    let delay = self.backoff_delay(attempt);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                        ?delay,
                        error = %e,
                        "request failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

impl NewsSource for NewsApi {
    #[instrument(level = "info", skip(self))]
    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<PageResult, ScrapeError> {
        let url = self.listing_page_url(offset, limit)?;
        let page: ListingPage = self.get_json(&url).await?;

        if page.list_item.is_empty() {
            info!(offset, "listing returned no items");
            return Ok(PageResult::EndOfData);
        }
        info!(offset, count = page.list_item.len(), "fetched listing page");
        Ok(PageResult::Items(page.list_item))
    }

    #[instrument(level = "info", skip(self))]
    async fn fetch_article(&self, link: &str) -> Result<String, ScrapeError> {
        let url = self.detail_request_url(link);
        let detail: ArticleDetail = self.get_json(&url).await?;
        let body = detail.into_body();
        debug!(%link, bytes = body.len(), "fetched article body");
        Ok(body)
    }
}

/// Build the canonical absolute article URL from a listing slugline.
pub fn canonical_link(site_base: &str, slugline: &str) -> String {
    format!(
        "{}/{}",
        site_base.trim_end_matches('/'),
        slugline.trim_start_matches('/')
    )
}
