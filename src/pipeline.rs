//! Pipeline orchestrator: page, classify, filter, enrich, append.
//!
//! A [`Scraper`] drives one run end to end:
//!
//! 1. Fetch a listing page at the current offset.
//! 2. Classify each item's tags; skip non-disaster items.
//! 3. Apply the date-window predicate; out-of-window items are skipped but
//!    pagination continues, since upstream ordering relative to the window
//!    is not guaranteed.
//! 4. Skip links already in the archive.
//! 5. Fetch the article body, normalize it, append the enriched record.
//! 6. After the page bound, an empty page, or a listing failure: run the
//!    defensive file dedup pass and return the archive path.
//!
//! All state is explicit: keyword set, page size, loop bound, delays, and
//! the store handle live in the scraper, never in module-level mutables. A
//! listing failure ends the run gracefully with everything collected so far;
//! an article failure costs one body (recorded as an empty sentinel) and the
//! run continues.

use crate::api::{canonical_link, NewsApi, NewsSource, PageResult, DEFAULT_SITE_BASE};
use crate::classifier::TagClassifier;
use crate::error::ScrapeError;
use crate::models::ArticleRecord;
use crate::normalize::normalize;
use crate::store::CsvStore;
use crate::utils::truncate_for_log;
use crate::window::DateWindow;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Default archive filename, in the working directory.
pub const DEFAULT_OUTPUT_FILE: &str = "disaster_articles.csv";

/// Articles requested per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Maximum listing pages fetched per run.
pub const DEFAULT_MAX_PAGES: usize = 5;

/// Tunable configuration for one scraper instance.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Path of the CSV archive.
    pub output_path: PathBuf,
    /// Articles requested per listing page.
    pub page_size: usize,
    /// Upper bound on listing pages per run.
    pub max_pages: usize,
    /// Politeness pause between listing page fetches.
    pub page_delay: Duration,
    /// Politeness pause between article fetches within a page.
    pub article_delay: Duration,
    /// Base site URL for building canonical links from sluglines.
    pub site_base: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            page_delay: Duration::from_secs(1),
            article_delay: Duration::from_millis(250),
            site_base: DEFAULT_SITE_BASE.to_string(),
        }
    }
}

/// Summary of one completed run.
#[derive(Debug)]
pub struct RunReport {
    /// Path of the archive, for the caller and downstream consumers.
    pub store_path: PathBuf,
    /// Listing pages fetched with at least one item.
    pub pages_fetched: usize,
    /// Records appended during this run.
    pub appended: usize,
    /// Residual duplicate rows removed by the terminal dedup pass.
    pub duplicates_removed: usize,
}

/// Drives the fetch-filter-enrich-dedupe pipeline over a [`NewsSource`].
#[derive(Debug)]
pub struct Scraper<S> {
    source: S,
    classifier: TagClassifier,
    config: ScraperConfig,
}

impl<S: NewsSource> Scraper<S> {
    /// Build a scraper from its parts.
    pub fn new(source: S, classifier: TagClassifier, config: ScraperConfig) -> Self {
        Self {
            source,
            classifier,
            config,
        }
    }

    /// Run the pipeline once over the given date window.
    ///
    /// Cancellation is cooperative: the token is checked before each page
    /// fetch and before each article fetch, and a cancelled run ends cleanly
    /// with the archive valid and every fully processed record kept.
    ///
    /// # Returns
    ///
    /// A [`RunReport`] carrying the archive path and run counters. Listing
    /// failures end the run gracefully and still produce a report; only
    /// archive I/O failures surface as errors.
    #[instrument(level = "info", skip_all, fields(start = %window.start(), end = %window.end()))]
    pub async fn run(
        &self,
        window: &DateWindow,
        cancel: &CancellationToken,
    ) -> Result<RunReport, ScrapeError> {
        let mut store = CsvStore::open(&self.config.output_path)?;
        info!(
            existing = store.len(),
            limit = self.config.page_size,
            max_pages = self.config.max_pages,
            "starting scrape run"
        );

        let mut appended = 0usize;
        let mut pages_fetched = 0usize;

        'pages: for page_index in 0..self.config.max_pages {
            if cancel.is_cancelled() {
                info!("cancellation requested; stopping before next page");
                break;
            }

            let offset = page_index * self.config.page_size;
            let items = match self.source.fetch_page(offset, self.config.page_size).await {
                Ok(PageResult::Items(items)) => items,
                Ok(PageResult::EndOfData) => {
                    info!(offset, "no more articles");
                    break;
                }
                Err(e) => {
                    warn!(offset, error = %e, "listing fetch failed; ending run");
                    break;
                }
            };
            pages_fetched += 1;

            let mut matches = 0usize;
            for item in &items {
                let Some(keyword) = self.classifier.classify(item.tags.as_deref()) else {
                    continue;
                };
                if !window.contains_str(item.created_date_full.as_deref()) {
                    debug!(
                        title = %item.title,
                        date = ?item.created_date_full,
                        "matched item outside date window"
                    );
                    continue;
                }
                let Some(slugline) = item.slugline_url.as_deref() else {
                    warn!(title = %item.title, "matched item has no slugline; skipping");
                    continue;
                };
                let link = canonical_link(&self.config.site_base, slugline);
                if store.contains(&link) {
                    debug!(%link, "already archived");
                    continue;
                }

                if cancel.is_cancelled() {
                    info!("cancellation requested; stopping before next article");
                    break 'pages;
                }

                // A failed body fetch costs this article its text, not the run.
                let article = match self.source.fetch_article(&link).await {
                    Ok(raw) => normalize(&raw),
                    Err(e) => {
                        warn!(%link, error = %e, "article fetch failed; recording empty body");
                        String::new()
                    }
                };

                let record = ArticleRecord {
                    date: item.created_date_full.clone().unwrap_or_default(),
                    headline: item.title.clone(),
                    keyword: keyword.to_string(),
                    link,
                    tags: item.tags.clone().unwrap_or_default(),
                    abstract_text: item.teaser.clone().unwrap_or_default(),
                    article,
                };
                if store.append(&record)? {
                    appended += 1;
                    matches += 1;
                    info!(
                        keyword = %record.keyword,
                        headline = %truncate_for_log(&record.headline, 60),
                        "archived article"
                    );
                }

                if !self.config.article_delay.is_zero() {
                    sleep(self.config.article_delay).await;
                }
            }
            info!(offset, count = items.len(), matches, "page processed");

            if page_index + 1 < self.config.max_pages && !self.config.page_delay.is_zero() {
                sleep(self.config.page_delay).await;
            }
        }

        let duplicates_removed = store.dedup_file()?;
        info!(
            appended,
            pages = pages_fetched,
            total = store.len(),
            "scrape run complete"
        );

        Ok(RunReport {
            store_path: store.path().to_path_buf(),
            pages_fetched,
            appended,
            duplicates_removed,
        })
    }

    /// Page through the listing and collect every distinct tag observed,
    /// in first-appearance order. Used to curate the keyword set.
    #[instrument(level = "info", skip_all)]
    pub async fn collect_tags(&self, cancel: &CancellationToken) -> Result<Vec<String>, ScrapeError> {
        let mut seen = HashSet::new();
        let mut ordered = Vec::new();

        for page_index in 0..self.config.max_pages {
            if cancel.is_cancelled() {
                break;
            }
            let offset = page_index * self.config.page_size;
            let items = match self.source.fetch_page(offset, self.config.page_size).await {
                Ok(PageResult::Items(items)) => items,
                Ok(PageResult::EndOfData) => break,
                Err(e) => {
                    warn!(offset, error = %e, "listing fetch failed; ending tag collection");
                    break;
                }
            };

            for item in &items {
                let Some(raw) = item.tags.as_deref() else {
                    continue;
                };
                for tag in raw.split(',') {
                    let tag = tag.trim().to_lowercase();
                    if !tag.is_empty() && seen.insert(tag.clone()) {
                        ordered.push(tag);
                    }
                }
            }

            if page_index + 1 < self.config.max_pages && !self.config.page_delay.is_zero() {
                sleep(self.config.page_delay).await;
            }
        }

        info!(count = ordered.len(), "collected distinct tags");
        Ok(ordered)
    }
}

/// Run the pipeline against the production endpoints with default settings.
///
/// The caller-facing entry point: accepts an optional `[start, end]` date
/// pair (default: the 7 days ending today) and returns the archive path.
pub async fn run_scraper(
    window: Option<(NaiveDate, NaiveDate)>,
) -> Result<PathBuf, ScrapeError> {
    let window = match window {
        Some((start, end)) => DateWindow::new(start, end)?,
        None => DateWindow::last_days(7),
    };
    let scraper = Scraper::new(
        NewsApi::production()?,
        TagClassifier::default(),
        ScraperConfig::default(),
    );
    let report = scraper.run(&window, &CancellationToken::new()).await?;
    Ok(report.store_path)
}
