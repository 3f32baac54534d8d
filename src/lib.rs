//! # Disaster Watch
//!
//! A fetch-filter-enrich-dedupe pipeline for disaster news. The scraper
//! pages through a news site's content API, classifies each listing item as
//! disaster-relevant by tag matching, filters by an inclusive date window,
//! fetches and normalizes full article bodies for matches, and appends
//! deduplicated rows to a durable CSV archive. Repeated runs over
//! overlapping windows never duplicate a link.
//!
//! ## Architecture
//!
//! The pipeline is a straight line through small components:
//! 1. **Page Fetcher** ([`api`]): one listing page per `limit`/`offset` request
//! 2. **Tag Classifier** ([`classifier`]): raw tag string → matched keyword
//! 3. **Date Window** ([`window`]): lenient timestamp filter
//! 4. **Article Fetcher** ([`api`]): detail endpoint → raw body markup
//! 5. **Text Normalizer** ([`normalize`]): markup → clean plain text
//! 6. **Dedup Store** ([`store`]): link-keyed append-only CSV archive
//! 7. **Orchestrator** ([`pipeline`]): drives the loop, decides termination

pub mod api;
pub mod classifier;
pub mod cli;
pub mod error;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod store;
pub mod utils;
pub mod window;

pub use api::{NewsApi, NewsSource, PageResult};
pub use classifier::TagClassifier;
pub use error::ScrapeError;
pub use models::{ArticleRecord, ArticleSummary};
pub use pipeline::{run_scraper, RunReport, Scraper, ScraperConfig};
pub use store::CsvStore;
pub use window::DateWindow;
