//! Command-line interface definitions for Disaster Watch.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Endpoint URLs can also be provided via environment variables, which is
//! handy for pointing the scraper at a stub server.

use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the Disaster Watch scraper.
///
/// # Examples
///
/// ```sh
/// # Scrape the default window (the 7 days ending today)
/// disaster_watch
///
/// # Explicit window and output path
/// disaster_watch -o data/disaster.csv --start-date 2025-01-01 --end-date 2025-01-07
///
/// # Survey the feed's tags instead of scraping
/// disaster_watch --list-tags
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path of the CSV archive
    #[arg(short, long, default_value = "disaster_articles.csv")]
    pub output: PathBuf,

    /// Start of the inclusive date window (YYYY-MM-DD); defaults to 6 days ago
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// End of the inclusive date window (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// Articles requested per listing page
    #[arg(long, default_value_t = 100)]
    pub page_size: usize,

    /// Maximum listing pages fetched per run
    #[arg(long, default_value_t = 5)]
    pub max_pages: usize,

    /// Pause between listing page fetches, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub page_delay_ms: u64,

    /// Pause between article fetches within a page, in milliseconds
    #[arg(long, default_value_t = 250)]
    pub article_delay_ms: u64,

    /// Listing endpoint URL
    #[arg(long, env = "DISASTER_WATCH_LISTING_URL", default_value = crate::api::DEFAULT_LISTING_URL)]
    pub listing_url: String,

    /// Detail endpoint URL
    #[arg(long, env = "DISASTER_WATCH_DETAIL_URL", default_value = crate::api::DEFAULT_DETAIL_URL)]
    pub detail_url: String,

    /// Base site URL for canonical article links
    #[arg(long, env = "DISASTER_WATCH_SITE_BASE", default_value = crate::api::DEFAULT_SITE_BASE)]
    pub site_base: String,

    /// Print the distinct tags observed on the listing feed and exit
    #[arg(long)]
    pub list_tags: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["disaster_watch"]);
        assert_eq!(cli.output, PathBuf::from("disaster_articles.csv"));
        assert_eq!(cli.page_size, 100);
        assert_eq!(cli.max_pages, 5);
        assert!(cli.start_date.is_none());
        assert!(!cli.list_tags);
    }

    #[test]
    fn test_cli_date_window() {
        let cli = Cli::parse_from([
            "disaster_watch",
            "--start-date",
            "2025-01-01",
            "--end-date",
            "2025-01-07",
        ]);
        assert_eq!(
            cli.start_date,
            Some(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
        );
        assert_eq!(
            cli.end_date,
            Some(NaiveDate::from_ymd_opt(2025, 1, 7).unwrap())
        );
    }

    #[test]
    fn test_cli_short_output_flag() {
        let cli = Cli::parse_from(["disaster_watch", "-o", "/tmp/out.csv"]);
        assert_eq!(cli.output, PathBuf::from("/tmp/out.csv"));
    }

    #[test]
    fn test_cli_list_tags_mode() {
        let cli = Cli::parse_from(["disaster_watch", "--list-tags", "--max-pages", "10"]);
        assert!(cli.list_tags);
        assert_eq!(cli.max_pages, 10);
    }
}
