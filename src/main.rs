//! Binary entry point for the Disaster Watch scraper.
//!
//! Wires the CLI to the pipeline: initializes tracing, builds the scraper
//! from the parsed arguments, installs a Ctrl-C cancellation handler, and
//! runs either a scrape or a tag survey.

use chrono::{Duration as ChronoDuration, Local};
use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

use disaster_watch::cli::Cli;
use disaster_watch::{DateWindow, NewsApi, Scraper, ScraperConfig, TagClassifier};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("disaster_watch starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let today = Local::now().date_naive();
    let end = args.end_date.unwrap_or(today);
    let start = args.start_date.unwrap_or(end - ChronoDuration::days(6));
    let window = DateWindow::new(start, end)?;

    let api = NewsApi::new(args.listing_url.clone(), args.detail_url.clone())?;
    let config = ScraperConfig {
        output_path: args.output.clone(),
        page_size: args.page_size,
        max_pages: args.max_pages,
        page_delay: Duration::from_millis(args.page_delay_ms),
        article_delay: Duration::from_millis(args.article_delay_ms),
        site_base: args.site_base.clone(),
    };
    let scraper = Scraper::new(api, TagClassifier::default(), config);

    // Ctrl-C requests a cooperative stop between fetches.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received; finishing current item then stopping");
                cancel.cancel();
            }
        });
    }

    if args.list_tags {
        let tags = scraper.collect_tags(&cancel).await?;
        for tag in &tags {
            println!("{tag}");
        }
        info!(count = tags.len(), "tag survey complete");
        return Ok(());
    }

    let report = scraper.run(&window, &cancel).await?;

    let elapsed = start_time.elapsed();
    info!(
        path = %report.store_path.display(),
        appended = report.appended,
        pages = report.pages_fetched,
        duplicates_removed = report.duplicates_removed,
        secs = elapsed.as_secs(),
        "Execution complete"
    );
    println!("{}", report.store_path.display());

    Ok(())
}
