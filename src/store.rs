//! Durable, deduplicated CSV archive of enriched articles.
//!
//! A [`CsvStore`] is the one shared mutable resource of a run. It is backed
//! by a single CSV file with the header
//! `Date,Headline,Keyword,Link,Tags,Abstract,Article`; the `Link` column is
//! the dedup key. Opening the store rehydrates an in-memory link set by
//! scanning the file once, so repeated runs over overlapping date windows
//! never re-fetch or re-write an archived article.
//!
//! Appends are one record at a time and flush before the link is marked
//! seen, so within a single-threaded run the file and the set never
//! disagree. Concurrent runs against the same file are not supported; a
//! caller exposing the store to multiple runs must serialize access.

use crate::error::ScrapeError;
use crate::models::{ArticleRecord, CSV_HEADER, LINK_COLUMN};
use itertools::Itertools;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Append-only CSV archive keyed by article link.
#[derive(Debug)]
pub struct CsvStore {
    path: PathBuf,
    seen: HashSet<String>,
}

impl CsvStore {
    /// Open the archive at `path`, creating it with a header row if absent.
    ///
    /// Existing rows are scanned once to rehydrate the link set. Rows too
    /// short to carry a link column are skipped, not fatal.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ScrapeError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            let mut writer = csv::Writer::from_writer(File::create(&path)?);
            writer.write_record(CSV_HEADER)?;
            writer.flush()?;
            info!("created new archive");
            return Ok(Self {
                path,
                seen: HashSet::new(),
            });
        }

        let mut seen = HashSet::new();
        let mut skipped = 0usize;
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_path(&path)?;
        for row in reader.records() {
            let row = row?;
            match row.get(LINK_COLUMN) {
                Some(link) if !link.is_empty() => {
                    seen.insert(link.to_string());
                }
                _ => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!(skipped, "skipped malformed archive rows while loading");
        }
        info!(links = seen.len(), "loaded existing archive");
        Ok(Self { path, seen })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a link is already archived.
    pub fn contains(&self, link: &str) -> bool {
        self.seen.contains(link)
    }

    /// Number of archived links.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether the archive holds no records.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Append one record, unless its link is already archived.
    ///
    /// The row is written and flushed before the link is marked seen, so a
    /// crash mid-append can at worst leave a fully written row that the next
    /// `open` will recognize.
    ///
    /// # Returns
    ///
    /// `true` when the record was written, `false` when it was skipped as a
    /// duplicate.
    pub fn append(&mut self, record: &ArticleRecord) -> Result<bool, ScrapeError> {
        if self.seen.contains(&record.link) {
            debug!(link = %record.link, "skipping duplicate append");
            return Ok(false);
        }

        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(record.as_row())?;
        writer.flush()?;

        self.seen.insert(record.link.clone());
        Ok(true)
    }

    /// Terminal pass: drop any residual duplicate links, keep-first.
    ///
    /// The append path already prevents duplicates, so this normally finds
    /// nothing and leaves the file untouched. When an archive predates the
    /// dedup discipline (or was edited by hand), the file is rewritten
    /// wholesale with first occurrences kept.
    ///
    /// # Returns
    ///
    /// The number of duplicate rows removed.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub fn dedup_file(&mut self) -> Result<usize, ScrapeError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_path(&self.path)?;
        let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;

        let unique: Vec<&csv::StringRecord> = rows
            .iter()
            .unique_by(|row| row.get(LINK_COLUMN).unwrap_or_default().to_string())
            .collect();
        let removed = rows.len() - unique.len();
        if removed == 0 {
            debug!("no duplicate rows found");
            return Ok(0);
        }

        let tmp_path = self.path.with_extension("csv.tmp");
        {
            let mut writer = csv::Writer::from_writer(File::create(&tmp_path)?);
            writer.write_record(CSV_HEADER)?;
            for row in &unique {
                writer.write_record(row.iter())?;
            }
            writer.flush()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;

        self.seen = unique
            .iter()
            .filter_map(|row| row.get(LINK_COLUMN))
            .map(str::to_string)
            .collect();
        warn!(removed, "removed residual duplicate rows");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn sample_record(link: &str) -> ArticleRecord {
        ArticleRecord {
            date: "Jan 05 2025 08:15:00 AM".to_string(),
            headline: "Quake shakes province".to_string(),
            keyword: "earthquake".to_string(),
            link: link.to_string(),
            tags: "Earthquake, Nation".to_string(),
            abstract_text: "A strong quake was felt.".to_string(),
            article: "A strong quake was felt across the province.".to_string(),
        }
    }

    fn read_rows(path: &Path) -> Vec<csv::StringRecord> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_path(path)
            .unwrap();
        reader.records().collect::<Result<_, _>>().unwrap()
    }

    #[test]
    fn test_open_creates_file_with_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("archive.csv");
        let store = CsvStore::open(&path).unwrap();
        assert!(store.is_empty());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Date,Headline,Keyword,Link,Tags,Abstract,Article"));
    }

    #[test]
    fn test_append_then_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("archive.csv");

        let mut store = CsvStore::open(&path).unwrap();
        assert!(store.append(&sample_record("https://news.example.com/a")).unwrap());
        assert!(store.append(&sample_record("https://news.example.com/b")).unwrap());
        drop(store);

        let reloaded = CsvStore::open(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains("https://news.example.com/a"));
        assert!(reloaded.contains("https://news.example.com/b"));
        assert!(!reloaded.contains("https://news.example.com/c"));
    }

    #[test]
    fn test_double_append_writes_one_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("archive.csv");

        let mut store = CsvStore::open(&path).unwrap();
        let record = sample_record("https://news.example.com/a");
        assert!(store.append(&record).unwrap());
        assert!(!store.append(&record).unwrap());

        assert_eq!(read_rows(&path).len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_load_skips_short_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("archive.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "Date,Headline,Keyword,Link,Tags,Abstract,Article").unwrap();
        writeln!(file, "Jan 05 2025,Quake,earthquake,https://news.example.com/a,tags,abs,body").unwrap();
        writeln!(file, "short,row").unwrap();
        drop(file);

        let store = CsvStore::open(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.contains("https://news.example.com/a"));
    }

    #[test]
    fn test_fields_with_commas_and_newlines_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("archive.csv");

        let mut record = sample_record("https://news.example.com/a");
        record.article = "Line one, with comma.\nLine two.".to_string();
        record.headline = "Floods hit Cavite, Laguna".to_string();

        let mut store = CsvStore::open(&path).unwrap();
        store.append(&record).unwrap();
        drop(store);

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(1).unwrap(), "Floods hit Cavite, Laguna");
        assert_eq!(rows[0].get(6).unwrap(), "Line one, with comma.\nLine two.");

        let reloaded = CsvStore::open(&path).unwrap();
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn test_dedup_file_keeps_first() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("archive.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "Date,Headline,Keyword,Link,Tags,Abstract,Article").unwrap();
        writeln!(file, "d1,First copy,kw,https://news.example.com/a,t,ab,body1").unwrap();
        writeln!(file, "d2,Other,kw,https://news.example.com/b,t,ab,body2").unwrap();
        writeln!(file, "d3,Second copy,kw,https://news.example.com/a,t,ab,body3").unwrap();
        drop(file);

        let mut store = CsvStore::open(&path).unwrap();
        let removed = store.dedup_file().unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 2);

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(1).unwrap(), "First copy");
    }

    #[test]
    fn test_dedup_file_noop_when_clean() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("archive.csv");

        let mut store = CsvStore::open(&path).unwrap();
        store.append(&sample_record("https://news.example.com/a")).unwrap();
        store.append(&sample_record("https://news.example.com/b")).unwrap();

        assert_eq!(store.dedup_file().unwrap(), 0);
        assert_eq!(read_rows(&path).len(), 2);
    }
}
