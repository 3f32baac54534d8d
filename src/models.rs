//! Data models for listing items and archived article records.
//!
//! This module defines the core data structures used throughout the pipeline:
//! - [`ListingPage`]: One page of the upstream listing API's JSON response
//! - [`ArticleSummary`]: A single listing item, ephemeral per page fetch
//! - [`ArticleDetail`]: The detail endpoint's JSON envelope around raw markup
//! - [`ArticleRecord`]: A fully enriched row as persisted in the CSV archive
//!
//! The listing API uses camelCase keys (`createdDateFull`) alongside
//! snake_case ones (`slugline_url`), so fields carry explicit serde renames
//! rather than a container-level rename rule.

use serde::Deserialize;

/// One page of results from the listing endpoint.
///
/// The upstream exposes the item array under the fixed key `listItem`.
/// A missing or empty array is the end-of-data signal.
#[derive(Debug, Default, Deserialize)]
pub struct ListingPage {
    /// The article summaries on this page, in upstream order.
    #[serde(rename = "listItem", default)]
    pub list_item: Vec<ArticleSummary>,
}

/// A single article summary from the listing endpoint.
///
/// Exists only in memory for the duration of one page's processing. Every
/// field except the title is optional upstream, so everything is lenient:
/// missing keys deserialize to `None` rather than failing the page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleSummary {
    /// Comma-separated free-text tag string, e.g. `"Typhoon, Nation, Weather"`.
    #[serde(default)]
    pub tags: Option<String>,

    /// Creation timestamp in the upstream's locale format,
    /// e.g. `"Jan 05 2025 08:15:00 AM"`.
    #[serde(rename = "createdDateFull", default)]
    pub created_date_full: Option<String>,

    /// The article headline.
    #[serde(default)]
    pub title: String,

    /// Relative path used to build the canonical article URL.
    #[serde(rename = "slugline_url", default)]
    pub slugline_url: Option<String>,

    /// Short abstract of the article, when the upstream provides one.
    #[serde(default, alias = "abstract")]
    pub teaser: Option<String>,
}

/// JSON envelope returned by the article detail endpoint.
///
/// The raw body markup sits under the fixed key path `data.articleBody`.
#[derive(Debug, Default, Deserialize)]
pub struct ArticleDetail {
    #[serde(default)]
    pub data: Option<ArticleDetailData>,
}

/// Inner payload of [`ArticleDetail`].
#[derive(Debug, Default, Deserialize)]
pub struct ArticleDetailData {
    /// Raw HTML markup of the article body.
    #[serde(rename = "articleBody", default)]
    pub article_body: Option<String>,
}

impl ArticleDetail {
    /// Extract the raw body markup, or an empty string when absent.
    pub fn into_body(self) -> String {
        self.data.and_then(|d| d.article_body).unwrap_or_default()
    }
}

/// A fully enriched article as persisted in the CSV archive.
///
/// `link` is the dedup key: globally unique across the archive, enforced by
/// the store before any write. Records are never mutated after append and
/// never deleted by this pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    /// Creation timestamp in its original string form, not reparsed.
    pub date: String,
    /// The article headline.
    pub headline: String,
    /// The classifier keyword that matched this article's tags.
    pub keyword: String,
    /// Canonical absolute article URL. The sole uniqueness field.
    pub link: String,
    /// The raw tag string as received from the listing endpoint.
    pub tags: String,
    /// Short abstract of the article, possibly empty.
    pub abstract_text: String,
    /// Cleaned plain-text article body. Empty when the detail fetch failed.
    pub article: String,
}

/// Header row of the CSV archive. The `Link` column (index 3) is the dedup key.
pub const CSV_HEADER: [&str; 7] = [
    "Date", "Headline", "Keyword", "Link", "Tags", "Abstract", "Article",
];

/// Zero-based index of the `Link` column in the CSV schema.
pub const LINK_COLUMN: usize = 3;

impl ArticleRecord {
    /// The record's fields in CSV column order.
    pub fn as_row(&self) -> [&str; 7] {
        [
            &self.date,
            &self.headline,
            &self.keyword,
            &self.link,
            &self.tags,
            &self.abstract_text,
            &self.article,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_page_deserialization() {
        let json = r#"{
            "listItem": [
                {
                    "title": "Quake shakes province",
                    "tags": "Earthquake, Nation",
                    "createdDateFull": "Jan 05 2025 08:15:00 AM",
                    "slugline_url": "news/nation/quake-shakes-province",
                    "teaser": "A strong quake was felt."
                }
            ]
        }"#;

        let page: ListingPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.list_item.len(), 1);
        let item = &page.list_item[0];
        assert_eq!(item.title, "Quake shakes province");
        assert_eq!(item.tags.as_deref(), Some("Earthquake, Nation"));
        assert_eq!(
            item.slugline_url.as_deref(),
            Some("news/nation/quake-shakes-province")
        );
    }

    #[test]
    fn test_listing_page_missing_items_key() {
        let page: ListingPage = serde_json::from_str("{}").unwrap();
        assert!(page.list_item.is_empty());
    }

    #[test]
    fn test_summary_tolerates_missing_fields() {
        let json = r#"{"title": "Bare item"}"#;
        let item: ArticleSummary = serde_json::from_str(json).unwrap();
        assert_eq!(item.title, "Bare item");
        assert!(item.tags.is_none());
        assert!(item.created_date_full.is_none());
        assert!(item.slugline_url.is_none());
        assert!(item.teaser.is_none());
    }

    #[test]
    fn test_summary_accepts_abstract_alias() {
        let json = r#"{"title": "Aliased", "abstract": "Short text"}"#;
        let item: ArticleSummary = serde_json::from_str(json).unwrap();
        assert_eq!(item.teaser.as_deref(), Some("Short text"));
    }

    #[test]
    fn test_detail_body_extraction() {
        let json = r#"{"data": {"articleBody": "<p>Hello</p>"}}"#;
        let detail: ArticleDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.into_body(), "<p>Hello</p>");
    }

    #[test]
    fn test_detail_missing_body_is_empty() {
        let detail: ArticleDetail = serde_json::from_str("{}").unwrap();
        assert_eq!(detail.into_body(), "");
    }

    #[test]
    fn test_record_row_order_matches_header() {
        let record = ArticleRecord {
            date: "Jan 05 2025 08:15:00 AM".to_string(),
            headline: "Quake shakes province".to_string(),
            keyword: "earthquake".to_string(),
            link: "https://news.example.com/news/nation/quake".to_string(),
            tags: "Earthquake, Nation".to_string(),
            abstract_text: "A strong quake was felt.".to_string(),
            article: "A strong quake was felt across the province.".to_string(),
        };

        let row = record.as_row();
        assert_eq!(row.len(), CSV_HEADER.len());
        assert_eq!(row[LINK_COLUMN], record.link);
    }
}
