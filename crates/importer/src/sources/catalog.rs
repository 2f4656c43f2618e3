use chrono::NaiveDate;
use scraper::{Html, Selector};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::config::FetchConfig;
use crate::dates::extract_from_link;
use crate::spreadsheet::SpreadsheetFormat;
use crate::{ImporterError, Result};

/// One dated rating file linked from the archive index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub url: String,
    pub filename: String,
    pub rating_date: NaiveDate,
}

pub struct CatalogFetcher {
    index_url: Url,
    client: reqwest::Client,
    timeout: Duration,
}

impl CatalogFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            index_url: config.validate()?,
            client: config.http_client()?,
            timeout: config.catalog_timeout,
        })
    }

    /// Fetches the index page and lists its dated spreadsheet links. A page
    /// that cannot be retrieved is an error; individual bad links are not.
    pub async fn fetch_entries(&self) -> Result<Vec<CatalogEntry>> {
        info!("Fetching rating catalog from {}", self.index_url);

        let html = self
            .client
            .get(self.index_url.clone())
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let entries = parse_catalog(&html, &self.index_url)?;
        info!("Catalog lists {} dated rating file(s)", entries.len());
        Ok(entries)
    }
}

pub fn parse_catalog(html: &str, base_url: &Url) -> Result<Vec<CatalogEntry>> {
    let document = Html::parse_document(html);
    let links = Selector::parse("a[href]")
        .map_err(|e| ImporterError::CatalogError(format!("Invalid link selector: {:?}", e)))?;

    let mut entries = Vec::new();
    for link in document.select(&links) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let url = match base_url.join(href.trim()) {
            Ok(url) => url,
            Err(e) => {
                debug!("Ignoring unresolvable link '{}': {}", href, e);
                continue;
            }
        };
        if !matches!(url.scheme(), "http" | "https") {
            continue;
        }

        let Some(filename) = filename_from_url(&url) else {
            continue;
        };
        if SpreadsheetFormat::from_filename(&filename).is_none() {
            continue;
        }

        let text = link.text().collect::<String>();
        let Some(rating_date) = extract_from_link(&filename, text.trim()) else {
            debug!("No rating date in '{}' / '{}', dropping", filename, text.trim());
            continue;
        };

        entries.push(CatalogEntry {
            url: url.to_string(),
            filename,
            rating_date,
        });
    }

    Ok(entries)
}

/// Last path segment, percent-decoded, with separators neutralized so it
/// is always a plain file name.
pub fn filename_from_url(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.next_back()?;
    if segment.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    let filename = decoded.replace(['/', '\\'], "_");
    (!filename.trim().is_empty()).then_some(filename)
}
