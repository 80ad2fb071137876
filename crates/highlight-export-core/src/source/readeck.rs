//! Readeck HTTP source
//!
//! Blocking client over the Readeck REST API:
//! - `GET {base}/api/bookmarks/annotations?limit=&offset=` pages through highlights
//! - `GET {base}/api/bookmarks/{id}` resolves a bookmark

use std::time::Duration;

use serde::de::DeserializeOwned;

use super::{Bookmark, Highlight, HighlightSource};
use crate::error::{ExportError, Result};

/// Smallest page size the client will request
pub const MIN_PAGE_SIZE: usize = 10;

/// Largest page size the client will request
pub const MAX_PAGE_SIZE: usize = 100;

/// Connection settings for a Readeck instance
#[derive(Debug, Clone)]
pub struct ReadeckSettings {
    pub base_url: String,
    pub token: String,
    pub page_size: usize,
    pub timeout: Duration,
}

/// HTTP client for a Readeck instance
pub struct ReadeckClient {
    agent: ureq::Agent,
    base_url: String,
    token: String,
    page_size: usize,
}

impl ReadeckClient {
    pub fn new(settings: ReadeckSettings) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(settings.timeout))
            .build();

        ReadeckClient {
            agent: config.into(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: settings.token,
            page_size: settings.page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE),
        }
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<(T, Option<usize>)> {
        let mut request = self
            .agent
            .get(url)
            .header("accept", "application/json")
            .header("Authorization", format!("Bearer {}", self.token));
        for (key, value) in query {
            request = request.query(*key, value);
        }

        let mut response = request.call().map_err(|e| source_error(url, e))?;

        let total_pages = response
            .headers()
            .get("total-pages")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_total_pages);

        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| source_error(url, e))?;
        let value = serde_json::from_str(&body).map_err(|e| ExportError::Source {
            url: url.to_string(),
            reason: format!("unexpected response body: {}", e),
        })?;

        Ok((value, total_pages))
    }
}

impl HighlightSource for ReadeckClient {
    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    fn fetch_highlights(&self) -> Result<Vec<Highlight>> {
        let url = format!("{}/api/bookmarks/annotations", self.base_url);
        let mut highlights = Vec::new();
        let mut total_pages = 1;
        let mut page = 0;

        while page < total_pages {
            let offset = page * self.page_size;
            tracing::debug!(page = page + 1, offset, "requesting highlights page");

            let query = [
                ("limit", self.page_size.to_string()),
                ("offset", offset.to_string()),
            ];
            let (batch, pages): (Vec<Highlight>, _) = self.get_json(&url, &query)?;

            total_pages = pages.ok_or_else(|| ExportError::Source {
                url: url.clone(),
                reason: "missing total-pages header".to_string(),
            })?;
            highlights.extend(batch);
            page += 1;
        }

        // The API lists newest first
        highlights.reverse();
        Ok(highlights)
    }

    fn fetch_bookmark(&self, id: &str) -> Result<Bookmark> {
        let url = format!("{}/api/bookmarks/{}", self.base_url, id);
        let (bookmark, _) = self
            .get_json::<Bookmark>(&url, &[])
            .map_err(|e| ExportError::BookmarkUnresolved {
                id: id.to_string(),
                reason: e.to_string(),
            })?;
        Ok(bookmark)
    }
}

fn parse_total_pages(value: &str) -> Option<usize> {
    value.trim().parse().ok()
}

fn source_error(url: &str, err: ureq::Error) -> ExportError {
    let reason = match err {
        ureq::Error::StatusCode(code) => format!("non-success status code: {}", code),
        other => other.to_string(),
    };
    ExportError::Source {
        url: url.to_string(),
        reason,
    }
}
