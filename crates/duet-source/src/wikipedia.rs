//! MediaWiki query API adapter

use std::time::Duration;

use async_trait::async_trait;
use duet_config::SourceConfig;
use duet_core::SourceDocument;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::{
    ContentSource, DocumentQuery,
    clean::clean_extract,
    error::{Result, SourceError},
};

/// Wikipedia article source
pub struct WikipediaSource {
    client: Client,
    base_url: Option<Url>,
    min_words: usize,
    max_words: usize,
}

impl WikipediaSource {
    /// Create from source configuration
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Unavailable` if the HTTP client cannot be built
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SourceError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            min_words: config.min_words,
            max_words: config.max_words,
        })
    }

    /// API endpoint for the query's language edition
    fn api_url(&self, language: &str) -> String {
        self.base_url.as_ref().map_or_else(
            || format!("https://{language}.wikipedia.org/w/api.php"),
            |url| url.as_str().to_string(),
        )
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    query: Option<QueryBody>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    fullurl: Option<String>,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    #[serde(default)]
    invalidreason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    info: String,
}

#[async_trait]
impl ContentSource for WikipediaSource {
    async fn fetch(&self, query: &DocumentQuery) -> Result<SourceDocument> {
        let url = self.api_url(&query.language);

        tracing::debug!(title = %query.title, language = %query.language, "fetching article");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("action", "query"),
                ("prop", "extracts|info"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("inprop", "url"),
                ("format", "json"),
                ("formatversion", "2"),
                ("titles", query.title.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "content source request failed");
                SourceError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "content source returned error");
            return Err(SourceError::Unavailable(format!("source returned {status}: {body}")));
        }

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| SourceError::UnexpectedResponse(format!("failed to parse response: {e}")))?;

        if let Some(error) = body.error {
            return Err(SourceError::UnexpectedResponse(format!("{}: {}", error.code, error.info)));
        }

        let page = body
            .query
            .and_then(|q| q.pages.into_iter().next())
            .ok_or_else(|| SourceError::UnexpectedResponse("response carries no pages".to_string()))?;

        if page.invalid {
            return Err(SourceError::InvalidInput(
                page.invalidreason.unwrap_or_else(|| format!("invalid title '{}'", page.title)),
            ));
        }

        if page.missing {
            return Err(SourceError::NotFound { title: page.title });
        }

        let cleaned = clean_extract(page.extract.as_deref().unwrap_or_default(), self.max_words);

        if cleaned.word_count < self.min_words {
            return Err(SourceError::TooShort {
                title: page.title,
                words: cleaned.word_count,
                min: self.min_words,
            });
        }

        let url = page.fullurl.unwrap_or_else(|| query.canonical_url());

        tracing::info!(
            title = %page.title,
            words = cleaned.word_count,
            "article fetched"
        );

        Ok(SourceDocument::new(page.title, url, cleaned.text))
    }

    fn name(&self) -> &str {
        "wikipedia"
    }
}
