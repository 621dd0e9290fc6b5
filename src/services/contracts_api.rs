use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::paginate::{fetch_all_pages, PageCursor, Termination};
use crate::models::domain::Record;
use crate::models::params::{AwardParams, OpportunityParams};

/// Hard cap imposed by the API; larger values are rejected server-side.
pub const MAX_PAGE_SIZE: usize = 100;

const CONTRACT_ENDPOINT: &str = "/api-external/contract/";
const OPPORTUNITY_ENDPOINT: &str = "/api-external/opportunity/";

/// Errors that can occur when querying the contracts API
#[derive(Debug, Error)]
pub enum ContractsApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("contracts API returned {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("invalid response format: {0}")]
    InvalidResponse(String),

    #[error("invalid request parameters: {0}")]
    InvalidParams(String),
}

/// One page of the API's envelope: a results array plus HATEOAS-style
/// links. The `next` link is informational only; termination is decided
/// by page length.
#[derive(Debug, Clone, Deserialize)]
struct ApiPage {
    #[serde(default)]
    results: Vec<Record>,
    #[serde(default)]
    links: Option<PageLinks>,
}

#[derive(Debug, Clone, Deserialize)]
struct PageLinks {
    next: Option<String>,
}

/// Third-party contracts API client
///
/// Key authentication and page-number pagination. A page shorter than the
/// requested size is the last one, so exhaustive fetches skip the trailing
/// empty round trip the record store needs.
pub struct ContractsApiClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl ContractsApiClient {
    pub fn new(base_url: String, api_key: String) -> Result<Self, ContractsApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { base_url, api_key, client })
    }

    /// Fetch every award contract matching the given parameters.
    pub async fn fetch_awards(
        &self,
        params: &AwardParams,
        page_size: usize,
        max_pages: Option<usize>,
    ) -> Result<Vec<Record>, ContractsApiError> {
        self.fetch_paginated(CONTRACT_ENDPOINT, params, page_size, max_pages)
            .await
    }

    /// Fetch every opportunity matching the given parameters.
    pub async fn fetch_opportunities(
        &self,
        params: &OpportunityParams,
        page_size: usize,
        max_pages: Option<usize>,
    ) -> Result<Vec<Record>, ContractsApiError> {
        self.fetch_paginated(OPPORTUNITY_ENDPOINT, params, page_size, max_pages)
            .await
    }

    async fn fetch_paginated<P: Serialize>(
        &self,
        endpoint: &str,
        params: &P,
        page_size: usize,
        max_pages: Option<usize>,
    ) -> Result<Vec<Record>, ContractsApiError> {
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ContractsApiError::InvalidParams(format!(
                "page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, page_size
            )));
        }
        if self.api_key.is_empty() {
            return Err(ContractsApiError::InvalidParams(
                "API key is required".to_string(),
            ));
        }

        fetch_all_pages(page_size, max_pages, Termination::ShortPage, |cursor| {
            self.fetch_page(endpoint, params, cursor)
        })
        .await
    }

    async fn fetch_page<P: Serialize>(
        &self,
        endpoint: &str,
        params: &P,
        cursor: PageCursor,
    ) -> Result<Vec<Record>, ContractsApiError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), endpoint);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .query(&[
                ("page_number", cursor.page_number().to_string()),
                ("page_size", cursor.page_size.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(ContractsApiError::Api { status, body });
        }

        let page: ApiPage = response
            .json()
            .await
            .map_err(|e| ContractsApiError::InvalidResponse(e.to_string()))?;

        tracing::debug!(
            "Page {} returned {} results (next link: {})",
            cursor.page_number(),
            page.results.len(),
            page.links.as_ref().and_then(|l| l.next.as_deref()).unwrap_or("none")
        );

        Ok(page.results)
    }
}
