use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::core::filters::FilterSpec;
use crate::core::paginate::{fetch_all_pages, PageCursor, Termination};
use crate::core::predicate::{to_query_pairs, Predicate};
use crate::models::domain::Record;

/// Errors that can occur when querying the record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("store returned {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("invalid response format: {0}")]
    InvalidResponse(String),
}

/// Record store client
///
/// Talks to the hosted store's REST query interface: named-field selection
/// with embedded joins, structured predicates rendered to the store's
/// operator syntax at this boundary, and range-based pagination. No retry
/// policy; any non-success response aborts the caller's fetch.
pub struct StoreClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl StoreClient {
    pub fn new(base_url: String, api_key: String) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { base_url, api_key, client })
    }

    /// Select records from a table. `select` is the field list, optionally
    /// with embedded joins; `cursor`, when given, bounds the row range.
    pub async fn select(
        &self,
        table: &str,
        select: &str,
        predicates: &[Predicate],
        cursor: Option<PageCursor>,
    ) -> Result<Vec<Record>, StoreError> {
        let url = format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table);

        let mut query = vec![("select".to_string(), select.to_string())];
        query.extend(to_query_pairs(predicates));
        if let Some(cursor) = cursor {
            query.push(("offset".to_string(), cursor.offset.to_string()));
            query.push(("limit".to_string(), cursor.page_size.to_string()));
        }

        tracing::debug!("Querying {} with {} predicates", table, predicates.len());

        let response = self
            .client
            .get(&url)
            .query(&query)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(StoreError::Api { status, body });
        }

        let json: Value = response.json().await?;

        let rows = json
            .as_array()
            .ok_or_else(|| StoreError::InvalidResponse("Expected a JSON array of rows".into()))?;

        Ok(rows
            .iter()
            .filter_map(|row| row.as_object().cloned())
            .collect())
    }

    /// Select at most one record.
    pub async fn select_one(
        &self,
        table: &str,
        select: &str,
        predicates: &[Predicate],
    ) -> Result<Option<Record>, StoreError> {
        let rows = self
            .select(table, select, predicates, Some(PageCursor::new(1)))
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Paginate through every record matching the Filter Specification.
    ///
    /// Range-based pagination: the loop ends on the first empty page, so an
    /// exact-multiple result set costs one trailing empty round trip.
    pub async fn fetch_filtered(
        &self,
        table: &str,
        select: &str,
        spec: &FilterSpec,
        page_size: usize,
        max_pages: Option<usize>,
    ) -> Result<Vec<Record>, StoreError> {
        let predicates = spec.to_predicates();

        fetch_all_pages(page_size, max_pages, Termination::EmptyPage, |cursor| {
            tracing::debug!("Fetching {} rows from offset {}", cursor.page_size, cursor.offset);
            self.select(table, select, &predicates, Some(cursor))
        })
        .await
    }

    /// Resolve organization keys to their agency codes via the
    /// `organizations` table. Keys with no stored code drop out of the
    /// result; the caller decides what an empty resolution means.
    pub async fn resolve_organization_codes(
        &self,
        organization_keys: &[String],
    ) -> Result<Vec<String>, StoreError> {
        let predicates = vec![Predicate::is_in(
            "organization_key",
            organization_keys.to_vec(),
        )];
        let rows = self
            .select("organizations", "fpds_code", &predicates, None)
            .await?;

        let codes: Vec<String> = rows
            .iter()
            .filter_map(|row| row.get("fpds_code"))
            .filter_map(|v| v.as_str())
            .filter(|code| !code.is_empty())
            .map(str::to_string)
            .collect();

        tracing::debug!("Resolved {} organization keys to {} agency codes", organization_keys.len(), codes.len());

        Ok(codes)
    }

    /// Fetch a single award by its procurement instrument identifier.
    pub async fn award_by_piid(&self, piid: &str) -> Result<Option<Record>, StoreError> {
        self.select_one("awards", "*", &[Predicate::eq("piid", piid)])
            .await
    }

    /// Fetch the most recent notice for a solicitation, via the
    /// solicitation's latest-notice pointer.
    pub async fn notice_by_solicitation_id(
        &self,
        solicitation_id: &str,
    ) -> Result<Option<Record>, StoreError> {
        let solicitation = self
            .select_one(
                "solicitations",
                "latest_notice_id",
                &[
                    Predicate::eq("solicitation_id", solicitation_id),
                    Predicate::eq("deleted", "false"),
                ],
            )
            .await?;

        let Some(latest_notice_id) = solicitation
            .as_ref()
            .and_then(|row| row.get("latest_notice_id"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
        else {
            return Ok(None);
        };

        self.select_one("notices", "*", &[Predicate::eq("notice_id", latest_notice_id)])
            .await
    }

    /// Look up a NAICS id by its code.
    pub async fn naics_id_by_code(&self, naics_code: &str) -> Result<Option<i64>, StoreError> {
        let row = self
            .select_one("naics", "naics_id", &[Predicate::eq("naics_code", naics_code)])
            .await?;
        Ok(row.and_then(|r| r.get("naics_id").and_then(Value::as_i64)))
    }

    /// Look up a PSC id by its code.
    pub async fn psc_id_by_code(&self, psc_code: &str) -> Result<Option<i64>, StoreError> {
        let row = self
            .select_one("psc", "psc_id", &[Predicate::eq("psc_code", psc_code)])
            .await?;
        Ok(row.and_then(|r| r.get("psc_id").and_then(Value::as_i64)))
    }
}
