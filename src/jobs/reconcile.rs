//! Reconciliation and single-award comparison flows.

use std::path::Path;

use anyhow::{Context, Result};

use crate::core::compare::{award_field_mappings, compare_records, ComparisonReport};
use crate::core::reconcile::{reconcile, IdentityRule, MismatchReport};
use crate::models::params::AwardParams;
use crate::services::contracts_api::ContractsApiClient;
use crate::services::store::StoreClient;
use crate::snapshot::{load_json_records, load_snapshot_identities};

/// Reconcile a snapshot file against a fetched-results dump.
///
/// The snapshot side may be a spreadsheet export or an earlier JSON dump;
/// the results side is always a JSON dump of store records. Each side is
/// reduced to Identity Sets, then records are matched by set intersection.
pub fn reconcile_snapshots(snapshot_path: &Path, results_path: &Path) -> Result<MismatchReport> {
    let snapshot = load_snapshot_identities(snapshot_path, &IdentityRule::api_results())
        .with_context(|| format!("Failed to load snapshot {}", snapshot_path.display()))?;

    let results = load_json_records(results_path)
        .with_context(|| format!("Failed to load results {}", results_path.display()))?;
    let results = IdentityRule::store_results().extract_all(&results);

    let report = reconcile(&snapshot, &results);

    tracing::info!(
        "Reconciled {} snapshot records against {} results: {} mismatches",
        report.left_total,
        report.right_total,
        report.total_mismatches()
    );

    Ok(report)
}

/// Fetch the same award from both sources and compare it field by field.
///
/// `award_id` addresses the contracts API; `piid` addresses the store's
/// awards table. Either side missing is an error, not an empty report.
pub async fn compare_award(
    api: &ContractsApiClient,
    store: &StoreClient,
    award_id: &str,
    piid: &str,
) -> Result<ComparisonReport> {
    let params = AwardParams {
        award_id: Some(award_id.to_string()),
        ..Default::default()
    };
    let api_award = api
        .fetch_awards(&params, 1, Some(1))
        .await
        .context("Failed to fetch the award from the API")?
        .into_iter()
        .next()
        .with_context(|| format!("No API award found for award_id {}", award_id))?;

    let store_award = store
        .award_by_piid(piid)
        .await
        .context("Failed to fetch the award from the store")?
        .with_context(|| format!("No stored award found for piid {}", piid))?;

    Ok(compare_records(&api_award, &store_award, &award_field_mappings()))
}
