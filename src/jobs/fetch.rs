//! Fetch orchestration: turn configured criteria into Filter Specifications
//! and drain each source.

use anyhow::{Context, Result};
use chrono::Utc;

use crate::config::{AwardFilterSettings, FetchSettings, NoticeFilterSettings};
use crate::core::filters::{FilterSpec, LogicalField};
use crate::models::domain::Record;
use crate::models::params::{AwardParams, OpportunityParams};
use crate::services::contracts_api::ContractsApiClient;
use crate::services::store::StoreClient;

/// Notice rows carry foreign keys only; the embedded joins pull the related
/// reference rows (codes, set-asides, addresses, the organization hierarchy)
/// into each record.
const NOTICE_SELECT: &str = "*,\
naics_details:naics!naics_id(*),\
psc_details:psc!psc_id(*),\
setasides_details:setasides!set_aside_id(*),\
solicitations_details:solicitations!solicitation_id(*),\
addresses_details:addresses!organization_address_key(*),\
organization_details:organizations!Notices_organization_key_fkey(*),\
organization_level_1_details:organizations!Notices_organization_level_1_key_fkey(*),\
organization_level_2_details:organizations!Notices_organization_level_2_key_fkey(*),\
organization_level_3_details:organizations!Notices_organization_level_3_key_fkey(*),\
organization_level_4_details:organizations!Notices_organization_level_4_key_fkey(*),\
organization_level_5_details:organizations!Notices_organization_level_5_key_fkey(*),\
organization_level_6_details:organizations!Notices_organization_level_6_key_fkey(*),\
organization_level_7_details:organizations!Notices_organization_level_7_key_fkey(*),\
solicitation_type_details:solicitation_types!type(*)";

const ORGANIZATION_KEY_COLUMNS: [&str; 8] = [
    "organization_key",
    "organization_level_1_key",
    "organization_level_2_key",
    "organization_level_3_key",
    "organization_level_4_key",
    "organization_level_5_key",
    "organization_level_6_key",
    "organization_level_7_key",
];

/// Build the notice Filter Specification from configured criteria.
pub fn notice_filter_spec(settings: &NoticeFilterSettings) -> FilterSpec {
    let mut spec = FilterSpec::new();

    if settings.active {
        // Active means: the latest version of its solicitation, with a
        // response deadline still in the future.
        spec = spec
            .equals("latest", "true")
            .after("solicitation_response_deadline", Utc::now().to_rfc3339());
    }

    spec = spec
        .include("naics", &settings.include_naics)
        .exclude("naics", &settings.exclude_naics)
        .include("type", &settings.include_solicitation_types)
        .exclude("type", &settings.exclude_solicitation_types)
        .include("psc", &settings.include_psc)
        .exclude("psc", &settings.exclude_psc)
        .include("set_aside_id", &settings.include_set_aside_ids)
        .exclude("set_aside_id", &settings.exclude_set_aside_ids)
        .include(
            LogicalField::aliased(ORGANIZATION_KEY_COLUMNS),
            &settings.include_organization_keys,
        )
        .exclude("organization_key", &settings.exclude_organization_keys);

    if let Some(query) = &settings.keyword_query {
        spec = spec.text_search("opportunity_text", query.clone());
    }

    spec
}

/// Build the award Filter Specification. Organization keys do not appear on
/// award rows, so the caller resolves them to agency codes first and passes
/// the results in; an empty resolution drops that criterion.
pub fn award_filter_spec(
    settings: &AwardFilterSettings,
    include_agency_codes: &[String],
    exclude_agency_codes: &[String],
) -> FilterSpec {
    let uei = LogicalField::aliased(["recipient_uei", "parent_recipient_uei"]);

    let mut spec = FilterSpec::new()
        .include(uei.clone(), &settings.include_recipient_uei)
        .exclude(uei, &settings.exclude_recipient_uei)
        .include("naics", &settings.include_naics)
        .exclude("naics", &settings.exclude_naics)
        .include("product_or_service_code", &settings.include_psc)
        .exclude("product_or_service_code", &settings.exclude_psc)
        .include("type_set_aside", &settings.include_set_aside)
        .exclude("type_set_aside", &settings.exclude_set_aside)
        .include("funding_agency_subtier_agency_code", include_agency_codes)
        .exclude("funding_agency_subtier_agency_code", exclude_agency_codes)
        .include("extent_competed_description", &settings.include_extent_competed)
        .exclude("extent_competed_description", &settings.exclude_extent_competed);

    if let Some(start) = &settings.potential_end_date_start {
        spec = spec.at_least("period_of_performance_potential_end_date", start);
    }
    if let Some(end) = &settings.potential_end_date_end {
        spec = spec.at_most("period_of_performance_potential_end_date", end);
    }
    if let Some(min) = settings.amount_obligated_minimum {
        spec = spec.at_least("total_obligation", min);
    }
    if let Some(max) = settings.amount_obligated_maximum {
        spec = spec.at_most("total_obligation", max);
    }
    if let Some(query) = &settings.keyword_query {
        spec = spec.text_search("description", query.clone());
    }

    spec
}

/// Fetch every notice matching the configured criteria, with reference
/// details joined in.
pub async fn fetch_notices(
    store: &StoreClient,
    settings: &NoticeFilterSettings,
    fetch: &FetchSettings,
) -> Result<Vec<Record>> {
    let spec = notice_filter_spec(settings);

    let notices = store
        .fetch_filtered(
            "notices",
            NOTICE_SELECT,
            &spec,
            fetch.page_size,
            fetch.max_pages,
        )
        .await
        .context("Failed to fetch notices")?;

    tracing::info!("Fetched {} notices", notices.len());

    Ok(notices)
}

/// Fetch every award matching the configured criteria. Organization-key
/// criteria are resolved to agency codes up front; keys that resolve to
/// nothing contribute no constraint.
pub async fn fetch_awards(
    store: &StoreClient,
    settings: &AwardFilterSettings,
    fetch: &FetchSettings,
) -> Result<Vec<Record>> {
    let include_codes = if settings.include_organization_keys.is_empty() {
        Vec::new()
    } else {
        store
            .resolve_organization_codes(&settings.include_organization_keys)
            .await
            .context("Failed to resolve included organization keys")?
    };
    let exclude_codes = if settings.exclude_organization_keys.is_empty() {
        Vec::new()
    } else {
        store
            .resolve_organization_codes(&settings.exclude_organization_keys)
            .await
            .context("Failed to resolve excluded organization keys")?
    };

    let spec = award_filter_spec(settings, &include_codes, &exclude_codes);

    let awards = store
        .fetch_filtered("awards", "*", &spec, fetch.page_size, fetch.max_pages)
        .await
        .context("Failed to fetch awards")?;

    tracing::info!("Fetched {} awards", awards.len());

    Ok(awards)
}

/// Fetch award contracts from the third-party API.
pub async fn fetch_api_awards(
    api: &ContractsApiClient,
    params: &AwardParams,
    fetch: &FetchSettings,
) -> Result<Vec<Record>> {
    let awards = api
        .fetch_awards(params, fetch.page_size.min(100), fetch.max_pages)
        .await
        .context("Failed to fetch contracts from the API")?;

    tracing::info!("Fetched {} contracts from the API", awards.len());

    Ok(awards)
}

/// Fetch opportunities from the third-party API.
pub async fn fetch_api_opportunities(
    api: &ContractsApiClient,
    params: &OpportunityParams,
    fetch: &FetchSettings,
) -> Result<Vec<Record>> {
    let opportunities = api
        .fetch_opportunities(params, fetch.page_size.min(100), fetch.max_pages)
        .await
        .context("Failed to fetch opportunities from the API")?;

    tracing::info!("Fetched {} opportunities from the API", opportunities.len());

    Ok(opportunities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::predicate::Predicate;

    #[test]
    fn test_default_notice_settings_build_an_empty_spec() {
        let spec = notice_filter_spec(&NoticeFilterSettings::default());
        assert!(spec.is_empty());
    }

    #[test]
    fn test_active_notices_constrain_latest_and_deadline() {
        let settings = NoticeFilterSettings {
            active: true,
            ..Default::default()
        };
        let preds = notice_filter_spec(&settings).to_predicates();

        assert_eq!(preds.len(), 2);
        assert_eq!(preds[0], Predicate::eq("latest", "true"));
        assert!(matches!(&preds[1], Predicate::Gt { column, .. }
            if column == "solicitation_response_deadline"));
    }

    #[test]
    fn test_organization_include_spans_hierarchy_columns() {
        let settings = NoticeFilterSettings {
            include_organization_keys: vec!["100006688".to_string()],
            ..Default::default()
        };
        let preds = notice_filter_spec(&settings).to_predicates();

        assert_eq!(preds.len(), 1);
        match &preds[0] {
            Predicate::Or(clauses) => assert_eq!(clauses.len(), 8),
            other => panic!("expected Or group, got {:?}", other),
        }
    }

    #[test]
    fn test_organization_exclude_targets_direct_key_only() {
        let settings = NoticeFilterSettings {
            exclude_organization_keys: vec!["100006688".to_string()],
            ..Default::default()
        };
        let preds = notice_filter_spec(&settings).to_predicates();

        assert_eq!(preds, vec![Predicate::neq("organization_key", "100006688")]);
    }

    #[test]
    fn test_award_spec_ranges_and_amounts() {
        let settings = AwardFilterSettings {
            potential_end_date_start: Some("2025-01-01".to_string()),
            potential_end_date_end: Some("2026-07-01".to_string()),
            amount_obligated_minimum: Some(250000.0),
            ..Default::default()
        };
        let preds = award_filter_spec(&settings, &[], &[]).to_predicates();

        assert_eq!(preds.len(), 3);
        assert_eq!(
            preds[0],
            Predicate::gte("period_of_performance_potential_end_date", "2025-01-01")
        );
        assert_eq!(
            preds[1],
            Predicate::lte("period_of_performance_potential_end_date", "2026-07-01")
        );
        assert_eq!(preds[2], Predicate::gte("total_obligation", "250000"));
    }

    #[test]
    fn test_award_uei_exclude_negates_both_columns() {
        let settings = AwardFilterSettings {
            exclude_recipient_uei: vec!["SMNWM6HN79X5".to_string()],
            ..Default::default()
        };
        let preds = award_filter_spec(&settings, &[], &[]).to_predicates();

        assert_eq!(preds.len(), 2);
        assert_eq!(preds[0], Predicate::neq("recipient_uei", "SMNWM6HN79X5"));
        assert_eq!(preds[1], Predicate::neq("parent_recipient_uei", "SMNWM6HN79X5"));
    }

    #[test]
    fn test_unresolved_organization_codes_drop_the_criterion() {
        let settings = AwardFilterSettings {
            include_organization_keys: vec!["42".to_string()],
            ..Default::default()
        };
        // Resolution found nothing: the spec carries no agency constraint.
        let spec = award_filter_spec(&settings, &[], &[]);
        assert!(spec.is_empty());
    }
}
