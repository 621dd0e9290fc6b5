// Unit tests for Opptrack

use opptrack::core::{
    compare::{award_field_mappings, compare_records},
    filters::{FilterSpec, LogicalField},
    predicate::to_query_pairs,
    reconcile::{reconcile, IdentityRule},
};
use opptrack::models::params::AwardParams;
use serde_json::json;

#[test]
fn test_filter_spec_renders_store_query_pairs() {
    let spec = FilterSpec::new()
        .equals("latest", "true")
        .include("naics", ["541511", "541512"])
        .exclude("type", ["a", "u"])
        .text_search("opportunity_text", "'ITAD' | 'media destruction'");

    let pairs = to_query_pairs(&spec.to_predicates());

    assert_eq!(pairs.len(), 5);
    assert_eq!(pairs[0], ("latest".to_string(), "eq.true".to_string()));
    assert_eq!(pairs[1], ("naics".to_string(), "in.(541511,541512)".to_string()));
    assert_eq!(pairs[2], ("type".to_string(), "neq.a".to_string()));
    assert_eq!(pairs[3], ("type".to_string(), "neq.u".to_string()));
    assert_eq!(
        pairs[4],
        (
            "opportunity_text".to_string(),
            "wfts(english).'ITAD' | 'media destruction'".to_string()
        )
    );
}

#[test]
fn test_aliased_field_renders_single_or_pair() {
    let uei = LogicalField::aliased(["recipient_uei", "parent_recipient_uei"]);
    let spec = FilterSpec::new().include(uei, ["SMNWM6HN79X5"]);

    let pairs = to_query_pairs(&spec.to_predicates());

    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].0, "or");
    assert_eq!(
        pairs[0].1,
        "(recipient_uei.in.(SMNWM6HN79X5),parent_recipient_uei.in.(SMNWM6HN79X5))"
    );
}

#[test]
fn test_extract_then_reconcile_end_to_end() {
    let store_records: Vec<opptrack::Record> = [
        json!({
            "solicitation_id": "12024B23Q7001",
            "notice_id": "n-1",
            "title": "Media destruction services",
            "history": [{"solicitationNumber": "12024B22Q6990"}]
        }),
        json!({"solicitation_id": "W912DY25R0004", "notice_id": "n-2", "title": "Paving"}),
    ]
    .iter()
    .map(|v| v.as_object().unwrap().clone())
    .collect();

    let api_records: Vec<opptrack::Record> = [
        // Matches the first store record through a prior-version number.
        json!({"source_id": "12024B22Q6990", "source_id_version": "12024B22Q6990-01"}),
        json!({"source_id": "FA8601UNRELATED"}),
    ]
    .iter()
    .map(|v| v.as_object().unwrap().clone())
    .collect();

    let store_ids = IdentityRule::store_results().extract_all(&store_records);
    let api_ids = IdentityRule::api_results().extract_all(&api_records);

    let report = reconcile(&api_ids, &store_ids);

    assert_eq!(report.left_total, 2);
    assert_eq!(report.right_total, 2);
    assert_eq!(report.unmatched_left.len(), 1);
    assert_eq!(report.unmatched_right.len(), 1);
    assert!(report.render("api", "store").contains("Total mismatches: 2"));
}

#[test]
fn test_award_comparison_uses_equivalent_spellings() {
    let api = json!({
        "award_id": "FA860125C0001 ",
        "type_of_contract_pricing_description": "Fixed Price",
        "total_dollars_obligated": "250000"
    });
    let store = json!({
        "piid": "FA860125C0001",
        "type_of_contract_pricing_description": "FIRM FIXED PRICE",
        "total_obligation": 250000.0
    });

    let report = compare_records(
        api.as_object().unwrap(),
        store.as_object().unwrap(),
        &award_field_mappings(),
    );

    let matched: Vec<&str> = report.matches.iter().map(|m| m.label.as_str()).collect();
    // Trimmed PIID matches; the pricing description matches through the
    // equivalent-spelling pair; a string amount never equals a number.
    assert!(matched.contains(&"Award ID/PIID"));
    assert!(matched.contains(&"Contract Pricing Type"));
    assert!(report
        .mismatches
        .iter()
        .any(|m| m.label == "Total Obligation"));
}

#[test]
fn test_award_params_serialize_only_set_fields() {
    let params = AwardParams {
        search_id: Some("K1A9pucCX7Dp9sRVLI1R4".to_string()),
        last_modified_date: Some("2025-03-01".to_string()),
        ..Default::default()
    };

    let query = serde_json::to_value(&params).unwrap();
    let object = query.as_object().unwrap();

    assert_eq!(object.len(), 2);
    assert_eq!(object["search_id"], "K1A9pucCX7Dp9sRVLI1R4");
    assert_eq!(object["last_modified_date"], "2025-03-01");
}
