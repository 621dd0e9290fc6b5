//! Field-by-field comparison of one record from each source.
//!
//! Used to spot-check that a record held in the store agrees with what the
//! contracts API currently reports for the same award or opportunity. Field
//! mappings pair a dot-path on each side; values are standardized before
//! comparison and a missing field compares as absent rather than erroring.

use std::collections::HashSet;

use serde_json::Value;

use crate::models::domain::{nested_value, Record};

/// Pairs a field path on the API side with its counterpart on the store
/// side. `equivalents` lists value pairs that count as a match even though
/// the raw strings differ (the two sources spell some enumerations
/// differently, e.g. "Fixed Price" vs "FIRM FIXED PRICE").
#[derive(Debug, Clone)]
pub struct FieldMapping {
    pub left: String,
    pub right: String,
    pub label: String,
    equivalents: Vec<(String, String)>,
}

impl FieldMapping {
    pub fn new(left: impl Into<String>, right: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            label: label.into(),
            equivalents: Vec::new(),
        }
    }

    pub fn equivalent(mut self, left_value: impl Into<String>, right_value: impl Into<String>) -> Self {
        self.equivalents.push((left_value.into(), right_value.into()));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    pub label: String,
    pub value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldMismatch {
    pub label: String,
    pub left: Option<Value>,
    pub right: Option<Value>,
}

/// A field present on one side with no mapping covering it.
#[derive(Debug, Clone, PartialEq)]
pub struct UnmappedField {
    pub field: String,
    pub value: Value,
}

#[derive(Debug, Clone, Default)]
pub struct ComparisonReport {
    pub matches: Vec<FieldMatch>,
    pub mismatches: Vec<FieldMismatch>,
    pub unmapped_left: Vec<UnmappedField>,
    pub unmapped_right: Vec<UnmappedField>,
}

impl ComparisonReport {
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("Matching fields:\n");
        for m in &self.matches {
            out.push_str(&format!("{}: {}\n", m.label, display_value(m.value.as_ref())));
        }

        out.push_str("\nMismatched fields:\n");
        for m in &self.mismatches {
            out.push_str(&format!(
                "{}:\n  api: {}\n  store: {}\n",
                m.label,
                display_value(m.left.as_ref()),
                display_value(m.right.as_ref())
            ));
        }

        out.push_str("\nUnmapped api fields:\n");
        for f in &self.unmapped_left {
            out.push_str(&format!("{}: {}\n", f.field, f.value));
        }
        out.push_str("\nUnmapped store fields:\n");
        for f in &self.unmapped_right {
            out.push_str(&format!("{}: {}\n", f.field, f.value));
        }

        out
    }
}

fn display_value(value: Option<&Value>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "None".to_string(),
    }
}

/// Standardize a raw value for comparison: strings are trimmed, numbers are
/// widened to f64 so int/float representations of the same amount agree.
fn standardize(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.trim().to_string()),
        Value::Number(n) => n.as_f64().map(Value::from).unwrap_or_else(|| value.clone()),
        other => other.clone(),
    }
}

/// Compare two records field by field against the given mappings.
///
/// Fields absent on both sides count as matching (nothing disagrees).
/// Top-level fields not referenced by any mapping are reported verbatim,
/// with nested objects flattened to dot-notation paths.
pub fn compare_records(left: &Record, right: &Record, mappings: &[FieldMapping]) -> ComparisonReport {
    let mut report = ComparisonReport::default();

    for mapping in mappings {
        let left_value = nested_value(left, &mapping.left).map(standardize);
        let right_value = nested_value(right, &mapping.right).map(standardize);

        let matched = left_value == right_value || equivalent(mapping, &left_value, &right_value);

        if matched {
            report.matches.push(FieldMatch {
                label: mapping.label.clone(),
                value: left_value,
            });
        } else {
            report.mismatches.push(FieldMismatch {
                label: mapping.label.clone(),
                left: left_value,
                right: right_value,
            });
        }
    }

    let mapped_left: HashSet<&str> = mappings.iter().map(|m| root_segment(&m.left)).collect();
    let mapped_right: HashSet<&str> = mappings.iter().map(|m| root_segment(&m.right)).collect();

    for (field, value) in left {
        if !mapped_left.contains(field.as_str()) {
            flatten_into(field, value, &mut report.unmapped_left);
        }
    }
    for (field, value) in right {
        if !mapped_right.contains(field.as_str()) {
            flatten_into(field, value, &mut report.unmapped_right);
        }
    }

    report
}

fn equivalent(mapping: &FieldMapping, left: &Option<Value>, right: &Option<Value>) -> bool {
    let (Some(Value::String(l)), Some(Value::String(r))) = (left, right) else {
        return false;
    };
    mapping
        .equivalents
        .iter()
        .any(|(el, er)| el == l && er == r)
}

fn root_segment(path: &str) -> &str {
    path.split('.').next().unwrap_or(path)
}

fn flatten_into(prefix: &str, value: &Value, out: &mut Vec<UnmappedField>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_into(&format!("{}.{}", prefix, key), nested, out);
            }
        }
        other => out.push(UnmappedField {
            field: prefix.to_string(),
            value: other.clone(),
        }),
    }
}

/// The award field mappings checked by the comparison flow, pairing contracts
/// API paths with store columns.
pub fn award_field_mappings() -> Vec<FieldMapping> {
    vec![
        FieldMapping::new("award_id", "piid", "Award ID/PIID"),
        FieldMapping::new("parent_award_id", "parent_award_piid", "Parent Award ID"),
        FieldMapping::new("award_description_original", "description", "Description"),
        FieldMapping::new("award_type", "type_description", "Award Type"),
        FieldMapping::new("solicitation_identifier", "solicitation_identifier", "Solicitation ID"),
        FieldMapping::new("total_dollars_obligated", "total_obligation", "Total Obligation"),
        FieldMapping::new("current_total_value_of_award", "base_exercised_options", "Current Total Value"),
        FieldMapping::new("potential_total_value_of_award", "base_and_all_options", "Potential Total Value"),
        FieldMapping::new(
            "period_of_performance_start_date",
            "period_of_performance_start_date",
            "Performance Start Date",
        ),
        FieldMapping::new(
            "period_of_performance_current_end_date",
            "period_of_performance_end_date",
            "Performance End Date",
        ),
        FieldMapping::new(
            "period_of_performance_potential_end_date",
            "period_of_performance_potential_end_date",
            "Potential End Date",
        ),
        FieldMapping::new("awardee.clean_name", "recipient_name", "Recipient Name"),
        FieldMapping::new("awardee.uei", "recipient_uei", "Recipient UEI"),
        FieldMapping::new("awardee.cage_code", "recipient_cage_code", "Recipient CAGE Code"),
        FieldMapping::new("awardee_parent.clean_name", "parent_recipient_name", "Parent Recipient Name"),
        FieldMapping::new("awardee_parent.uei", "parent_recipient_uei", "Parent Recipient UEI"),
        FieldMapping::new(
            "primary_place_of_performance_city_name",
            "place_of_performance_city_name",
            "Place of Performance City",
        ),
        FieldMapping::new(
            "primary_place_of_performance_state_code",
            "place_of_performance_state_code",
            "Place of Performance State",
        ),
        FieldMapping::new(
            "primary_place_of_performance_zip",
            "place_of_performance_zip5",
            "Place of Performance ZIP",
        ),
        FieldMapping::new("psc_code.psc_code", "product_or_service_code", "PSC Code"),
        FieldMapping::new("naics_code.naics_code", "naics", "NAICS Code"),
        FieldMapping::new("naics_code.naics_description", "naics_description", "NAICS Description"),
        FieldMapping::new("number_of_offers_received", "number_of_offers_received", "Number of Offers"),
        FieldMapping::new("awarding_agency.agency_name", "awarding_agency_subtier_agency_name", "Awarding Agency"),
        FieldMapping::new("funding_agency.agency_name", "funding_agency_subtier_agency_name", "Funding Agency"),
        FieldMapping::new("latest_action_date", "transactions.0.action_date", "Latest Action Date"),
        FieldMapping::new("type_of_set_aside", "type_set_aside", "Set Aside Type"),
        FieldMapping::new("generated_unique_award_id", "generated_unique_award_id", "Generated Unique Award ID"),
        FieldMapping::new(
            "type_of_contract_pricing_description",
            "type_of_contract_pricing_description",
            "Contract Pricing Type",
        )
        .equivalent("Fixed Price", "FIRM FIXED PRICE"),
        FieldMapping::new("extent_competed", "extent_competed_description", "Extent Competed")
            .equivalent("Not Competed", "NOT COMPETED"),
        FieldMapping::new(
            "solicitation_procedures",
            "solicitation_procedures_description",
            "Solicitation Procedures",
        )
        .equivalent("Sole Source", "ONLY ONE SOURCE"),
        FieldMapping::new(
            "subcontracting_plan",
            "subcontracting_plan_description",
            "Subcontracting Plan",
        )
        .equivalent("Plan Not Required", "PLAN NOT REQUIRED"),
        FieldMapping::new(
            "clinger_cohen_act_planning",
            "clinger_cohen_act_planning_description",
            "Clinger Cohen Act Planning",
        )
        .equivalent("No", "NO"),
    ]
}
