//! Cross-source reconciliation.
//!
//! Each record reduces to an Identity Set: the candidate identifier strings
//! found in a handful of ID/title fields plus any identifiers buried in a
//! nested history sub-collection. Two records describe the same opportunity
//! when their Identity Sets intersect non-emptily. This is a heuristic
//! equivalence, not a key match: matching is pairwise and non-transitive,
//! and a reused identifier (a common title string, say) can over- or
//! under-report mismatches. That behavior is inherited and kept as-is.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde_json::Value;

use crate::models::domain::{nested_value, Record};

/// The candidate identifier strings extracted from one record.
///
/// Backed by an ordered set so reports render deterministically. An empty
/// Identity Set intersects nothing and is therefore always unmatched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentitySet(BTreeSet<String>);

impl IdentitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>) {
        self.0.insert(id.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn intersects(&self, other: &IdentitySet) -> bool {
        self.0.iter().any(|id| other.0.contains(id))
    }
}

impl FromIterator<String> for IdentitySet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for IdentitySet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_string).collect())
    }
}

impl fmt::Display for IdentitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}", id)?;
        }
        write!(f, "}}")
    }
}

/// Identifier extraction from a nested sub-collection of prior versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRule {
    pub collection: String,
    pub field: String,
}

/// Source-specific rule reducing a record to its Identity Set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRule {
    fields: Vec<String>,
    history: Option<HistoryRule>,
}

impl IdentityRule {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            history: None,
        }
    }

    pub fn with_history(mut self, collection: impl Into<String>, field: impl Into<String>) -> Self {
        self.history = Some(HistoryRule {
            collection: collection.into(),
            field: field.into(),
        });
        self
    }

    /// Rule for records fetched from the record store: solicitation and
    /// notice IDs, the title, and the solicitation number of every history
    /// entry.
    pub fn store_results() -> Self {
        Self::new(["solicitation_id", "notice_id", "title"])
            .with_history("history", "solicitationNumber")
    }

    /// Rule for contracts API opportunity dumps.
    pub fn api_results() -> Self {
        Self::new(["source_id", "source_id_version"])
    }

    pub fn extract(&self, record: &Record) -> IdentitySet {
        let mut ids = IdentitySet::new();

        for field in &self.fields {
            push_identifier(&mut ids, nested_value(record, field));
        }

        if let Some(rule) = &self.history {
            if let Some(Value::Array(entries)) = record.get(&rule.collection) {
                for entry in entries {
                    push_identifier(&mut ids, entry.get(&rule.field));
                }
            }
        }

        ids
    }

    /// Extract one Identity Set per record.
    pub fn extract_all(&self, records: &[Record]) -> Vec<IdentitySet> {
        records.iter().map(|r| self.extract(r)).collect()
    }
}

fn push_identifier(ids: &mut IdentitySet, value: Option<&Value>) {
    match value {
        Some(Value::String(s)) if !s.is_empty() => ids.insert(s.clone()),
        Some(Value::Number(n)) => ids.insert(n.to_string()),
        _ => {}
    }
}

/// The symmetric set of unmatched records between two collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MismatchReport {
    pub left_total: usize,
    pub right_total: usize,
    pub unmatched_left: Vec<IdentitySet>,
    pub unmatched_right: Vec<IdentitySet>,
}

impl MismatchReport {
    pub fn total_mismatches(&self) -> usize {
        self.unmatched_left.len() + self.unmatched_right.len()
    }

    pub fn is_clean(&self) -> bool {
        self.unmatched_left.is_empty() && self.unmatched_right.is_empty()
    }

    /// Textual mismatch report: counts, then the raw Identity Set of every
    /// unmatched record.
    pub fn render(&self, left_name: &str, right_name: &str) -> String {
        let mut out = String::new();
        out.push_str("----- Mismatch Report -----\n");
        out.push_str(&format!("Records in {}: {}\n", left_name, self.left_total));
        out.push_str(&format!("Records in {}: {}\n", right_name, self.right_total));
        out.push_str(&format!(
            "Records in {} with no match in {}: {}\n",
            left_name,
            right_name,
            self.unmatched_left.len()
        ));
        out.push_str(&format!(
            "Records in {} with no match in {}: {}\n",
            right_name,
            left_name,
            self.unmatched_right.len()
        ));
        out.push_str(&format!("Total mismatches: {}\n", self.total_mismatches()));

        out.push_str(&format!("\nUnmatched records from {}:\n", left_name));
        for ids in &self.unmatched_left {
            out.push_str(&format!("{}\n", ids));
        }
        out.push_str(&format!("\nUnmatched records from {}:\n", right_name));
        for ids in &self.unmatched_right {
            out.push_str(&format!("{}\n", ids));
        }

        out
    }
}

/// Find the records on each side with no intersecting-identity counterpart
/// on the other side.
///
/// A record matches when any of its identifiers appears anywhere on the
/// other side; an inverted index over each side's identifiers makes that an
/// amortized O(n) lookup with output identical to the naive pairwise scan.
pub fn reconcile(left: &[IdentitySet], right: &[IdentitySet]) -> MismatchReport {
    let left_index = identifier_index(left);
    let right_index = identifier_index(right);

    let unmatched_left = left
        .iter()
        .filter(|ids| !ids.iter().any(|id| right_index.contains(id.as_str())))
        .cloned()
        .collect();
    let unmatched_right = right
        .iter()
        .filter(|ids| !ids.iter().any(|id| left_index.contains(id.as_str())))
        .cloned()
        .collect();

    MismatchReport {
        left_total: left.len(),
        right_total: right.len(),
        unmatched_left,
        unmatched_right,
    }
}

fn identifier_index(sets: &[IdentitySet]) -> HashSet<&str> {
    sets.iter()
        .flat_map(|ids| ids.iter().map(String::as_str))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(values: &[&str]) -> IdentitySet {
        values.iter().copied().collect()
    }

    #[test]
    fn test_identical_collections_have_no_mismatches() {
        let a = vec![ids(&["X1"]), ids(&["X2", "T2"])];
        let report = reconcile(&a, &a);

        assert!(report.is_clean());
        assert_eq!(report.total_mismatches(), 0);
    }

    #[test]
    fn test_partial_overlap_scenario() {
        // A = [{X1}, {X2}], B = [{X1, Y1}] -> only {X2} is unmatched.
        let a = vec![ids(&["X1"]), ids(&["X2"])];
        let b = vec![ids(&["X1", "Y1"])];
        let report = reconcile(&a, &b);

        assert_eq!(report.unmatched_left, vec![ids(&["X2"])]);
        assert!(report.unmatched_right.is_empty());
        assert_eq!(report.total_mismatches(), 1);
    }

    #[test]
    fn test_empty_identity_set_is_always_unmatched() {
        let a = vec![IdentitySet::new()];
        let b = vec![ids(&["X1"]), ids(&["X2"])];
        let report = reconcile(&a, &b);

        assert_eq!(report.unmatched_left.len(), 1);
        assert_eq!(report.unmatched_right.len(), 2);
    }

    #[test]
    fn test_symmetry() {
        let a = vec![ids(&["X1"]), ids(&["X2"])];
        let b = vec![ids(&["X2"]), ids(&["X1", "Z9"])];

        let forward = reconcile(&a, &b);
        let backward = reconcile(&b, &a);

        assert!(forward.is_clean());
        assert!(backward.is_clean());
    }

    #[test]
    fn test_matching_is_pairwise_not_transitive() {
        // B1 bridges A1 and A2, but A1 and A2 share nothing; each record is
        // still judged independently against the other side only.
        let a = vec![ids(&["S1"]), ids(&["S2"])];
        let b = vec![ids(&["S1", "S2"])];
        let report = reconcile(&a, &b);

        assert!(report.is_clean());
    }

    #[test]
    fn test_store_rule_extracts_history_identifiers() {
        let record = json!({
            "solicitation_id": "12024B23Q7001",
            "notice_id": "n-778",
            "title": "Media destruction services",
            "history": [
                {"solicitationNumber": "12024B22Q6990", "postedDate": "2022-01-01"},
                {"solicitationNumber": "", "postedDate": "2021-06-01"},
                {"postedDate": "2020-02-01"}
            ]
        });
        let extracted = IdentityRule::store_results().extract(record.as_object().unwrap());

        assert_eq!(
            extracted,
            ids(&[
                "12024B23Q7001",
                "n-778",
                "Media destruction services",
                "12024B22Q6990"
            ])
        );
    }

    #[test]
    fn test_api_rule_ignores_missing_fields() {
        let record = json!({"source_id": "ABC123", "title": "unused"});
        let extracted = IdentityRule::api_results().extract(record.as_object().unwrap());

        assert_eq!(extracted, ids(&["ABC123"]));
    }

    #[test]
    fn test_numeric_identifiers_are_stringified() {
        let rule = IdentityRule::new(["set_aside_id"]);
        let record = json!({"set_aside_id": 16});
        let extracted = rule.extract(record.as_object().unwrap());

        assert_eq!(extracted, ids(&["16"]));
    }

    #[test]
    fn test_record_with_no_identifier_fields_extracts_empty() {
        let rule = IdentityRule::store_results();
        let record = json!({"unrelated": true, "title": ""});
        let extracted = rule.extract(record.as_object().unwrap());

        assert!(extracted.is_empty());
    }

    #[test]
    fn test_report_render_lists_counts_and_sets() {
        let a = vec![ids(&["X1"]), ids(&["X2"])];
        let b = vec![ids(&["X1", "Y1"])];
        let rendered = reconcile(&a, &b).render("csv", "store");

        assert!(rendered.contains("Records in csv: 2"));
        assert!(rendered.contains("Records in store: 1"));
        assert!(rendered.contains("Total mismatches: 1"));
        assert!(rendered.contains("\"X2\""));
    }
}
