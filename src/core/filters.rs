//! Filter Specification: a set of named optional criteria describing which
//! records to retrieve, translated deterministically into a predicate tree.
//!
//! Invariants:
//! - a criterion built from an empty value set contributes no constraint
//!   (absence is never exclusion);
//! - include and exclude lists over the same logical field are independent
//!   and both apply (AND);
//! - exclusion renders as N separate negations rather than a single NOT-IN,
//!   which keeps null-valued columns out of the excluded set.

use crate::core::predicate::Predicate;

/// One logical field, backed by one or more store columns.
///
/// Most fields map to a single column; aliased fields (e.g. a recipient UEI
/// that may live in `recipient_uei` or `parent_recipient_uei`, or the eight
/// organization-level key columns) list every synonym. Inclusion over an
/// aliased field becomes an OR across the synonyms; exclusion negates every
/// synonym column separately.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalField {
    columns: Vec<String>,
}

impl LogicalField {
    pub fn column(name: impl Into<String>) -> Self {
        Self { columns: vec![name.into()] }
    }

    pub fn aliased<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl From<&str> for LogicalField {
    fn from(name: &str) -> Self {
        Self::column(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Criterion {
    Include { field: LogicalField, values: Vec<String> },
    Exclude { field: LogicalField, values: Vec<String> },
    Equals { column: String, value: String },
    After { column: String, value: String },
    AtLeast { column: String, value: String },
    AtMost { column: String, value: String },
    Text { column: String, query: String },
}

/// An immutable set of optional filter criteria.
///
/// Built once per fetch with the builder methods below, then translated to
/// predicates at the query boundary. Builders silently skip empty inputs, so
/// a fully unset specification translates to zero constraints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    criteria: Vec<Criterion>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Require the field's value to be one of `values`.
    pub fn include<F, I, S>(mut self, field: F, values: I) -> Self
    where
        F: Into<LogicalField>,
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        let values: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
        if !values.is_empty() {
            self.criteria.push(Criterion::Include { field: field.into(), values });
        }
        self
    }

    /// Require the field's value to differ from each of `values`.
    pub fn exclude<F, I, S>(mut self, field: F, values: I) -> Self
    where
        F: Into<LogicalField>,
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        let values: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
        if !values.is_empty() {
            self.criteria.push(Criterion::Exclude { field: field.into(), values });
        }
        self
    }

    /// Require exact equality on a single column.
    pub fn equals(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.criteria.push(Criterion::Equals {
            column: column.into(),
            value: value.to_string(),
        });
        self
    }

    /// Require the column to be strictly greater than `value` (used for
    /// "still active" deadline cutoffs).
    pub fn after(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.criteria.push(Criterion::After {
            column: column.into(),
            value: value.to_string(),
        });
        self
    }

    /// Inclusive lower range bound.
    pub fn at_least(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.criteria.push(Criterion::AtLeast {
            column: column.into(),
            value: value.to_string(),
        });
        self
    }

    /// Inclusive upper range bound.
    pub fn at_most(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.criteria.push(Criterion::AtMost {
            column: column.into(),
            value: value.to_string(),
        });
        self
    }

    /// Full-text websearch query over a designated column. An empty query
    /// adds no constraint.
    pub fn text_search(mut self, column: impl Into<String>, query: impl Into<String>) -> Self {
        let query = query.into();
        if !query.trim().is_empty() {
            self.criteria.push(Criterion::Text { column: column.into(), query });
        }
        self
    }

    /// Translate every populated criterion into predicates, AND-combined by
    /// the store.
    pub fn to_predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        for criterion in &self.criteria {
            match criterion {
                Criterion::Include { field, values } => {
                    let mut clauses: Vec<Predicate> = field
                        .columns()
                        .iter()
                        .map(|col| Predicate::is_in(col.clone(), values.clone()))
                        .collect();
                    if clauses.len() == 1 {
                        predicates.push(clauses.remove(0));
                    } else {
                        predicates.push(Predicate::Or(clauses));
                    }
                }
                Criterion::Exclude { field, values } => {
                    for col in field.columns() {
                        for value in values {
                            predicates.push(Predicate::neq(col.clone(), value.clone()));
                        }
                    }
                }
                Criterion::Equals { column, value } => {
                    predicates.push(Predicate::eq(column.clone(), value.clone()));
                }
                Criterion::After { column, value } => {
                    predicates.push(Predicate::gt(column.clone(), value.clone()));
                }
                Criterion::AtLeast { column, value } => {
                    predicates.push(Predicate::gte(column.clone(), value.clone()));
                }
                Criterion::AtMost { column, value } => {
                    predicates.push(Predicate::lte(column.clone(), value.clone()));
                }
                Criterion::Text { column, query } => {
                    predicates.push(Predicate::text_search(column.clone(), query.clone()));
                }
            }
        }

        predicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_spec_adds_no_constraints() {
        let spec = FilterSpec::new()
            .include("naics", Vec::<String>::new())
            .exclude("psc", Vec::<String>::new())
            .text_search("opportunity_text", "");

        assert!(spec.is_empty());
        assert!(spec.to_predicates().is_empty());
    }

    #[test]
    fn test_include_single_column() {
        let spec = FilterSpec::new().include("naics", ["541511", "541512"]);
        let preds = spec.to_predicates();

        assert_eq!(preds.len(), 1);
        assert_eq!(
            preds[0],
            Predicate::is_in("naics", vec!["541511".to_string(), "541512".to_string()])
        );
    }

    #[test]
    fn test_exclude_renders_separate_negations() {
        let spec = FilterSpec::new().exclude("type", ["s", "a", "u"]);
        let preds = spec.to_predicates();

        assert_eq!(preds.len(), 3);
        assert!(preds.iter().all(|p| matches!(p, Predicate::Neq { .. })));
    }

    #[test]
    fn test_include_and_exclude_are_independent() {
        let spec = FilterSpec::new()
            .include("naics", ["541511"])
            .exclude("naics", ["236220"]);
        let preds = spec.to_predicates();

        assert_eq!(preds.len(), 2);
        assert_eq!(
            preds[0],
            Predicate::is_in("naics", vec!["541511".to_string()])
        );
        assert_eq!(preds[1], Predicate::neq("naics", "236220"));
    }

    #[test]
    fn test_aliased_include_becomes_or_group() {
        let field = LogicalField::aliased(["recipient_uei", "parent_recipient_uei"]);
        let spec = FilterSpec::new().include(field, ["SMNWM6HN79X5"]);
        let preds = spec.to_predicates();

        assert_eq!(preds.len(), 1);
        match &preds[0] {
            Predicate::Or(clauses) => {
                assert_eq!(clauses.len(), 2);
                assert!(matches!(clauses[0], Predicate::In { .. }));
            }
            other => panic!("expected Or group, got {:?}", other),
        }
    }

    #[test]
    fn test_aliased_exclude_negates_every_column() {
        let field = LogicalField::aliased(["recipient_uei", "parent_recipient_uei"]);
        let spec = FilterSpec::new().exclude(field, ["SMNWM6HN79X5"]);
        let preds = spec.to_predicates();

        assert_eq!(preds.len(), 2);
        assert_eq!(preds[0], Predicate::neq("recipient_uei", "SMNWM6HN79X5"));
        assert_eq!(preds[1], Predicate::neq("parent_recipient_uei", "SMNWM6HN79X5"));
    }

    #[test]
    fn test_range_bounds() {
        let spec = FilterSpec::new()
            .at_least("total_obligation", 100000.0)
            .at_most("total_obligation", 5000000.0);
        let preds = spec.to_predicates();

        assert_eq!(preds.len(), 2);
        assert_eq!(preds[0], Predicate::gte("total_obligation", "100000"));
        assert_eq!(preds[1], Predicate::lte("total_obligation", "5000000"));
    }

    #[test]
    fn test_numeric_values_stringified() {
        let spec = FilterSpec::new().include("set_aside_id", [16_i64, 24]);
        let preds = spec.to_predicates();
        assert_eq!(
            preds[0],
            Predicate::is_in("set_aside_id", vec!["16".to_string(), "24".to_string()])
        );
    }
}
