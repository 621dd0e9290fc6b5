//! Structured predicate tree for record store queries.
//!
//! Constraints are built programmatically as tagged variants and only
//! rendered into the store's query language (PostgREST operator syntax) at
//! the service boundary. This keeps filter construction free of the quoting
//! and injection pitfalls of hand-joined filter strings.

/// One constraint against the record store.
///
/// `Or` combines synonyms of a single logical field (e.g. a value matching
/// either of two aliased columns); all top-level predicates on a query are
/// combined with AND by the store itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq { column: String, value: String },
    Neq { column: String, value: String },
    In { column: String, values: Vec<String> },
    Gt { column: String, value: String },
    Gte { column: String, value: String },
    Lte { column: String, value: String },
    Or(Vec<Predicate>),
    /// Websearch-mode full-text search over a designated column.
    TextSearch { column: String, query: String },
}

impl Predicate {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Eq { column: column.into(), value: value.into() }
    }

    pub fn neq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Neq { column: column.into(), value: value.into() }
    }

    pub fn is_in(column: impl Into<String>, values: Vec<String>) -> Self {
        Self::In { column: column.into(), values }
    }

    pub fn gt(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Gt { column: column.into(), value: value.into() }
    }

    pub fn gte(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Gte { column: column.into(), value: value.into() }
    }

    pub fn lte(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Lte { column: column.into(), value: value.into() }
    }

    pub fn text_search(column: impl Into<String>, query: impl Into<String>) -> Self {
        Self::TextSearch { column: column.into(), query: query.into() }
    }

    /// Render this predicate as one query-string pair.
    ///
    /// The pair is handed to the HTTP client unencoded; percent-encoding
    /// happens when the request URL is built.
    pub fn to_query_pair(&self) -> (String, String) {
        match self {
            Predicate::Eq { column, value } => (column.clone(), format!("eq.{}", value)),
            Predicate::Neq { column, value } => (column.clone(), format!("neq.{}", value)),
            Predicate::In { column, values } => {
                (column.clone(), format!("in.({})", quoted_list(values)))
            }
            Predicate::Gt { column, value } => (column.clone(), format!("gt.{}", value)),
            Predicate::Gte { column, value } => (column.clone(), format!("gte.{}", value)),
            Predicate::Lte { column, value } => (column.clone(), format!("lte.{}", value)),
            Predicate::Or(inner) => {
                let parts: Vec<String> = inner.iter().map(Predicate::to_tree_clause).collect();
                ("or".to_string(), format!("({})", parts.join(",")))
            }
            Predicate::TextSearch { column, query } => {
                (column.clone(), format!("wfts(english).{}", query))
            }
        }
    }

    /// Render for use inside a logic tree (`or=(...)`), where the column
    /// name prefixes the operator.
    fn to_tree_clause(&self) -> String {
        match self {
            Predicate::Eq { column, value } => format!("{}.eq.{}", column, quote(value)),
            Predicate::Neq { column, value } => format!("{}.neq.{}", column, quote(value)),
            Predicate::In { column, values } => {
                format!("{}.in.({})", column, quoted_list(values))
            }
            Predicate::Gt { column, value } => format!("{}.gt.{}", column, quote(value)),
            Predicate::Gte { column, value } => format!("{}.gte.{}", column, quote(value)),
            Predicate::Lte { column, value } => format!("{}.lte.{}", column, quote(value)),
            Predicate::Or(inner) => {
                let parts: Vec<String> = inner.iter().map(Predicate::to_tree_clause).collect();
                format!("or({})", parts.join(","))
            }
            Predicate::TextSearch { column, query } => {
                format!("{}.wfts(english).{}", column, quote(query))
            }
        }
    }
}

/// Render a list of predicates as query-string pairs.
///
/// Repeated pairs with the same key are legal and AND-combined by the store
/// (N separate negations stay N separate pairs).
pub fn to_query_pairs(predicates: &[Predicate]) -> Vec<(String, String)> {
    predicates.iter().map(Predicate::to_query_pair).collect()
}

/// Quote a value for list and logic-tree contexts, where commas, parens and
/// dots are structural. Plain operator values (`col=eq.value`) are never
/// quoted because the store reads quotes there literally.
fn quote(value: &str) -> String {
    let reserved = value
        .chars()
        .any(|c| matches!(c, ',' | '.' | ':' | '(' | ')' | '"' | ' '));
    if reserved {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

fn quoted_list(values: &[String]) -> String {
    values.iter().map(|v| quote(v)).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eq_pair() {
        let pair = Predicate::eq("latest", "true").to_query_pair();
        assert_eq!(pair, ("latest".to_string(), "eq.true".to_string()));
    }

    #[test]
    fn test_in_pair() {
        let pair = Predicate::is_in(
            "naics",
            vec!["541511".to_string(), "541512".to_string()],
        )
        .to_query_pair();
        assert_eq!(pair, ("naics".to_string(), "in.(541511,541512)".to_string()));
    }

    #[test]
    fn test_in_quotes_reserved_values() {
        let pair = Predicate::is_in(
            "title",
            vec!["IT, support (west)".to_string(), "plain".to_string()],
        )
        .to_query_pair();
        assert_eq!(
            pair.1,
            "in.(\"IT, support (west)\",plain)".to_string()
        );
    }

    #[test]
    fn test_or_group_over_aliased_columns() {
        let pair = Predicate::Or(vec![
            Predicate::eq("organization_key", "300000201"),
            Predicate::eq("organization_level_1_key", "300000201"),
        ])
        .to_query_pair();
        assert_eq!(pair.0, "or");
        assert_eq!(
            pair.1,
            "(organization_key.eq.300000201,organization_level_1_key.eq.300000201)"
        );
    }

    #[test]
    fn test_or_group_with_in_clauses() {
        let uei = vec!["SMNWM6HN79X5".to_string()];
        let pair = Predicate::Or(vec![
            Predicate::is_in("recipient_uei", uei.clone()),
            Predicate::is_in("parent_recipient_uei", uei),
        ])
        .to_query_pair();
        assert_eq!(
            pair.1,
            "(recipient_uei.in.(SMNWM6HN79X5),parent_recipient_uei.in.(SMNWM6HN79X5))"
        );
    }

    #[test]
    fn test_tree_clause_quotes_timestamps() {
        let pair = Predicate::Or(vec![Predicate::gt(
            "solicitation_response_deadline",
            "2025-03-17T18:48:13+00:00",
        )])
        .to_query_pair();
        assert_eq!(
            pair.1,
            "(solicitation_response_deadline.gt.\"2025-03-17T18:48:13+00:00\")"
        );
    }

    #[test]
    fn test_text_search_pair() {
        let pair = Predicate::text_search("opportunity_text", "'ITAD' | 'destruction'")
            .to_query_pair();
        assert_eq!(pair.0, "opportunity_text");
        assert_eq!(pair.1, "wfts(english).'ITAD' | 'destruction'");
    }

    #[test]
    fn test_neq_stays_separate_pairs() {
        let preds = vec![
            Predicate::neq("type", "s"),
            Predicate::neq("type", "a"),
        ];
        let pairs = to_query_pairs(&preds);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], ("type".to_string(), "neq.s".to_string()));
        assert_eq!(pairs[1], ("type".to_string(), "neq.a".to_string()));
    }
}
