// Core engine exports
pub mod compare;
pub mod filters;
pub mod paginate;
pub mod predicate;
pub mod reconcile;

pub use compare::{award_field_mappings, compare_records, ComparisonReport, FieldMapping};
pub use filters::{FilterSpec, LogicalField};
pub use paginate::{fetch_all_pages, PageCursor, Termination};
pub use predicate::{to_query_pairs, Predicate};
pub use reconcile::{reconcile, IdentityRule, IdentitySet, MismatchReport};
