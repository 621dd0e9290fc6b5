//! Opptrack - contract opportunity retrieval and reconciliation
//!
//! This library pulls government contracting records from two places: a
//! hosted record store queried through its REST interface, and a
//! third-party contracts API. Configured criteria become Filter
//! Specifications, fetches paginate exhaustively, and record sets from
//! different sources are reconciled by Identity Set intersection.

pub mod config;
pub mod core;
pub mod jobs;
pub mod models;
pub mod services;
pub mod snapshot;

// Re-export commonly used types
pub use crate::core::{
    compare_records, fetch_all_pages, reconcile, ComparisonReport, FilterSpec, IdentityRule,
    IdentitySet, LogicalField, MismatchReport, Predicate,
};
pub use models::{AwardParams, OpportunityParams, Record};
pub use services::{ContractsApiClient, StoreClient};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let spec = FilterSpec::new().include("naics", ["541511"]);
        assert_eq!(spec.to_predicates().len(), 1);
    }
}
