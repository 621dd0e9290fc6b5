// Job orchestration exports
pub mod fetch;
pub mod reconcile;

pub use fetch::{
    award_filter_spec, fetch_api_awards, fetch_api_opportunities, fetch_awards, fetch_notices,
    notice_filter_spec,
};
pub use reconcile::{compare_award, reconcile_snapshots};
