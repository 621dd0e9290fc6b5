// Model exports
pub mod domain;
pub mod params;

pub use domain::{nested_value, Record};
pub use params::{AwardParams, OpportunityParams};
