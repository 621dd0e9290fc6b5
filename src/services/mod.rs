// Service layer exports
pub mod contracts_api;
pub mod store;

pub use contracts_api::{ContractsApiClient, ContractsApiError};
pub use store::{StoreClient, StoreError};
