pub mod carrier_api;
pub mod config_store;
pub mod event_store;
pub mod transaction_store;
pub mod user_store;

/// Failure of a platform store that is not a "not found".
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("store error: {0}")]
    Backend(String),
}
