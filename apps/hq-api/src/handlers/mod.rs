//! HTTP handlers.
//!
//! One module per resource. Handlers decode the request, apply the wire
//! defaults, make exactly one call into harbor-db and wrap the result in the
//! envelope.

pub mod health;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod reports;
pub mod sync;

use serde::Deserialize;

use harbor_core::{DEFAULT_COMPANY_ID, DEFAULT_STORE_ID};

pub(crate) fn default_company_id() -> i64 {
    DEFAULT_COMPANY_ID
}

pub(crate) fn default_store_id() -> i64 {
    DEFAULT_STORE_ID
}

/// `?company_id=&store_id=` with the terminal defaults.
#[derive(Debug, Deserialize)]
pub struct StoreQuery {
    #[serde(default = "default_company_id")]
    pub company_id: i64,
    #[serde(default = "default_store_id")]
    pub store_id: i64,
}
