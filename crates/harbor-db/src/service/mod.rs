//! # Transactional Services
//!
//! The three write paths of the system. Each call is one unit of work.
//!
//! ## Unit of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate (harbor-core)          nothing written yet → 422              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  pool.begin()                    one pooled connection                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT header row               first statement writes: the SQLite     │
//! │       │                          write lock is held from here on        │
//! │       ▼                                                                 │
//! │  steps (ledger, items, audit)    each returns Result                    │
//! │       │                                                                 │
//! │       ├── Ok  ──► tx.commit()                                           │
//! │       └── Err ──► tx.rollback()  then the error goes to the caller      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`SyncIngestor`] is a single upsert statement and needs no explicit
//! transaction.

pub mod order;
pub mod stocktake;
pub mod sync;

pub use order::OrderService;
pub use stocktake::StocktakeService;
pub use sync::SyncIngestor;

use std::sync::Arc;

use harbor_core::{ClockNumbers, NumberSource, DEFAULT_NUMBER_ATTEMPTS};
use sqlx::{Sqlite, Transaction};
use tracing::error;

use crate::error::{DbError, ServiceResult};

/// Settings shared by the transactional services.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// How many document numbers to try before `DocumentNumberExhausted`.
    pub number_attempts: u32,

    /// Candidate order / check numbers.
    pub numbers: Arc<dyn NumberSource>,
}

impl ServiceConfig {
    /// Sets the number of document number attempts (at least 1).
    pub fn number_attempts(mut self, attempts: u32) -> Self {
        self.number_attempts = attempts.max(1);
        self
    }

    /// Replaces the number generator.
    pub fn numbers(mut self, numbers: Arc<dyn NumberSource>) -> Self {
        self.numbers = numbers;
        self
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            number_attempts: DEFAULT_NUMBER_ATTEMPTS,
            numbers: Arc::new(ClockNumbers),
        }
    }
}

/// Commits on `Ok`, rolls back on `Err`.
pub(crate) async fn finish<T>(
    tx: Transaction<'static, Sqlite>,
    outcome: ServiceResult<T>,
) -> ServiceResult<T> {
    match outcome {
        Ok(value) => {
            tx.commit()
                .await
                .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                error!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}
