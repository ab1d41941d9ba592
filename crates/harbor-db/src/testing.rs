//! Shared fixtures for the unit tests of this crate.

use std::collections::VecDeque;
use std::sync::Mutex;

use harbor_core::{ClockNumbers, Money, NewProduct, NumberSource};
use tempfile::TempDir;

use crate::{Database, DbConfig, ServiceConfig};

/// Fresh migrated in-memory database.
pub async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// In-memory database with custom service settings.
pub async fn test_db_with(services: ServiceConfig) -> Database {
    test_db().await.with_service_config(services)
}

/// File-backed database with several connections, for concurrency tests.
///
/// Keep the returned directory alive for the duration of the test.
pub async fn file_db() -> (Database, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::new(dir.path().join("harbor.db")).max_connections(4);
    let db = Database::new(config).await.unwrap();
    (db, dir)
}

/// One store, one product (price 2.50, cost 1.00) and CASH/CARD tenders.
#[derive(Debug, Clone, Copy)]
pub struct Fixture {
    pub company_id: i64,
    pub store_id: i64,
    pub product_id: i64,
}

impl Fixture {
    /// Adds an active product without stock in the fixture store.
    pub async fn add_product(&self, db: &Database, sku: &str, price: f64) -> i64 {
        db.catalog()
            .insert_product(&NewProduct {
                company_id: self.company_id,
                sku: sku.to_string(),
                qr_code: None,
                barcode: None,
                name: format!("Product {}", sku),
                price: Money::from_amount(price),
                cost: Money::from_amount(1.0),
            })
            .await
            .unwrap()
    }

    /// Opening balance for a product in the fixture store.
    pub async fn stock(&self, db: &Database, product_id: i64, qty: f64) {
        db.inventory()
            .initialize(self.company_id, self.store_id, product_id, qty, 5.0)
            .await
            .unwrap();
    }
}

/// Seeds the standard fixture with `qty` units on hand (safety stock 5).
pub async fn seed_fixture(db: &Database, qty: f64) -> Fixture {
    let company_id = 1;
    let catalog = db.catalog();

    let store_id = catalog.insert_store(company_id, "MAIN", "Main Street").await.unwrap();
    catalog.insert_payment_method(company_id, "CASH", "Cash").await.unwrap();
    catalog.insert_payment_method(company_id, "CARD", "Card").await.unwrap();

    let product_id = catalog
        .insert_product(&NewProduct {
            company_id,
            sku: "SKU-1".to_string(),
            qr_code: Some("QR-1".to_string()),
            barcode: Some("BAR-1".to_string()),
            name: "Oolong Tea 500ml".to_string(),
            price: Money::from_amount(2.5),
            cost: Money::from_amount(1.0),
        })
        .await
        .unwrap();

    let fixture = Fixture {
        company_id,
        store_id,
        product_id,
    };
    fixture.stock(db, product_id, qty).await;
    fixture
}

/// Hands out a fixed list of numbers, then falls back to the clock.
#[derive(Debug)]
pub struct ScriptedNumbers {
    queue: Mutex<VecDeque<String>>,
}

impl ScriptedNumbers {
    pub fn new(numbers: &[&str]) -> Self {
        ScriptedNumbers {
            queue: Mutex::new(numbers.iter().map(|n| n.to_string()).collect()),
        }
    }
}

impl NumberSource for ScriptedNumbers {
    fn next_number(&self, prefix: &str) -> String {
        let next = self.queue.lock().unwrap().pop_front();
        next.unwrap_or_else(|| ClockNumbers.next_number(prefix))
    }
}
