//! # storefront-service: Units of Work for the Storefront
//!
//! Every operation a transport layer exposes lives here. Each one takes a
//! [`Caller`], validates its input, opens at most one transaction, runs the
//! repositories against it and commits. Any early return drops the
//! transaction, which rolls it back.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Transport (HTTP, CLI)  ──  Caller { user_id, role }                  │
//! │          │                                                              │
//! │          ▼                                                              │
//! │   ┌──────────────────────────────────────────────────────────────┐     │
//! │   │           storefront-service (THIS CRATE)                    │     │
//! │   │                                                              │     │
//! │   │  Storefront ─┬─ orders()     OrderService                    │     │
//! │   │              ├─ cart()       CartService                     │     │
//! │   │              ├─ payments()   PaymentService                  │     │
//! │   │              ├─ shipping()   ShippingService                 │     │
//! │   │              ├─ addresses()  AddressService                  │     │
//! │   │              └─ catalog()    CatalogService                  │     │
//! │   └──────────────────────────────────────────────────────────────┘     │
//! │          │                          │                                   │
//! │          ▼                          ▼                                   │
//! │   storefront-core             storefront-db                             │
//! │   (access, lifecycle)         (repositories, ledger, guard)             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use storefront_service::{config::StorefrontConfig, telemetry, Storefront};
//! use storefront_core::Caller;
//!
//! telemetry::init_tracing();
//! let store = Storefront::connect(&StorefrontConfig::load()?).await?;
//!
//! let order = store.orders().create(&Caller::user(user_id), &offer_id, 2).await?;
//! ```

pub mod addresses;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod orders;
pub mod payments;
pub mod shipping;
pub mod telemetry;

pub use addresses::AddressService;
pub use cart::CartService;
pub use catalog::CatalogService;
pub use config::{ConfigError, StorefrontConfig};
pub use error::{ErrorCode, ServiceError, ServiceResult};
pub use orders::OrderService;
pub use payments::PaymentService;
pub use shipping::ShippingService;

pub use storefront_core::{Caller, Role};

use storefront_db::{Database, DbError, DbTransaction};
use tracing::info;

/// Entry point: a database handle plus one accessor per service.
///
/// Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct Storefront {
    db: Database,
}

impl Storefront {
    pub fn new(db: Database) -> Self {
        Storefront { db }
    }

    /// Opens the database described by `config`.
    pub async fn connect(config: &StorefrontConfig) -> ServiceResult<Self> {
        info!(path = %config.db_path, "Connecting storefront");
        let db = Database::new(config.to_db_config()).await?;
        Ok(Storefront::new(db))
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn orders(&self) -> OrderService<'_> {
        OrderService::new(&self.db)
    }

    pub fn cart(&self) -> CartService<'_> {
        CartService::new(&self.db)
    }

    pub fn payments(&self) -> PaymentService<'_> {
        PaymentService::new(&self.db)
    }

    pub fn shipping(&self) -> ShippingService<'_> {
        ShippingService::new(&self.db)
    }

    pub fn addresses(&self) -> AddressService<'_> {
        AddressService::new(&self.db)
    }

    pub fn catalog(&self) -> CatalogService<'_> {
        CatalogService::new(&self.db)
    }
}

/// Commits a unit of work.
pub(crate) async fn commit(tx: DbTransaction) -> ServiceResult<()> {
    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
    Ok(())
}
