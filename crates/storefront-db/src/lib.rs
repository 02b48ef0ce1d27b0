//! # storefront-db: Database Layer for the Storefront
//!
//! This crate provides database access for the storefront core.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Storefront Data Flow                              │
//! │                                                                         │
//! │  storefront-service (create_order)                                     │
//! │       │  let mut tx = db.begin().await?;                               │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  storefront-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌──────────────────┐   ┌─────────────┐  │   │
//! │  │   │   Database    │    │   Repositories   │   │ Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                  │   │ (embedded)  │  │   │
//! │  │   │               │    │ InventoryLedger  │   │             │  │   │
//! │  │   │ SqlitePool    │◄───│ OrderRepository  │   │ 001_init    │  │   │
//! │  │   │ begin/acquire │    │ ReferentialGuard │   │             │  │   │
//! │  │   └───────────────┘    └──────────────────┘   └─────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (inventory, order, cart, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_db::{Database, DbConfig, InventoryLedger, ReserveOutcome};
//!
//! let db = Database::new(DbConfig::new("storefront.db")).await?;
//!
//! let mut tx = db.begin().await?;
//! match InventoryLedger::reserve(&mut *tx, &offer_id, 2).await? {
//!     ReserveOutcome::Reserved { remaining } => { /* insert the order */ }
//!     ReserveOutcome::InsufficientStock { available } => { /* 409 */ }
//!     ReserveOutcome::NotFound => { /* 404 */ }
//! }
//! tx.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, DbTransaction};

// Repository re-exports for convenience
pub use repository::address::AddressRepository;
pub use repository::cart::{CartRepository, CartUpsert};
pub use repository::catalog::CatalogRepository;
pub use repository::guard::ReferentialGuard;
pub use repository::inventory::{InventoryLedger, ReserveOutcome};
pub use repository::order::OrderRepository;
pub use repository::payment::PaymentRepository;
pub use repository::shipping::ShippingRepository;
pub use repository::user::UserRepository;
