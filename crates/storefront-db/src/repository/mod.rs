//! # Repository Module
//!
//! Database repository implementations for the storefront.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  storefront-service                                                    │
//! │       │                                                                 │
//! │       │  let mut tx = db.begin().await?;                               │
//! │       │  InventoryLedger::reserve(&mut *tx, offer, qty)                │
//! │       │  OrderRepository::insert(&mut *tx, ...)                        │
//! │       │  tx.commit().await?;                                           │
//! │       ▼                                                                 │
//! │  Repositories (stateless)                                              │
//! │  └── every method takes `&mut SqliteConnection`:                       │
//! │      a transaction for writes, a pooled connection for reads           │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Whoever opened the transaction decides when it commits; a repository │
//! │  never commits on its own.                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`InventoryLedger`](inventory::InventoryLedger) - Atomic reserve/release of offer stock
//! - [`OrderRepository`](order::OrderRepository) - Orders and their status
//! - [`CartRepository`](cart::CartRepository) - Staged cart lines
//! - [`PaymentRepository`](payment::PaymentRepository) - One payment per order
//! - [`ShippingRepository`](shipping::ShippingRepository) - One shipping record per order
//! - [`ReferentialGuard`](guard::ReferentialGuard) - Reference counts checked before deletes
//! - [`CatalogRepository`](catalog::CatalogRepository) - Products, manufacturers, offers
//! - [`AddressRepository`](address::AddressRepository) - User addresses
//! - [`UserRepository`](user::UserRepository) - User rows

pub mod address;
pub mod cart;
pub mod catalog;
pub mod guard;
pub mod inventory;
pub mod order;
pub mod payment;
pub mod shipping;
pub mod user;
