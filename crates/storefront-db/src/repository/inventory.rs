//! # Inventory Ledger
//!
//! Owns the stock count of every offer.
//!
//! ## Reserve Is One Conditional Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UPDATE offers SET stock = stock - :q                                   │
//! │   WHERE id = :offer AND stock >= :q                                     │
//! │       │                                                                 │
//! │       ├── 1 row  → Reserved { remaining }                               │
//! │       │                                                                 │
//! │       └── 0 rows → SELECT stock                                         │
//! │                     ├── no row  → NotFound                              │
//! │                     └── stock s → InsufficientStock { available: s }    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! The check and the decrement are the same statement, so two units of work
//! racing for the last unit cannot both succeed. Never read-then-write here.
//!
//! Because the reserve is a write, it is also what takes SQLite's write lock
//! when it opens a unit of work; the classifying read afterwards therefore
//! sees a stable value.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Result of [`InventoryLedger::reserve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// Stock was decremented; `remaining` is what is left.
    Reserved { remaining: i64 },
    /// Nothing changed; the offer holds only `available` units.
    InsufficientStock { available: i64 },
    /// No such offer.
    NotFound,
}

/// Stock operations on offers.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryLedger;

impl InventoryLedger {
    /// Atomically takes `quantity` units from an offer, or nothing at all.
    ///
    /// `quantity` must already be validated as positive.
    pub async fn reserve(
        conn: &mut SqliteConnection,
        offer_id: &str,
        quantity: i64,
    ) -> DbResult<ReserveOutcome> {
        debug!(offer_id = %offer_id, quantity, "Reserving stock");

        let remaining: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE offers
               SET stock = stock - ?1,
                   updated_at = ?2
             WHERE id = ?3 AND stock >= ?1
            RETURNING stock
            "#,
        )
        .bind(quantity)
        .bind(Utc::now())
        .bind(offer_id)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(remaining) = remaining {
            return Ok(ReserveOutcome::Reserved { remaining });
        }

        match Self::available_stock(conn, offer_id).await? {
            Some(available) => {
                debug!(offer_id = %offer_id, available, requested = quantity, "Reserve refused");
                Ok(ReserveOutcome::InsufficientStock { available })
            }
            None => Ok(ReserveOutcome::NotFound),
        }
    }

    /// Gives `quantity` units back to an offer.
    ///
    /// Used only when a user cancels an order; the quantity is the order's.
    ///
    /// ## Errors
    /// [`DbError::NotFound`] if the offer no longer exists.
    pub async fn release(conn: &mut SqliteConnection, offer_id: &str, quantity: i64) -> DbResult<i64> {
        debug!(offer_id = %offer_id, quantity, "Releasing stock");

        let stock: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE offers
               SET stock = stock + ?1,
                   updated_at = ?2
             WHERE id = ?3
            RETURNING stock
            "#,
        )
        .bind(quantity)
        .bind(Utc::now())
        .bind(offer_id)
        .fetch_optional(&mut *conn)
        .await?;

        stock.ok_or_else(|| DbError::not_found("Offer", offer_id))
    }

    /// Current stock of an offer, or `None` if the offer does not exist.
    pub async fn available_stock(conn: &mut SqliteConnection, offer_id: &str) -> DbResult<Option<i64>> {
        let stock: Option<i64> = sqlx::query_scalar("SELECT stock FROM offers WHERE id = ?1")
            .bind(offer_id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(stock)
    }

    /// Whether the offer exists and holds at least `quantity` units.
    ///
    /// Advisory only: nothing is held, so the answer can be stale by the
    /// time an order is placed.
    pub async fn check_available(
        conn: &mut SqliteConnection,
        offer_id: &str,
        quantity: i64,
    ) -> DbResult<bool> {
        Ok(Self::available_stock(conn, offer_id)
            .await?
            .is_some_and(|stock| stock >= quantity))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
