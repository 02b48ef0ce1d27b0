//! # Cart Service
//!
//! A per-user staging area. Adding to the cart checks stock the same way
//! order creation does, but never holds anything: the stock is taken only
//! when an order is placed.
//!
//! ## Add
//! ```text
//! quantity = quantity.unwrap_or(1), must be > 0
//! BEGIN
//!   upsert line (merges into an existing line for the same offer)
//!     └─ no offer → rollback, NOT_FOUND
//!   requested > stock   → rollback, CONFLICT
//!   merged total > stock → rollback, CONFLICT
//! COMMIT
//! ```

use storefront_core::validation::{validate_id, validate_quantity};
use storefront_core::{Caller, CartLine, CartLineView, CoreError, DEFAULT_CART_QUANTITY};
use storefront_db::{CartRepository, Database, InventoryLedger};
use tracing::{debug, info, warn};

use crate::commit;
use crate::error::ServiceResult;

const REQUESTED_EXCEEDS_STOCK: &str = "Requested quantity exceeds available stock";
const TOTAL_EXCEEDS_STOCK: &str = "Total quantity exceeds available stock";

/// Cart operations. Obtained from [`crate::Storefront::cart`].
#[derive(Debug, Clone, Copy)]
pub struct CartService<'a> {
    db: &'a Database,
}

impl<'a> CartService<'a> {
    pub fn new(db: &'a Database) -> Self {
        CartService { db }
    }

    /// Adds an offer to the caller's cart, merging with an existing line.
    pub async fn add(
        &self,
        caller: &Caller,
        offer_id: &str,
        quantity: Option<i64>,
    ) -> ServiceResult<CartLine> {
        let quantity = quantity.unwrap_or(DEFAULT_CART_QUANTITY);
        validate_id("offer_id", offer_id)?;
        validate_quantity(quantity)?;

        debug!(user_id = %caller.user_id, offer_id = %offer_id, quantity, "add_to_cart");

        let mut tx = self.db.begin().await?;

        let upsert = CartRepository::upsert(&mut tx, &caller.user_id, offer_id, quantity)
            .await?
            .ok_or_else(|| CoreError::not_found("Offer", offer_id))?;

        if quantity > upsert.stock {
            warn!(offer_id = %offer_id, stock = upsert.stock, requested = quantity, "Cart add rejected");
            return Err(CoreError::conflict(REQUESTED_EXCEEDS_STOCK).into());
        }
        if upsert.line.quantity > upsert.stock {
            warn!(offer_id = %offer_id, stock = upsert.stock, total = upsert.line.quantity, "Cart add rejected");
            return Err(CoreError::conflict(TOTAL_EXCEEDS_STOCK).into());
        }

        commit(tx).await?;

        info!(line_id = %upsert.line.id, offer_id = %offer_id, quantity = upsert.line.quantity, "Cart line saved");
        Ok(upsert.line)
    }

    /// Sets the quantity of one of the caller's lines.
    ///
    /// Another user's line is reported as `NOT_FOUND`.
    pub async fn update(&self, caller: &Caller, line_id: &str, quantity: i64) -> ServiceResult<CartLine> {
        validate_quantity(quantity)?;

        let mut tx = self.db.begin().await?;

        let line = CartRepository::update_quantity(&mut tx, line_id, &caller.user_id, quantity)
            .await?
            .ok_or_else(|| CoreError::not_found("Cart item", line_id))?;

        let stock = InventoryLedger::available_stock(&mut tx, &line.offer_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Offer", line.offer_id.as_str()))?;

        if quantity > stock {
            warn!(line_id = %line_id, stock, requested = quantity, "Cart update rejected");
            return Err(CoreError::conflict(REQUESTED_EXCEEDS_STOCK).into());
        }

        commit(tx).await?;

        info!(line_id = %line_id, quantity, "Cart line updated");
        Ok(line)
    }

    /// Removes one of the caller's lines.
    pub async fn remove(&self, caller: &Caller, line_id: &str) -> ServiceResult<()> {
        let mut conn = self.db.acquire().await?;
        CartRepository::remove(&mut conn, line_id, &caller.user_id).await?;

        info!(line_id = %line_id, "Cart line removed");
        Ok(())
    }

    /// Empties the caller's cart and returns how many lines were removed.
    pub async fn clear(&self, caller: &Caller) -> ServiceResult<u64> {
        let mut conn = self.db.acquire().await?;
        let removed = CartRepository::clear(&mut conn, &caller.user_id).await?;

        info!(user_id = %caller.user_id, removed, "Cart cleared");
        Ok(removed)
    }

    /// The caller's cart with prices, stock and names.
    pub async fn list(&self, caller: &Caller) -> ServiceResult<Vec<CartLineView>> {
        let mut conn = self.db.acquire().await?;
        Ok(CartRepository::list_views(&mut conn, &caller.user_id).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
