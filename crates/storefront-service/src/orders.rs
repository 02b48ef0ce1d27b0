//! # Order Service
//!
//! Order creation against finite stock, the status state machine, and
//! administrative removal.
//!
//! ## Create
//! ```text
//! validate quantity > 0              (no transaction yet)
//! BEGIN
//!   reserve: UPDATE offers SET stock = stock - q WHERE id = ? AND stock >= q
//!     ├─ no offer        → rollback, NOT_FOUND
//!     ├─ stock < q       → rollback, CONFLICT
//!     └─ reserved
//!   INSERT order (Pending)
//! COMMIT
//! ```
//! The reserve is the first statement of the transaction, so two creates
//! racing for the last unit serialize on SQLite's write lock and the loser
//! sees the decremented stock.
//!
//! ## Status Change
//! ```text
//! parse status                       (VALIDATION_ERROR on unknown value)
//! BEGIN
//!   claim order row                  (NOT_FOUND)
//!   decide_transition(caller, ...)   (FORBIDDEN)
//!   UPDATE status
//!   user cancel? → release order.quantity back to the offer
//! COMMIT
//! ```

use storefront_core::access::{require, Scope};
use storefront_core::lifecycle::decide_transition;
use storefront_core::validation::{validate_id, validate_quantity};
use storefront_core::{Caller, CoreError, Order, OrderStatus};
use storefront_db::{Database, InventoryLedger, OrderRepository, ReserveOutcome};
use tracing::{debug, info, warn};

use crate::commit;
use crate::error::ServiceResult;

/// Order operations. Obtained from [`crate::Storefront::orders`].
#[derive(Debug, Clone, Copy)]
pub struct OrderService<'a> {
    db: &'a Database,
}

impl<'a> OrderService<'a> {
    pub fn new(db: &'a Database) -> Self {
        OrderService { db }
    }

    /// Places an order for `quantity` units of an offer on behalf of the
    /// caller.
    ///
    /// ## Errors
    /// - `VALIDATION_ERROR` if `quantity <= 0`
    /// - `NOT_FOUND` if the offer (or the caller's user row) does not exist
    /// - `CONFLICT` if the offer holds fewer than `quantity` units
    pub async fn create(&self, caller: &Caller, offer_id: &str, quantity: i64) -> ServiceResult<Order> {
        validate_id("offer_id", offer_id)?;
        validate_quantity(quantity)?;

        debug!(user_id = %caller.user_id, offer_id = %offer_id, quantity, "create_order");

        let mut tx = self.db.begin().await?;

        match InventoryLedger::reserve(&mut tx, offer_id, quantity).await? {
            ReserveOutcome::Reserved { remaining } => {
                debug!(offer_id = %offer_id, remaining, "Stock reserved");
            }
            ReserveOutcome::InsufficientStock { available } => {
                warn!(offer_id = %offer_id, available, requested = quantity, "Order rejected: insufficient stock");
                return Err(CoreError::InsufficientStock {
                    offer_id: offer_id.to_string(),
                    available,
                    requested: quantity,
                }
                .into());
            }
            ReserveOutcome::NotFound => {
                return Err(CoreError::not_found("Offer", offer_id).into());
            }
        }

        let order = OrderRepository::insert(&mut tx, &caller.user_id, offer_id, quantity).await?;
        commit(tx).await?;

        info!(order_id = %order.id, offer_id = %offer_id, quantity, user_id = %caller.user_id, "Order created");
        Ok(order)
    }

    /// Moves an order to `status`, spelled exactly as [`OrderStatus::as_str`].
    ///
    /// Administrators may set any status with no stock effect. A user may
    /// only cancel their own Pending or Processing order, which returns the
    /// order's quantity to the offer.
    pub async fn set_status(&self, caller: &Caller, order_id: &str, status: &str) -> ServiceResult<Order> {
        let requested: OrderStatus = status.parse()?;

        debug!(order_id = %order_id, status = %requested, role = %caller.role, "set_order_status");

        let mut tx = self.db.begin().await?;

        let order = OrderRepository::claim(&mut tx, order_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Order", order_id))?;

        let transition = decide_transition(caller, &order.user_id, order.status, requested)
            .map_err(|e| {
                warn!(order_id = %order_id, current = %order.status, requested = %requested, error = %e, "Status change rejected");
                e
            })?;

        let updated = OrderRepository::set_status(&mut tx, &order.id, transition.target()).await?;

        if transition.releases_stock() {
            let stock = InventoryLedger::release(&mut tx, &order.offer_id, order.quantity).await?;
            debug!(offer_id = %order.offer_id, released = order.quantity, stock, "Stock released");
        }

        commit(tx).await?;

        info!(
            order_id = %order_id,
            from = %order.status,
            to = %updated.status,
            released = transition.releases_stock(),
            "Order status changed"
        );
        Ok(updated)
    }

    /// One order; its owner or an administrator only.
    pub async fn get(&self, caller: &Caller, order_id: &str) -> ServiceResult<Order> {
        let mut conn = self.db.acquire().await?;

        let order = OrderRepository::get(&mut conn, order_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Order", order_id))?;

        require(
            caller,
            Scope::Personal(&order.user_id),
            "You can only view your own orders",
        )?;
        Ok(order)
    }

    /// Every order for an administrator, the caller's own otherwise. Newest
    /// first.
    pub async fn list(&self, caller: &Caller) -> ServiceResult<Vec<Order>> {
        let mut conn = self.db.acquire().await?;

        let orders = if caller.is_admin() {
            OrderRepository::list_all(&mut conn).await?
        } else {
            OrderRepository::list_for_user(&mut conn, &caller.user_id).await?
        };
        Ok(orders)
    }

    /// Removes an order together with its payment and shipping record.
    /// Administrators only. Stock is not restored.
    pub async fn delete(&self, caller: &Caller, order_id: &str) -> ServiceResult<()> {
        require(caller, Scope::AdminOnly, "Admins only!")?;

        let mut conn = self.db.acquire().await?;
        OrderRepository::delete(&mut conn, order_id).await?;

        info!(order_id = %order_id, "Order deleted");
        Ok(())
    }

    /// Whether the offer exists and could supply `quantity` units right now.
    /// Nothing is held.
    pub async fn check_availability(&self, offer_id: &str, quantity: i64) -> ServiceResult<bool> {
        validate_quantity(quantity)?;

        let mut conn = self.db.acquire().await?;
        Ok(InventoryLedger::check_available(&mut conn, offer_id, quantity).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
