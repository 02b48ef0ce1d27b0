//! # Shipping Service
//!
//! One shipping record per order, managed by administrators. The record's
//! free-text status is separate from the order's status.

use storefront_core::access::{require, Scope};
use storefront_core::{Caller, CoreError, NewShipping, ShippingRecord, ShippingUpdate, ShippingView};
use storefront_db::{AddressRepository, Database, OrderRepository, ShippingRepository};
use tracing::{debug, info, warn};

use crate::commit;
use crate::error::{ServiceError, ServiceResult};

const ALREADY_SHIPPING: &str = "Shipping record already exists for this order";
const ADMINS_ONLY: &str = "Admins only!";

/// Shipping operations. Obtained from [`crate::Storefront::shipping`].
#[derive(Debug, Clone, Copy)]
pub struct ShippingService<'a> {
    db: &'a Database,
}

impl<'a> ShippingService<'a> {
    pub fn new(db: &'a Database) -> Self {
        ShippingService { db }
    }

    /// Creates the shipping record of an order. Administrators only.
    ///
    /// ## Errors
    /// - `NOT_FOUND` for an unknown order or address
    /// - `CONFLICT` if the order already has a record
    pub async fn create(&self, caller: &Caller, input: NewShipping) -> ServiceResult<ShippingRecord> {
        require(caller, Scope::AdminOnly, ADMINS_ONLY)?;
        let input = input.validated()?;

        debug!(order_id = %input.order_id, address_id = %input.address_id, "create_shipping");

        let mut tx = self.db.begin().await?;

        OrderRepository::claim(&mut tx, &input.order_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Order", input.order_id.as_str()))?;

        if AddressRepository::get(&mut tx, &input.address_id).await?.is_none() {
            return Err(CoreError::not_found("Address", input.address_id.as_str()).into());
        }

        if ShippingRepository::exists_for_order(&mut tx, &input.order_id).await? {
            warn!(order_id = %input.order_id, "Shipping rejected: record exists");
            return Err(CoreError::conflict(ALREADY_SHIPPING).into());
        }

        let record = ShippingRepository::insert(&mut tx, &input)
            .await
            .map_err(|e| {
                if e.is_unique_violation_on("shipping_records.order_id") {
                    ServiceError::conflict(ALREADY_SHIPPING)
                } else {
                    ServiceError::from(e)
                }
            })?;

        commit(tx).await?;

        info!(shipping_id = %record.id, order_id = %record.order_id, status = %record.status, "Shipping record created");
        Ok(record)
    }

    /// The shipping record of an order with its address; the order's owner
    /// or an administrator only.
    pub async fn get_for_order(&self, caller: &Caller, order_id: &str) -> ServiceResult<ShippingView> {
        let mut conn = self.db.acquire().await?;

        let order = OrderRepository::get(&mut conn, order_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Order", order_id))?;

        require(
            caller,
            Scope::Personal(&order.user_id),
            "You can only view shipping details for your own orders",
        )?;

        let view = ShippingRepository::get_view_for_order(&mut conn, order_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Shipping record", order_id))?;
        Ok(view)
    }

    /// Every shipping record, latest shipping date first. Administrators
    /// only.
    pub async fn list_all(&self, caller: &Caller) -> ServiceResult<Vec<ShippingView>> {
        require(caller, Scope::AdminOnly, ADMINS_ONLY)?;

        let mut conn = self.db.acquire().await?;
        Ok(ShippingRepository::list_views(&mut conn).await?)
    }

    /// Administrators only; at least one field must be present.
    pub async fn update(
        &self,
        caller: &Caller,
        shipping_id: &str,
        update: ShippingUpdate,
    ) -> ServiceResult<ShippingRecord> {
        require(caller, Scope::AdminOnly, ADMINS_ONLY)?;
        let update = update.validated()?;

        let mut conn = self.db.acquire().await?;
        let record = ShippingRepository::update(&mut conn, shipping_id, &update)
            .await?
            .ok_or_else(|| CoreError::not_found("Shipping record", shipping_id))?;

        info!(shipping_id = %shipping_id, status = %record.status, "Shipping record updated");
        Ok(record)
    }

    /// Administrators only.
    pub async fn delete(&self, caller: &Caller, shipping_id: &str) -> ServiceResult<()> {
        require(caller, Scope::AdminOnly, ADMINS_ONLY)?;

        let mut conn = self.db.acquire().await?;
        ShippingRepository::delete(&mut conn, shipping_id).await?;

        info!(shipping_id = %shipping_id, "Shipping record deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
