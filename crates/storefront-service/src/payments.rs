//! # Payment Service
//!
//! One recorded payment per order. A payment is a fact the storefront is
//! told about; no gateway is involved.
//!
//! Creating one claims the order row first, so two concurrent payments for
//! the same order serialize and the second sees the first. The
//! `UNIQUE(order_id)` constraint backs this up.

use storefront_core::access::{require, Scope};
use storefront_core::validation::{validate_id, validate_payment_amount, validate_payment_method};
use storefront_core::{Caller, CoreError, Payment, PaymentUpdate, PaymentView};
use storefront_db::{Database, OrderRepository, PaymentRepository};
use tracing::{debug, info, warn};

use crate::commit;
use crate::error::{ServiceError, ServiceResult};

const ALREADY_PAID: &str = "Payment has already been made for this order";
const ADMINS_ONLY: &str = "Admins only!";

/// Payment operations. Obtained from [`crate::Storefront::payments`].
#[derive(Debug, Clone, Copy)]
pub struct PaymentService<'a> {
    db: &'a Database,
}

impl<'a> PaymentService<'a> {
    pub fn new(db: &'a Database) -> Self {
        PaymentService { db }
    }

    /// Records the caller's payment for their own order.
    ///
    /// ## Errors
    /// - `VALIDATION_ERROR` for a non-positive amount or empty method
    /// - `NOT_FOUND` if the order does not exist
    /// - `FORBIDDEN` if the order belongs to someone else (administrators
    ///   included)
    /// - `CONFLICT` if the order is already paid
    pub async fn create(
        &self,
        caller: &Caller,
        order_id: &str,
        amount_cents: i64,
        method: &str,
    ) -> ServiceResult<Payment> {
        validate_id("order_id", order_id)?;
        validate_payment_amount(amount_cents)?;
        let method = validate_payment_method(method)?;

        debug!(order_id = %order_id, amount_cents, method = %method, "create_payment");

        let mut tx = self.db.begin().await?;

        let order = OrderRepository::claim(&mut tx, order_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Order", order_id))?;

        if !caller.owns(&order.user_id) {
            warn!(order_id = %order_id, user_id = %caller.user_id, "Payment rejected: not the owner");
            return Err(CoreError::forbidden("You can only pay for your own orders").into());
        }

        if PaymentRepository::get_for_order(&mut tx, order_id).await?.is_some() {
            warn!(order_id = %order_id, "Payment rejected: already paid");
            return Err(CoreError::conflict(ALREADY_PAID).into());
        }

        let payment = PaymentRepository::insert(&mut tx, order_id, amount_cents, &method)
            .await
            .map_err(|e| {
                if e.is_unique_violation_on("payments.order_id") {
                    ServiceError::conflict(ALREADY_PAID)
                } else {
                    ServiceError::from(e)
                }
            })?;

        commit(tx).await?;

        info!(payment_id = %payment.id, order_id = %order_id, amount = %payment.amount(), "Payment recorded");
        Ok(payment)
    }

    /// The payment of an order; its owner or an administrator only.
    pub async fn get_for_order(&self, caller: &Caller, order_id: &str) -> ServiceResult<Payment> {
        let mut conn = self.db.acquire().await?;

        let order = OrderRepository::get(&mut conn, order_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Order", order_id))?;

        require(
            caller,
            Scope::Personal(&order.user_id),
            "You can only view your own payments",
        )?;

        let payment = PaymentRepository::get_for_order(&mut conn, order_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Payment", order_id))?;
        Ok(payment)
    }

    /// Every payment with its order's owner, newest first. Administrators
    /// only.
    pub async fn list_all(&self, caller: &Caller) -> ServiceResult<Vec<PaymentView>> {
        require(caller, Scope::AdminOnly, ADMINS_ONLY)?;

        let mut conn = self.db.acquire().await?;
        Ok(PaymentRepository::list_views(&mut conn).await?)
    }

    /// Corrects a payment's amount or method. Administrators only.
    pub async fn update(
        &self,
        caller: &Caller,
        payment_id: &str,
        update: PaymentUpdate,
    ) -> ServiceResult<Payment> {
        require(caller, Scope::AdminOnly, ADMINS_ONLY)?;
        let update = update.validated()?;

        let mut conn = self.db.acquire().await?;
        let payment = PaymentRepository::update(&mut conn, payment_id, &update)
            .await?
            .ok_or_else(|| CoreError::not_found("Payment", payment_id))?;

        info!(payment_id = %payment_id, "Payment updated");
        Ok(payment)
    }

    /// Administrators only.
    pub async fn delete(&self, caller: &Caller, payment_id: &str) -> ServiceResult<()> {
        require(caller, Scope::AdminOnly, ADMINS_ONLY)?;

        let mut conn = self.db.acquire().await?;
        PaymentRepository::delete(&mut conn, payment_id).await?;

        info!(payment_id = %payment_id, "Payment deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::error::ErrorCode;
    use crate::testing;
    use storefront_core::{PaymentUpdate, Role};

    #[tokio::test]
    async fn test_one_payment_per_order() {
        let store = testing::store().await;
        let (_, admin) = testing::user(&store, Role::Admin).await;
        let (_, user) = testing::user(&store, Role::User).await;
        let offer = testing::offer(&store, &admin, 1200, 5).await;
        let order = store.orders().create(&user, &offer.id, 1).await.unwrap();

        let payment = store
            .payments()
            .create(&user, &order.id, 1200, " card ")
            .await
            .unwrap();
        assert_eq!(payment.method, "card");

        let err = store
            .payments()
            .create(&user, &order.id, 1200, "card")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(err.message, "Payment has already been made for this order");
    }

    #[tokio::test]
    async fn test_create_checks_input_order_and_owner() {
        let store = testing::store().await;
        let (_, admin) = testing::user(&store, Role::Admin).await;
        let (_, owner) = testing::user(&store, Role::User).await;
        let (_, stranger) = testing::user(&store, Role::User).await;
        let offer = testing::offer(&store, &admin, 1200, 5).await;
        let order = store.orders().create(&owner, &offer.id, 1).await.unwrap();

        let err = store.payments().create(&owner, &order.id, 0, "card").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        let err = store.payments().create(&owner, &order.id, 100, "  ").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = store.payments().create(&owner, "missing", 100, "card").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = store.payments().create(&stranger, &order.id, 100, "card").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        let err = store.payments().create(&admin, &order.id, 100, "card").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_get_for_order_visibility() {
        let store = testing::store().await;
        let (_, admin) = testing::user(&store, Role::Admin).await;
        let (_, owner) = testing::user(&store, Role::User).await;
        let (_, stranger) = testing::user(&store, Role::User).await;
        let offer = testing::offer(&store, &admin, 1200, 5).await;
        let order = store.orders().create(&owner, &offer.id, 1).await.unwrap();

        let err = store.payments().get_for_order(&owner, &order.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        store.payments().create(&owner, &order.id, 1200, "cash").await.unwrap();

        assert!(store.payments().get_for_order(&owner, &order.id).await.is_ok());
        assert!(store.payments().get_for_order(&admin, &order.id).await.is_ok());
        let err = store.payments().get_for_order(&stranger, &order.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_admin_list_update_delete() {
        let store = testing::store().await;
        let (_, admin) = testing::user(&store, Role::Admin).await;
        let (owner_row, owner) = testing::user(&store, Role::User).await;
        let offer = testing::offer(&store, &admin, 1200, 5).await;
        let order = store.orders().create(&owner, &offer.id, 1).await.unwrap();
        let payment = store.payments().create(&owner, &order.id, 1200, "card").await.unwrap();

        let err = store.payments().list_all(&owner).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        let views = store.payments().list_all(&admin).await.unwrap();
        assert_eq!(views[0].user_id, owner_row.id);

        let err = store
            .payments()
            .update(&admin, &payment.id, PaymentUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let updated = store
            .payments()
            .update(
                &admin,
                &payment.id,
                PaymentUpdate {
                    amount_cents: Some(1100),
                    method: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.amount_cents, 1100);
        assert_eq!(updated.method, "card");

        let err = store.payments().delete(&owner, &payment.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        store.payments().delete(&admin, &payment.id).await.unwrap();
        let err = store.payments().delete(&admin, &payment.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
