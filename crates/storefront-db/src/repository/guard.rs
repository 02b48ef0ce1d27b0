//! # Referential Guard
//!
//! Reference counts checked before a delete, inside the delete's own unit
//! of work.
//!
//! ## Guarded Deletes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Deleting      │ Blocked while referenced by                            │
//! │  ──────────────┼─────────────────────────────────────────────────────── │
//! │  Address       │ shipping_records.address_id                            │
//! │  Offer         │ orders.offer_id                                        │
//! │  Manufacturer  │ offers.manufacturer_id                                 │
//! │  Product       │ offers.product_id                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//!
//!   BEGIN
//!     claim row          (UPDATE ... RETURNING, takes the write lock)
//!     COUNT references   ← THIS MODULE
//!     count > 0 ? rollback (conflict) : DELETE
//!   COMMIT
//! ```
//! Because the row is claimed first, no other writer can add a reference
//! between the count and the delete. The ON DELETE RESTRICT foreign keys
//! back this up at the storage level.

use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;

/// Pre-delete reference counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferentialGuard;

impl ReferentialGuard {
    /// Shipping records pointing at an address.
    pub async fn address_references(conn: &mut SqliteConnection, address_id: &str) -> DbResult<i64> {
        Self::count(
            conn,
            "SELECT COUNT(*) FROM shipping_records WHERE address_id = ?1",
            address_id,
        )
        .await
    }

    /// Orders placed against an offer.
    pub async fn offer_references(conn: &mut SqliteConnection, offer_id: &str) -> DbResult<i64> {
        Self::count(conn, "SELECT COUNT(*) FROM orders WHERE offer_id = ?1", offer_id).await
    }

    /// Offers sold by a manufacturer.
    pub async fn manufacturer_references(
        conn: &mut SqliteConnection,
        manufacturer_id: &str,
    ) -> DbResult<i64> {
        Self::count(
            conn,
            "SELECT COUNT(*) FROM offers WHERE manufacturer_id = ?1",
            manufacturer_id,
        )
        .await
    }

    /// Offers of a product.
    pub async fn product_references(conn: &mut SqliteConnection, product_id: &str) -> DbResult<i64> {
        Self::count(conn, "SELECT COUNT(*) FROM offers WHERE product_id = ?1", product_id).await
    }

    async fn count(conn: &mut SqliteConnection, sql: &'static str, id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(sql)
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;
        debug!(id = %id, count, "Reference count");
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use crate::repository::address::AddressRepository;
    use crate::repository::catalog::CatalogRepository;
    use crate::repository::fixtures;
    use crate::repository::shipping::ShippingRepository;
    use storefront_core::{NewShipping, Role};

    #[tokio::test]
    async fn test_offer_and_manufacturer_references() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let user = fixtures::user(&mut conn, Role::User).await;
        let offer = fixtures::offer(&mut conn, 1000, 5).await;

        assert_eq!(ReferentialGuard::offer_references(&mut conn, &offer.id).await.unwrap(), 0);
        assert_eq!(
            ReferentialGuard::manufacturer_references(&mut conn, &offer.manufacturer_id)
                .await
                .unwrap(),
            1
        );

        assert_eq!(
            ReferentialGuard::product_references(&mut conn, &offer.product_id)
                .await
                .unwrap(),
            1
        );

        fixtures::order(&mut conn, &user.id, &offer.id, 1).await;
        assert_eq!(ReferentialGuard::offer_references(&mut conn, &offer.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_address_references_and_restrict_backstop() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let user = fixtures::user(&mut conn, Role::User).await;
        let offer = fixtures::offer(&mut conn, 1000, 5).await;
        let order = fixtures::order(&mut conn, &user.id, &offer.id, 1).await;
        let address = fixtures::address(&mut conn, &user.id).await;

        ShippingRepository::insert(
            &mut conn,
            &NewShipping {
                order_id: order.id.clone(),
                address_id: address.id.clone(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(
            ReferentialGuard::address_references(&mut conn, &address.id).await.unwrap(),
            1
        );

        // the foreign key refuses even if the guard were skipped
        let err = AddressRepository::delete(&mut conn, &address.id).await.unwrap_err();
        assert!(err.is_foreign_key_violation());
        let err = CatalogRepository::delete_offer(&mut conn, &offer.id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
