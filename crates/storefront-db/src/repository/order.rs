//! # Order Repository
//!
//! Database operations for orders.
//!
//! ## Order Lifecycle (storage view)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. CREATE                                                             │
//! │     └── InventoryLedger::reserve()  (first statement of the unit)      │
//! │     └── insert() → Order { status: Pending }                           │
//! │                                                                         │
//! │  2. CHANGE STATUS                                                      │
//! │     └── claim()       → UPDATE ... RETURNING (takes the write lock)   │
//! │     └── set_status()                                                   │
//! │     └── InventoryLedger::release()   (user cancellation only)          │
//! │                                                                         │
//! │  3. DELETE (admin)                                                     │
//! │     └── delete()   payment and shipping rows cascade; stock untouched │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use storefront_core::{new_id, Order, OrderStatus};

const ORDER_COLUMNS: &str = "id, user_id, offer_id, quantity, status, created_at, updated_at";

/// Repository for order rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderRepository;

impl OrderRepository {
    /// Inserts a Pending order. The caller must have reserved the stock in
    /// the same unit of work.
    ///
    /// ## Errors
    /// [`DbError::NotFound`] for the user when the owner row is missing.
    pub async fn insert(
        conn: &mut SqliteConnection,
        user_id: &str,
        offer_id: &str,
        quantity: i64,
    ) -> DbResult<Order> {
        let now = Utc::now();
        let order = Order {
            id: new_id(),
            user_id: user_id.to_string(),
            offer_id: offer_id.to_string(),
            quantity,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %order.id, offer_id = %offer_id, quantity, "Inserting order");

        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, offer_id, quantity, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .bind(&order.offer_id)
        .bind(order.quantity)
        .bind(order.status)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| match DbError::from(e) {
            // the offer was just reserved, so the dangling reference is the user
            DbError::ForeignKeyViolation { .. } => DbError::not_found("User", user_id),
            other => other,
        })?;

        Ok(order)
    }

    /// Takes the write lock on an order row and returns it.
    ///
    /// This is the SQLite counterpart of `SELECT ... FOR UPDATE`: once it
    /// returns, no other unit of work can change the order until this one
    /// ends. `None` if the order does not exist.
    pub async fn claim(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Order>> {
        debug!(id = %id, "Claiming order");

        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET updated_at = ?1 WHERE id = ?2 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(order)
    }

    /// Writes a new status.
    pub async fn set_status(
        conn: &mut SqliteConnection,
        id: &str,
        status: OrderStatus,
    ) -> DbResult<Order> {
        debug!(id = %id, status = %status, "Setting order status");

        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        order.ok_or_else(|| DbError::not_found("Order", id))
    }

    pub async fn get(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(order)
    }

    /// All orders, newest first.
    pub async fn list_all(conn: &mut SqliteConnection) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&mut *conn)
        .await?;
        Ok(orders)
    }

    /// One user's orders, newest first.
    pub async fn list_for_user(conn: &mut SqliteConnection, user_id: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(orders)
    }

    /// Removes an order. Its payment and shipping record go with it; its
    /// stock does not come back.
    pub async fn delete(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting order");

        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::fixtures;
    use crate::repository::inventory::InventoryLedger;
    use storefront_core::Role;

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let user = fixtures::user(&mut conn, Role::User).await;
        let offer = fixtures::offer(&mut conn, 1000, 5).await;

        let order = fixtures::order(&mut conn, &user.id, &offer.id, 2).await;
        assert_eq!(order.status, OrderStatus::Pending);

        let found = OrderRepository::get(&mut conn, &order.id).await.unwrap().unwrap();
        assert_eq!(found.quantity, 2);
        assert_eq!(found.user_id, user.id);
    }

    #[tokio::test]
    async fn test_insert_for_unknown_user() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let offer = fixtures::offer(&mut conn, 1000, 5).await;

        let err = OrderRepository::insert(&mut conn, "ghost", &offer.id, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "User"));
    }

    #[tokio::test]
    async fn test_claim_and_set_status() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let user = fixtures::user(&mut conn, Role::User).await;
        let offer = fixtures::offer(&mut conn, 1000, 5).await;
        let order = fixtures::order(&mut conn, &user.id, &offer.id, 1).await;

        let claimed = OrderRepository::claim(&mut conn, &order.id).await.unwrap().unwrap();
        assert_eq!(claimed.id, order.id);
        assert!(OrderRepository::claim(&mut conn, "missing").await.unwrap().is_none());

        let shipped = OrderRepository::set_status(&mut conn, &order.id, OrderStatus::Shipped)
            .await
            .unwrap();
        assert_eq!(shipped.status, OrderStatus::Shipped);
    }

    #[tokio::test]
    async fn test_list_scoping() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let alice = fixtures::user(&mut conn, Role::User).await;
        let bob = fixtures::user(&mut conn, Role::User).await;
        let offer = fixtures::offer(&mut conn, 1000, 10).await;

        let first = fixtures::order(&mut conn, &alice.id, &offer.id, 1).await;
        let second = fixtures::order(&mut conn, &alice.id, &offer.id, 1).await;
        fixtures::order(&mut conn, &bob.id, &offer.id, 1).await;

        let mine = OrderRepository::list_for_user(&mut conn, &alice.id).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, second.id);
        assert_eq!(mine[1].id, first.id);

        assert_eq!(OrderRepository::list_all(&mut conn).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_delete_keeps_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let user = fixtures::user(&mut conn, Role::User).await;
        let offer = fixtures::offer(&mut conn, 1000, 5).await;
        let order = fixtures::order(&mut conn, &user.id, &offer.id, 3).await;

        OrderRepository::delete(&mut conn, &order.id).await.unwrap();
        assert!(OrderRepository::get(&mut conn, &order.id).await.unwrap().is_none());
        assert_eq!(
            InventoryLedger::available_stock(&mut conn, &offer.id).await.unwrap(),
            Some(2)
        );

        let err = OrderRepository::delete(&mut conn, &order.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
