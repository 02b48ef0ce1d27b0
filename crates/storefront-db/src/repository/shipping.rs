//! # Shipping Repository
//!
//! Shipping records, at most one per order (`UNIQUE(order_id)`). The record's
//! `status` is free text and has nothing to do with the order's status.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use storefront_core::{new_id, NewShipping, ShippingRecord, ShippingUpdate, ShippingView, DEFAULT_SHIPPING_STATUS};

const SHIPPING_COLUMNS: &str =
    "id, order_id, address_id, shipping_date, estimated_delivery, status, created_at, updated_at";

const SHIPPING_VIEW_SELECT: &str = r#"
    SELECT s.id, s.order_id, s.address_id, s.shipping_date, s.estimated_delivery, s.status,
           a.country, a.city, a.zip_code, a.address_line,
           u.id AS user_id, u.name AS user_name
      FROM shipping_records s
      JOIN addresses a ON a.id = s.address_id
      JOIN orders o    ON o.id = s.order_id
      JOIN users u     ON u.id = o.user_id
"#;

/// Repository for shipping records.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShippingRepository;

impl ShippingRepository {
    /// Inserts a shipping record. `input` must already be validated and the
    /// order and address checked to exist.
    ///
    /// ## Errors
    /// [`DbError::UniqueViolation`] on `shipping_records.order_id` when the
    /// order already has one.
    pub async fn insert(conn: &mut SqliteConnection, input: &NewShipping) -> DbResult<ShippingRecord> {
        let now = Utc::now();
        let record = ShippingRecord {
            id: new_id(),
            order_id: input.order_id.clone(),
            address_id: input.address_id.clone(),
            shipping_date: input.shipping_date,
            estimated_delivery: input.estimated_delivery,
            status: input
                .status
                .clone()
                .unwrap_or_else(|| DEFAULT_SHIPPING_STATUS.to_string()),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %record.id, order_id = %record.order_id, "Inserting shipping record");

        sqlx::query(
            r#"
            INSERT INTO shipping_records
                (id, order_id, address_id, shipping_date, estimated_delivery, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&record.id)
        .bind(&record.order_id)
        .bind(&record.address_id)
        .bind(record.shipping_date)
        .bind(record.estimated_delivery)
        .bind(&record.status)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(record)
    }

    pub async fn get(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<ShippingRecord>> {
        let record = sqlx::query_as::<_, ShippingRecord>(&format!(
            "SELECT {SHIPPING_COLUMNS} FROM shipping_records WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(record)
    }

    /// Whether the order already has a shipping record.
    pub async fn exists_for_order(conn: &mut SqliteConnection, order_id: &str) -> DbResult<bool> {
        let found: Option<String> =
            sqlx::query_scalar("SELECT id FROM shipping_records WHERE order_id = ?1")
                .bind(order_id)
                .fetch_optional(&mut *conn)
                .await?;
        Ok(found.is_some())
    }

    /// The order's shipping record joined with its address.
    pub async fn get_view_for_order(
        conn: &mut SqliteConnection,
        order_id: &str,
    ) -> DbResult<Option<ShippingView>> {
        let view = sqlx::query_as::<_, ShippingView>(&format!(
            "{SHIPPING_VIEW_SELECT} WHERE s.order_id = ?1"
        ))
        .bind(order_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(view)
    }

    /// Every shipping record, latest shipping date first (undated last).
    pub async fn list_views(conn: &mut SqliteConnection) -> DbResult<Vec<ShippingView>> {
        let views = sqlx::query_as::<_, ShippingView>(&format!(
            "{SHIPPING_VIEW_SELECT} ORDER BY s.shipping_date IS NULL, s.shipping_date DESC, s.created_at DESC"
        ))
        .fetch_all(&mut *conn)
        .await?;
        Ok(views)
    }

    /// Applies the present fields of `update`; `None` for an unknown id.
    pub async fn update(
        conn: &mut SqliteConnection,
        id: &str,
        update: &ShippingUpdate,
    ) -> DbResult<Option<ShippingRecord>> {
        debug!(id = %id, "Updating shipping record");

        let record = sqlx::query_as::<_, ShippingRecord>(&format!(
            r#"
            UPDATE shipping_records
               SET shipping_date = COALESCE(?1, shipping_date),
                   estimated_delivery = COALESCE(?2, estimated_delivery),
                   status = COALESCE(?3, status),
                   updated_at = ?4
             WHERE id = ?5
            RETURNING {SHIPPING_COLUMNS}
            "#
        ))
        .bind(update.shipping_date)
        .bind(update.estimated_delivery)
        .bind(&update.status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(record)
    }

    pub async fn delete(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting shipping record");

        let result = sqlx::query("DELETE FROM shipping_records WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Shipping record", id));
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
    use chrono::NaiveDate;
    use storefront_core::Role;

    fn new_shipping(order_id: &str, address_id: &str, date: Option<NaiveDate>) -> NewShipping {
        NewShipping {
            order_id: order_id.to_string(),
            address_id: address_id.to_string(),
            shipping_date: date,
            estimated_delivery: None,
            status: None,
        }
    }

    #[tokio::test]
    async fn test_insert_defaults_status_and_rejects_second_record() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let user = fixtures::user(&mut conn, Role::User).await;
        let offer = fixtures::offer(&mut conn, 1000, 5).await;
        let order = fixtures::order(&mut conn, &user.id, &offer.id, 1).await;
        let address = fixtures::address(&mut conn, &user.id).await;

        let record = ShippingRepository::insert(&mut conn, &new_shipping(&order.id, &address.id, None))
            .await
            .unwrap();
        assert_eq!(record.status, "Pending");
        assert!(ShippingRepository::exists_for_order(&mut conn, &order.id).await.unwrap());

        let err = ShippingRepository::insert(&mut conn, &new_shipping(&order.id, &address.id, None))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation_on("shipping_records.order_id"));
    }

    #[tokio::test]
    async fn test_view_joins_address_and_owner() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let user = fixtures::user(&mut conn, Role::User).await;
        let offer = fixtures::offer(&mut conn, 1000, 5).await;
        let order = fixtures::order(&mut conn, &user.id, &offer.id, 1).await;
        let address = fixtures::address(&mut conn, &user.id).await;
        let date = NaiveDate::from_ymd_opt(2024, 3, 1);

        ShippingRepository::insert(&mut conn, &new_shipping(&order.id, &address.id, date))
            .await
            .unwrap();

        let view = ShippingRepository::get_view_for_order(&mut conn, &order.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(view.city, "Berlin");
        assert_eq!(view.user_id, user.id);
        assert_eq!(view.shipping_date, date);
    }

    #[tokio::test]
    async fn test_list_orders_by_shipping_date_desc() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let user = fixtures::user(&mut conn, Role::User).await;
        let offer = fixtures::offer(&mut conn, 1000, 5).await;
        let address = fixtures::address(&mut conn, &user.id).await;
        let early = fixtures::order(&mut conn, &user.id, &offer.id, 1).await;
        let late = fixtures::order(&mut conn, &user.id, &offer.id, 1).await;

        ShippingRepository::insert(
            &mut conn,
            &new_shipping(&early.id, &address.id, NaiveDate::from_ymd_opt(2024, 1, 1)),
        )
        .await
        .unwrap();
        ShippingRepository::insert(
            &mut conn,
            &new_shipping(&late.id, &address.id, NaiveDate::from_ymd_opt(2024, 6, 1)),
        )
        .await
        .unwrap();

        let views = ShippingRepository::list_views(&mut conn).await.unwrap();
        assert_eq!(views[0].order_id, late.id);
        assert_eq!(views[1].order_id, early.id);
    }

    #[tokio::test]
    async fn test_update_keeps_absent_fields() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let user = fixtures::user(&mut conn, Role::User).await;
        let offer = fixtures::offer(&mut conn, 1000, 5).await;
        let order = fixtures::order(&mut conn, &user.id, &offer.id, 1).await;
        let address = fixtures::address(&mut conn, &user.id).await;
        let date = NaiveDate::from_ymd_opt(2024, 3, 1);
        let record = ShippingRepository::insert(&mut conn, &new_shipping(&order.id, &address.id, date))
            .await
            .unwrap();

        let updated = ShippingRepository::update(
            &mut conn,
            &record.id,
            &ShippingUpdate {
                status: Some("In Transit".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.status, "In Transit");
        assert_eq!(updated.shipping_date, date);

        ShippingRepository::delete(&mut conn, &record.id).await.unwrap();
        assert!(ShippingRepository::get(&mut conn, &record.id).await.unwrap().is_none());
    }
}
