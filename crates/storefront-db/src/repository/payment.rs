//! # Payment Repository
//!
//! Recorded payments, at most one per order (`UNIQUE(order_id)`).

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use storefront_core::{new_id, Payment, PaymentUpdate, PaymentView};

const PAYMENT_COLUMNS: &str = "id, order_id, amount_cents, method, paid_at";

/// Repository for payment rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentRepository;

impl PaymentRepository {
    /// Records a payment for an order.
    ///
    /// ## Errors
    /// [`DbError::UniqueViolation`] on `payments.order_id` when the order is
    /// already paid.
    pub async fn insert(
        conn: &mut SqliteConnection,
        order_id: &str,
        amount_cents: i64,
        method: &str,
    ) -> DbResult<Payment> {
        let payment = Payment {
            id: new_id(),
            order_id: order_id.to_string(),
            amount_cents,
            method: method.to_string(),
            paid_at: Utc::now(),
        };

        debug!(id = %payment.id, order_id = %order_id, amount = %payment.amount(), "Recording payment");

        sqlx::query(
            r#"
            INSERT INTO payments (id, order_id, amount_cents, method, paid_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.order_id)
        .bind(payment.amount_cents)
        .bind(&payment.method)
        .bind(payment.paid_at)
        .execute(&mut *conn)
        .await?;

        Ok(payment)
    }

    pub async fn get(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(payment)
    }

    pub async fn get_for_order(conn: &mut SqliteConnection, order_id: &str) -> DbResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE order_id = ?1"
        ))
        .bind(order_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(payment)
    }

    /// Every payment with the owner of its order, newest first.
    pub async fn list_views(conn: &mut SqliteConnection) -> DbResult<Vec<PaymentView>> {
        let payments = sqlx::query_as::<_, PaymentView>(
            r#"
            SELECT pay.id, pay.order_id, pay.amount_cents, pay.method, pay.paid_at,
                   u.id AS user_id, u.name AS user_name
              FROM payments pay
              JOIN orders o ON o.id = pay.order_id
              JOIN users u  ON u.id = o.user_id
             ORDER BY pay.paid_at DESC, pay.rowid DESC
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;
        Ok(payments)
    }

    /// Applies the present fields of `update`; `None` for an unknown id.
    pub async fn update(
        conn: &mut SqliteConnection,
        id: &str,
        update: &PaymentUpdate,
    ) -> DbResult<Option<Payment>> {
        debug!(id = %id, "Updating payment");

        let payment = sqlx::query_as::<_, Payment>(&format!(
            r#"
            UPDATE payments
               SET amount_cents = COALESCE(?1, amount_cents),
                   method = COALESCE(?2, method)
             WHERE id = ?3
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(update.amount_cents)
        .bind(&update.method)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(payment)
    }

    pub async fn delete(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting payment");

        let result = sqlx::query("DELETE FROM payments WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Payment", id));
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
