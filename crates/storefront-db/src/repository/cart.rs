//! # Cart Repository
//!
//! Staged cart lines. Nothing here touches offer stock; the stock is only
//! read so the service can refuse quantities the offer could not cover.
//!
//! ## Add = Merging Upsert
//! ```text
//! INSERT INTO cart_lines (...) SELECT ... WHERE EXISTS (offer)
//! ON CONFLICT (user_id, offer_id)
//!   DO UPDATE SET quantity = quantity + excluded.quantity
//! RETURNING ...
//!       │
//!       ├── no row returned → offer does not exist
//!       └── row returned    → merged line + current offer stock
//! ```
//! The upsert runs first so the unit of work holds the write lock before the
//! stock is read; the service rolls back when the merged total is too large.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use storefront_core::{new_id, CartLine, CartLineView};

const LINE_COLUMNS: &str = "id, user_id, offer_id, quantity, created_at, updated_at";

/// Result of [`CartRepository::upsert`]: the merged line and the stock of
/// its offer at that moment.
#[derive(Debug, Clone)]
pub struct CartUpsert {
    pub line: CartLine,
    pub stock: i64,
}

/// Repository for cart lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct CartRepository;

impl CartRepository {
    /// Adds `quantity` of an offer to a user's cart, merging into an existing
    /// line. `None` when the offer does not exist.
    pub async fn upsert(
        conn: &mut SqliteConnection,
        user_id: &str,
        offer_id: &str,
        quantity: i64,
    ) -> DbResult<Option<CartUpsert>> {
        debug!(user_id = %user_id, offer_id = %offer_id, quantity, "Upserting cart line");

        let now = Utc::now();
        let line = sqlx::query_as::<_, CartLine>(&format!(
            r#"
            INSERT INTO cart_lines (id, user_id, offer_id, quantity, created_at, updated_at)
            SELECT ?1, ?2, ?3, ?4, ?5, ?5
             WHERE EXISTS (SELECT 1 FROM offers WHERE id = ?3)
            ON CONFLICT (user_id, offer_id) DO UPDATE
               SET quantity = quantity + excluded.quantity,
                   updated_at = excluded.updated_at
            RETURNING {LINE_COLUMNS}
            "#
        ))
        .bind(new_id())
        .bind(user_id)
        .bind(offer_id)
        .bind(quantity)
        .bind(now)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::ForeignKeyViolation { .. } => DbError::not_found("User", user_id),
            other => other,
        })?;

        let Some(line) = line else {
            return Ok(None);
        };

        let stock: i64 = sqlx::query_scalar("SELECT stock FROM offers WHERE id = ?1")
            .bind(offer_id)
            .fetch_one(&mut *conn)
            .await?;

        Ok(Some(CartUpsert { line, stock }))
    }

    /// Sets the quantity of one of the user's lines. `None` if the line does
    /// not exist or belongs to someone else.
    pub async fn update_quantity(
        conn: &mut SqliteConnection,
        line_id: &str,
        user_id: &str,
        quantity: i64,
    ) -> DbResult<Option<CartLine>> {
        debug!(id = %line_id, quantity, "Updating cart line");

        let line = sqlx::query_as::<_, CartLine>(&format!(
            r#"
            UPDATE cart_lines
               SET quantity = ?1, updated_at = ?2
             WHERE id = ?3 AND user_id = ?4
            RETURNING {LINE_COLUMNS}
            "#
        ))
        .bind(quantity)
        .bind(Utc::now())
        .bind(line_id)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(line)
    }

    pub async fn get(
        conn: &mut SqliteConnection,
        line_id: &str,
        user_id: &str,
    ) -> DbResult<Option<CartLine>> {
        let line = sqlx::query_as::<_, CartLine>(&format!(
            "SELECT {LINE_COLUMNS} FROM cart_lines WHERE id = ?1 AND user_id = ?2"
        ))
        .bind(line_id)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(line)
    }

    /// Removes one of the user's lines.
    pub async fn remove(conn: &mut SqliteConnection, line_id: &str, user_id: &str) -> DbResult<()> {
        debug!(id = %line_id, "Removing cart line");

        let result = sqlx::query("DELETE FROM cart_lines WHERE id = ?1 AND user_id = ?2")
            .bind(line_id)
            .bind(user_id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart item", line_id));
        }
        Ok(())
    }

    /// Empties a user's cart; returns how many lines were removed.
    pub async fn clear(conn: &mut SqliteConnection, user_id: &str) -> DbResult<u64> {
        debug!(user_id = %user_id, "Clearing cart");

        let result = sqlx::query("DELETE FROM cart_lines WHERE user_id = ?1")
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// A user's cart joined with offer price, stock and names.
    pub async fn list_views(conn: &mut SqliteConnection, user_id: &str) -> DbResult<Vec<CartLineView>> {
        let lines = sqlx::query_as::<_, CartLineView>(
            r#"
            SELECT c.id, c.offer_id, c.quantity,
                   o.price_cents, o.stock,
                   p.name AS product_name,
                   m.name AS manufacturer_name
              FROM cart_lines c
              JOIN offers o        ON o.id = c.offer_id
              JOIN products p      ON p.id = o.product_id
              JOIN manufacturers m ON m.id = o.manufacturer_id
             WHERE c.user_id = ?1
             ORDER BY c.created_at, c.rowid
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(lines)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
