//! # Catalog Repository
//!
//! Products, manufacturers and the offers that join them.
//!
//! ## Offer Joins
//! ```text
//! offers o
//!   JOIN products p       ON p.id = o.product_id
//!   JOIN manufacturers m  ON m.id = o.manufacturer_id
//!   → OfferView { product_name, manufacturer_name, price_cents, stock }
//! ```
//!
//! Stock is only ever *set* here (admin restock through [`OfferUpdate`]);
//! taking and giving back stock belongs to the inventory ledger.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use storefront_core::{
    new_id, Manufacturer, ManufacturerUpdate, NewManufacturer, NewOffer, NewProduct, Offer,
    OfferUpdate, OfferView, Product, ProductUpdate,
};

const OFFER_COLUMNS: &str =
    "id, product_id, manufacturer_id, price_cents, stock, created_at, updated_at";

const OFFER_VIEW_SELECT: &str = r#"
    SELECT o.id, o.product_id, p.name AS product_name,
           o.manufacturer_id, m.name AS manufacturer_name,
           o.price_cents, o.stock
      FROM offers o
      JOIN products p      ON p.id = o.product_id
      JOIN manufacturers m ON m.id = o.manufacturer_id
"#;

/// Repository for products, manufacturers and offers.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogRepository;

impl CatalogRepository {
    // =========================================================================
    // Products
    // =========================================================================

    /// Inserts a product. `input` must already be validated.
    pub async fn insert_product(conn: &mut SqliteConnection, input: &NewProduct) -> DbResult<Product> {
        let product = Product {
            id: new_id(),
            name: input.name.clone(),
            description: input.description.clone(),
            rating: input.rating,
            created_at: Utc::now(),
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, rating, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.rating)
        .bind(product.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(product)
    }

    pub async fn get_product(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, description, rating, created_at FROM products WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(product)
    }

    pub async fn list_products(conn: &mut SqliteConnection) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, description, rating, created_at FROM products ORDER BY name",
        )
        .fetch_all(&mut *conn)
        .await?;
        Ok(products)
    }

    /// Applies the present fields of `update`; returns `None` for an unknown id.
    pub async fn update_product(
        conn: &mut SqliteConnection,
        id: &str,
        update: &ProductUpdate,
    ) -> DbResult<Option<Product>> {
        debug!(id = %id, "Updating product");

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
               SET name = COALESCE(?1, name),
                   description = COALESCE(?2, description),
                   rating = COALESCE(?3, rating)
             WHERE id = ?4
            RETURNING id, name, description, rating, created_at
            "#,
        )
        .bind(&update.name)
        .bind(&update.description)
        .bind(update.rating)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(product)
    }

    /// Takes the write lock on a product row ahead of a guarded delete.
    /// Returns `false` if it does not exist.
    ///
    /// Products carry no `updated_at`, so the claim is a no-op assignment.
    pub async fn claim_product(conn: &mut SqliteConnection, id: &str) -> DbResult<bool> {
        let claimed: Option<String> =
            sqlx::query_scalar("UPDATE products SET name = name WHERE id = ?1 RETURNING id")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;
        Ok(claimed.is_some())
    }

    pub async fn delete_product(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }

    // =========================================================================
    // Manufacturers
    // =========================================================================

    /// Inserts a manufacturer. `input` must already be validated.
    pub async fn insert_manufacturer(
        conn: &mut SqliteConnection,
        input: &NewManufacturer,
    ) -> DbResult<Manufacturer> {
        let now = Utc::now();
        let manufacturer = Manufacturer {
            id: new_id(),
            name: input.name.clone(),
            rating: input.rating,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %manufacturer.id, name = %manufacturer.name, "Inserting manufacturer");

        sqlx::query(
            r#"
            INSERT INTO manufacturers (id, name, rating, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&manufacturer.id)
        .bind(&manufacturer.name)
        .bind(manufacturer.rating)
        .bind(manufacturer.created_at)
        .bind(manufacturer.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(manufacturer)
    }

    /// Applies the present fields of `update`; returns `None` for an unknown id.
    pub async fn update_manufacturer(
        conn: &mut SqliteConnection,
        id: &str,
        update: &ManufacturerUpdate,
    ) -> DbResult<Option<Manufacturer>> {
        debug!(id = %id, "Updating manufacturer");

        let manufacturer = sqlx::query_as::<_, Manufacturer>(
            r#"
            UPDATE manufacturers
               SET name = COALESCE(?1, name),
                   rating = COALESCE(?2, rating),
                   updated_at = ?3
             WHERE id = ?4
            RETURNING id, name, rating, created_at, updated_at
            "#,
        )
        .bind(&update.name)
        .bind(update.rating)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(manufacturer)
    }

    pub async fn get_manufacturer(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<Manufacturer>> {
        let manufacturer = sqlx::query_as::<_, Manufacturer>(
            "SELECT id, name, rating, created_at, updated_at FROM manufacturers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(manufacturer)
    }

    pub async fn list_manufacturers(conn: &mut SqliteConnection) -> DbResult<Vec<Manufacturer>> {
        let manufacturers = sqlx::query_as::<_, Manufacturer>(
            "SELECT id, name, rating, created_at, updated_at FROM manufacturers ORDER BY name",
        )
        .fetch_all(&mut *conn)
        .await?;
        Ok(manufacturers)
    }

    /// Takes the write lock on a manufacturer row ahead of a guarded delete.
    /// Returns `false` if it does not exist.
    pub async fn claim_manufacturer(conn: &mut SqliteConnection, id: &str) -> DbResult<bool> {
        let claimed: Option<String> = sqlx::query_scalar(
            "UPDATE manufacturers SET updated_at = ?1 WHERE id = ?2 RETURNING id",
        )
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(claimed.is_some())
    }

    pub async fn delete_manufacturer(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting manufacturer");

        let result = sqlx::query("DELETE FROM manufacturers WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Manufacturer", id));
        }
        Ok(())
    }

    // =========================================================================
    // Offers
    // =========================================================================

    /// Inserts an offer. `input` must already be validated.
    ///
    /// ## Errors
    /// [`DbError::NotFound`] naming the product or manufacturer when either
    /// is missing.
    pub async fn insert_offer(conn: &mut SqliteConnection, input: &NewOffer) -> DbResult<Offer> {
        let now = Utc::now();
        let offer = Offer {
            id: new_id(),
            product_id: input.product_id.clone(),
            manufacturer_id: input.manufacturer_id.clone(),
            price_cents: input.price_cents,
            stock: input.stock.unwrap_or(0),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %offer.id, product_id = %offer.product_id, stock = offer.stock, "Inserting offer");

        let inserted = sqlx::query(
            r#"
            INSERT INTO offers (id, product_id, manufacturer_id, price_cents, stock, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&offer.id)
        .bind(&offer.product_id)
        .bind(&offer.manufacturer_id)
        .bind(offer.price_cents)
        .bind(offer.stock)
        .bind(offer.created_at)
        .bind(offer.updated_at)
        .execute(&mut *conn)
        .await
        .map_err(DbError::from);

        match inserted {
            Ok(_) => Ok(offer),
            Err(err) if err.is_foreign_key_violation() => {
                if Self::get_product(conn, &offer.product_id).await?.is_none() {
                    Err(DbError::not_found("Product", &offer.product_id))
                } else {
                    Err(DbError::not_found("Manufacturer", &offer.manufacturer_id))
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Applies the present fields of `update`; returns `None` for an unknown id.
    pub async fn update_offer(
        conn: &mut SqliteConnection,
        id: &str,
        update: &OfferUpdate,
    ) -> DbResult<Option<Offer>> {
        debug!(id = %id, price_cents = ?update.price_cents, stock = ?update.stock, "Updating offer");

        let offer = sqlx::query_as::<_, Offer>(&format!(
            r#"
            UPDATE offers
               SET price_cents = COALESCE(?1, price_cents),
                   stock = COALESCE(?2, stock),
                   updated_at = ?3
             WHERE id = ?4
            RETURNING {OFFER_COLUMNS}
            "#
        ))
        .bind(update.price_cents)
        .bind(update.stock)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(offer)
    }

    pub async fn get_offer(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Offer>> {
        let offer = sqlx::query_as::<_, Offer>(&format!(
            "SELECT {OFFER_COLUMNS} FROM offers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(offer)
    }

    pub async fn get_offer_view(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<OfferView>> {
        let offer = sqlx::query_as::<_, OfferView>(&format!("{OFFER_VIEW_SELECT} WHERE o.id = ?1"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(offer)
    }

    pub async fn list_offer_views(conn: &mut SqliteConnection) -> DbResult<Vec<OfferView>> {
        let offers = sqlx::query_as::<_, OfferView>(&format!(
            "{OFFER_VIEW_SELECT} ORDER BY p.name, m.name"
        ))
        .fetch_all(&mut *conn)
        .await?;
        Ok(offers)
    }

    /// Takes the write lock on an offer row ahead of a guarded delete.
    /// Returns `false` if it does not exist.
    pub async fn claim_offer(conn: &mut SqliteConnection, id: &str) -> DbResult<bool> {
        let claimed: Option<String> =
            sqlx::query_scalar("UPDATE offers SET updated_at = ?1 WHERE id = ?2 RETURNING id")
                .bind(Utc::now())
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;
        Ok(claimed.is_some())
    }

    pub async fn delete_offer(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting offer");

        let result = sqlx::query("DELETE FROM offers WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Offer", id));
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
