//! # Catalog Service
//!
//! Products, manufacturers and the offers that pair them. Reads are open to
//! every caller; writes are administrators only.
//!
//! ## Guarded Deletes
//! ```text
//! BEGIN
//!   claim row                    (NOT_FOUND)
//!   count references             (CONFLICT if any)
//!   DELETE
//! COMMIT
//! ```

use storefront_core::access::{require, Scope};
use storefront_core::{
    Caller, CoreError, Manufacturer, ManufacturerUpdate, NewManufacturer, NewOffer, NewProduct,
    Offer, OfferUpdate, OfferView, Product, ProductUpdate,
};
use storefront_db::{CatalogRepository, Database, ReferentialGuard};
use tracing::{info, warn};

use crate::commit;
use crate::error::ServiceResult;

const ADMINS_ONLY: &str = "Admins only!";

/// Catalog operations. Obtained from [`crate::Storefront::catalog`].
#[derive(Debug, Clone, Copy)]
pub struct CatalogService<'a> {
    db: &'a Database,
}

impl<'a> CatalogService<'a> {
    pub fn new(db: &'a Database) -> Self {
        CatalogService { db }
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    pub async fn create_product(&self, caller: &Caller, input: NewProduct) -> ServiceResult<Product> {
        require(caller, Scope::AdminOnly, ADMINS_ONLY)?;
        let input = input.validated()?;

        let mut conn = self.db.acquire().await?;
        let product = CatalogRepository::insert_product(&mut conn, &input).await?;

        info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    pub async fn get_product(&self, product_id: &str) -> ServiceResult<Product> {
        let mut conn = self.db.acquire().await?;
        let product = CatalogRepository::get_product(&mut conn, product_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Product", product_id))?;
        Ok(product)
    }

    pub async fn list_products(&self) -> ServiceResult<Vec<Product>> {
        let mut conn = self.db.acquire().await?;
        Ok(CatalogRepository::list_products(&mut conn).await?)
    }

    pub async fn update_product(
        &self,
        caller: &Caller,
        product_id: &str,
        update: ProductUpdate,
    ) -> ServiceResult<Product> {
        require(caller, Scope::AdminOnly, ADMINS_ONLY)?;
        let update = update.validated()?;

        let mut conn = self.db.acquire().await?;
        let product = CatalogRepository::update_product(&mut conn, product_id, &update)
            .await?
            .ok_or_else(|| CoreError::not_found("Product", product_id))?;

        info!(product_id = %product_id, "Product updated");
        Ok(product)
    }

    /// Deletes a product unless an offer still sells it.
    pub async fn delete_product(&self, caller: &Caller, product_id: &str) -> ServiceResult<()> {
        require(caller, Scope::AdminOnly, ADMINS_ONLY)?;

        let mut tx = self.db.begin().await?;

        if !CatalogRepository::claim_product(&mut tx, product_id).await? {
            return Err(CoreError::not_found("Product", product_id).into());
        }

        let references = ReferentialGuard::product_references(&mut tx, product_id).await?;
        if references > 0 {
            warn!(product_id = %product_id, references, "Product delete blocked");
            return Err(CoreError::conflict("Cannot delete product associated with offers").into());
        }

        CatalogRepository::delete_product(&mut tx, product_id).await?;
        commit(tx).await?;

        info!(product_id = %product_id, "Product deleted");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Manufacturers
    // -------------------------------------------------------------------------

    pub async fn create_manufacturer(
        &self,
        caller: &Caller,
        input: NewManufacturer,
    ) -> ServiceResult<Manufacturer> {
        require(caller, Scope::AdminOnly, ADMINS_ONLY)?;
        let input = input.validated()?;

        let mut conn = self.db.acquire().await?;
        let manufacturer = CatalogRepository::insert_manufacturer(&mut conn, &input).await?;

        info!(manufacturer_id = %manufacturer.id, name = %manufacturer.name, "Manufacturer created");
        Ok(manufacturer)
    }

    pub async fn update_manufacturer(
        &self,
        caller: &Caller,
        manufacturer_id: &str,
        update: ManufacturerUpdate,
    ) -> ServiceResult<Manufacturer> {
        require(caller, Scope::AdminOnly, ADMINS_ONLY)?;
        let update = update.validated()?;

        let mut conn = self.db.acquire().await?;
        let manufacturer = CatalogRepository::update_manufacturer(&mut conn, manufacturer_id, &update)
            .await?
            .ok_or_else(|| CoreError::not_found("Manufacturer", manufacturer_id))?;

        info!(manufacturer_id = %manufacturer_id, "Manufacturer updated");
        Ok(manufacturer)
    }

    pub async fn get_manufacturer(&self, manufacturer_id: &str) -> ServiceResult<Manufacturer> {
        let mut conn = self.db.acquire().await?;
        let manufacturer = CatalogRepository::get_manufacturer(&mut conn, manufacturer_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Manufacturer", manufacturer_id))?;
        Ok(manufacturer)
    }

    pub async fn list_manufacturers(&self) -> ServiceResult<Vec<Manufacturer>> {
        let mut conn = self.db.acquire().await?;
        Ok(CatalogRepository::list_manufacturers(&mut conn).await?)
    }

    /// Deletes a manufacturer unless one of its offers still exists.
    pub async fn delete_manufacturer(&self, caller: &Caller, manufacturer_id: &str) -> ServiceResult<()> {
        require(caller, Scope::AdminOnly, ADMINS_ONLY)?;

        let mut tx = self.db.begin().await?;

        if !CatalogRepository::claim_manufacturer(&mut tx, manufacturer_id).await? {
            return Err(CoreError::not_found("Manufacturer", manufacturer_id).into());
        }

        let references = ReferentialGuard::manufacturer_references(&mut tx, manufacturer_id).await?;
        if references > 0 {
            warn!(manufacturer_id = %manufacturer_id, references, "Manufacturer delete blocked");
            return Err(CoreError::conflict("Cannot delete manufacturer associated with products").into());
        }

        CatalogRepository::delete_manufacturer(&mut tx, manufacturer_id).await?;
        commit(tx).await?;

        info!(manufacturer_id = %manufacturer_id, "Manufacturer deleted");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Offers
    // -------------------------------------------------------------------------

    /// Creates an offer; the product and manufacturer must exist.
    pub async fn create_offer(&self, caller: &Caller, input: NewOffer) -> ServiceResult<Offer> {
        require(caller, Scope::AdminOnly, ADMINS_ONLY)?;
        let input = input.validated()?;

        let mut conn = self.db.acquire().await?;
        let offer = CatalogRepository::insert_offer(&mut conn, &input).await?;

        info!(offer_id = %offer.id, price = %offer.price(), stock = offer.stock, "Offer created");
        Ok(offer)
    }

    /// Reprices or restocks an offer. The new stock replaces the old value.
    pub async fn update_offer(
        &self,
        caller: &Caller,
        offer_id: &str,
        update: OfferUpdate,
    ) -> ServiceResult<Offer> {
        require(caller, Scope::AdminOnly, ADMINS_ONLY)?;
        let update = update.validated()?;

        let mut conn = self.db.acquire().await?;
        let offer = CatalogRepository::update_offer(&mut conn, offer_id, &update)
            .await?
            .ok_or_else(|| CoreError::not_found("Offer", offer_id))?;

        info!(offer_id = %offer_id, price = %offer.price(), stock = offer.stock, "Offer updated");
        Ok(offer)
    }

    pub async fn get_offer(&self, offer_id: &str) -> ServiceResult<OfferView> {
        let mut conn = self.db.acquire().await?;
        let offer = CatalogRepository::get_offer_view(&mut conn, offer_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Offer", offer_id))?;
        Ok(offer)
    }

    pub async fn list_offers(&self) -> ServiceResult<Vec<OfferView>> {
        let mut conn = self.db.acquire().await?;
        Ok(CatalogRepository::list_offer_views(&mut conn).await?)
    }

    /// Deletes an offer unless an order was placed against it.
    pub async fn delete_offer(&self, caller: &Caller, offer_id: &str) -> ServiceResult<()> {
        require(caller, Scope::AdminOnly, ADMINS_ONLY)?;

        let mut tx = self.db.begin().await?;

        if !CatalogRepository::claim_offer(&mut tx, offer_id).await? {
            return Err(CoreError::not_found("Offer", offer_id).into());
        }

        let references = ReferentialGuard::offer_references(&mut tx, offer_id).await?;
        if references > 0 {
            warn!(offer_id = %offer_id, references, "Offer delete blocked");
            return Err(CoreError::conflict("Cannot delete entry associated with existing orders").into());
        }

        CatalogRepository::delete_offer(&mut tx, offer_id).await?;
        commit(tx).await?;

        info!(offer_id = %offer_id, "Offer deleted");
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
    use storefront_core::{
        ManufacturerUpdate, NewManufacturer, NewOffer, NewProduct, OfferUpdate, ProductUpdate, Role,
    };

    #[tokio::test]
    async fn test_writes_are_admin_only() {
        let store = testing::store().await;
        let (_, user) = testing::user(&store, Role::User).await;

        let err = store
            .catalog()
            .create_product(
                &user,
                NewProduct {
                    name: "Lamp".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        assert_eq!(err.message, "Admins only!");
    }

    #[tokio::test]
    async fn test_manufacturer_rating_and_update() {
        let store = testing::store().await;
        let (_, admin) = testing::user(&store, Role::Admin).await;

        let err = store
            .catalog()
            .create_manufacturer(
                &admin,
                NewManufacturer {
                    name: "Acme".to_string(),
                    rating: 6,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let acme = store
            .catalog()
            .create_manufacturer(
                &admin,
                NewManufacturer {
                    name: "Acme".to_string(),
                    rating: 3,
                },
            )
            .await
            .unwrap();

        let updated = store
            .catalog()
            .update_manufacturer(
                &admin,
                &acme.id,
                ManufacturerUpdate {
                    rating: Some(5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.rating, 5);
        assert_eq!(updated.name, "Acme");

        let err = store
            .catalog()
            .update_manufacturer(&admin, &acme.id, ManufacturerUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_create_offer_needs_product_and_manufacturer() {
        let store = testing::store().await;
        let (_, admin) = testing::user(&store, Role::Admin).await;
        let offer = testing::offer(&store, &admin, 500, 1).await;

        let err = store
            .catalog()
            .create_offer(
                &admin,
                NewOffer {
                    product_id: "missing".to_string(),
                    manufacturer_id: offer.manufacturer_id.clone(),
                    price_cents: 500,
                    stock: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let fresh = store
            .catalog()
            .create_offer(
                &admin,
                NewOffer {
                    product_id: offer.product_id.clone(),
                    manufacturer_id: offer.manufacturer_id.clone(),
                    price_cents: 700,
                    stock: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(fresh.stock, 0);

        let view = store.catalog().get_offer(&fresh.id).await.unwrap();
        assert_eq!(view.product_name, "Desk Lamp");
        assert_eq!(view.manufacturer_name, "Acme");
    }

    #[tokio::test]
    async fn test_restock_through_update() {
        let store = testing::store().await;
        let (_, admin) = testing::user(&store, Role::Admin).await;
        let offer = testing::offer(&store, &admin, 500, 0).await;

        let restocked = store
            .catalog()
            .update_offer(
                &admin,
                &offer.id,
                OfferUpdate {
                    stock: Some(12),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(restocked.stock, 12);
        assert_eq!(restocked.price_cents, 500);

        let err = store
            .catalog()
            .update_offer(
                &admin,
                &offer.id,
                OfferUpdate {
                    stock: Some(-1),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_product_update() {
        let store = testing::store().await;
        let (_, admin) = testing::user(&store, Role::Admin).await;
        let (_, user) = testing::user(&store, Role::User).await;
        let offer = testing::offer(&store, &admin, 500, 1).await;

        let rename = ProductUpdate {
            name: Some("Floor Lamp".to_string()),
            ..Default::default()
        };
        let err = store
            .catalog()
            .update_product(&user, &offer.product_id, rename.clone())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let err = store
            .catalog()
            .update_product(&admin, &offer.product_id, ProductUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = store
            .catalog()
            .update_product(
                &admin,
                &offer.product_id,
                ProductUpdate {
                    rating: Some(9),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = store
            .catalog()
            .update_product(&admin, "missing", rename.clone())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let before = store.catalog().get_product(&offer.product_id).await.unwrap();
        let updated = store
            .catalog()
            .update_product(&admin, &offer.product_id, rename)
            .await
            .unwrap();
        assert_eq!(updated.name, "Floor Lamp");
        assert_eq!(updated.rating, before.rating);
        assert_eq!(updated.description, before.description);

        let view = store.catalog().get_offer(&offer.id).await.unwrap();
        assert_eq!(view.product_name, "Floor Lamp");
    }

    #[tokio::test]
    async fn test_product_delete_blocked_by_offers() {
        let store = testing::store().await;
        let (_, admin) = testing::user(&store, Role::Admin).await;
        let (_, user) = testing::user(&store, Role::User).await;
        let offer = testing::offer(&store, &admin, 500, 1).await;

        let err = store
            .catalog()
            .delete_product(&user, &offer.product_id)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let err = store
            .catalog()
            .delete_product(&admin, &offer.product_id)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(err.message, "Cannot delete product associated with offers");
        assert!(store.catalog().get_product(&offer.product_id).await.is_ok());

        store.catalog().delete_offer(&admin, &offer.id).await.unwrap();
        store
            .catalog()
            .delete_product(&admin, &offer.product_id)
            .await
            .unwrap();

        let err = store.catalog().get_product(&offer.product_id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        let err = store
            .catalog()
            .delete_product(&admin, &offer.product_id)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_guarded_offer_and_manufacturer_deletes() {
        let store = testing::store().await;
        let (_, admin) = testing::user(&store, Role::Admin).await;
        let (_, user) = testing::user(&store, Role::User).await;
        let offer = testing::offer(&store, &admin, 500, 3).await;

        let err = store
            .catalog()
            .delete_manufacturer(&admin, &offer.manufacturer_id)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(err.message, "Cannot delete manufacturer associated with products");

        store.orders().create(&user, &offer.id, 1).await.unwrap();
        let err = store.catalog().delete_offer(&admin, &offer.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(err.message, "Cannot delete entry associated with existing orders");
        assert!(store.catalog().get_offer(&offer.id).await.is_ok());

        let unused = testing::offer(&store, &admin, 900, 1).await;
        store.catalog().delete_offer(&admin, &unused.id).await.unwrap();
        store
            .catalog()
            .delete_manufacturer(&admin, &unused.manufacturer_id)
            .await
            .unwrap();

        let err = store.catalog().delete_offer(&admin, &unused.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        let err = store
            .catalog()
            .get_manufacturer(&unused.manufacturer_id)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
