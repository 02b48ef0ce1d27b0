//! # Address Service
//!
//! Users' delivery addresses. The owner or an administrator may read, change
//! and delete one; deleting is refused while a shipping record points at it.

use storefront_core::access::{require, Scope};
use storefront_core::{Address, AddressUpdate, AddressView, Caller, CoreError, NewAddress};
use storefront_db::{AddressRepository, Database, ReferentialGuard};
use tracing::{info, warn};

use crate::commit;
use crate::error::ServiceResult;

/// Address operations. Obtained from [`crate::Storefront::addresses`].
#[derive(Debug, Clone, Copy)]
pub struct AddressService<'a> {
    db: &'a Database,
}

impl<'a> AddressService<'a> {
    pub fn new(db: &'a Database) -> Self {
        AddressService { db }
    }

    /// Adds an address for the caller. Every field is required.
    pub async fn create(&self, caller: &Caller, input: NewAddress) -> ServiceResult<Address> {
        let input = input.validated()?;

        let mut conn = self.db.acquire().await?;
        let address = AddressRepository::insert(&mut conn, &caller.user_id, &input).await?;

        info!(address_id = %address.id, user_id = %caller.user_id, "Address created");
        Ok(address)
    }

    /// The caller's own addresses.
    pub async fn list_mine(&self, caller: &Caller) -> ServiceResult<Vec<Address>> {
        let mut conn = self.db.acquire().await?;
        Ok(AddressRepository::list_for_user(&mut conn, &caller.user_id).await?)
    }

    /// Every address with its owner's name. Administrators only.
    pub async fn list_all(&self, caller: &Caller) -> ServiceResult<Vec<AddressView>> {
        require(caller, Scope::AdminOnly, "Admins only!")?;

        let mut conn = self.db.acquire().await?;
        Ok(AddressRepository::list_views(&mut conn).await?)
    }

    pub async fn get(&self, caller: &Caller, address_id: &str) -> ServiceResult<Address> {
        let mut conn = self.db.acquire().await?;

        let address = AddressRepository::get(&mut conn, address_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Address", address_id))?;

        require(
            caller,
            Scope::Personal(&address.user_id),
            "You can only view your own addresses",
        )?;
        Ok(address)
    }

    pub async fn update(
        &self,
        caller: &Caller,
        address_id: &str,
        update: AddressUpdate,
    ) -> ServiceResult<Address> {
        let update = update.validated()?;

        let mut tx = self.db.begin().await?;

        let address = AddressRepository::claim(&mut tx, address_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Address", address_id))?;

        require(
            caller,
            Scope::Personal(&address.user_id),
            "You can only update your own addresses",
        )?;

        let updated = AddressRepository::update(&mut tx, address_id, &update)
            .await?
            .ok_or_else(|| CoreError::not_found("Address", address_id))?;

        commit(tx).await?;

        info!(address_id = %address_id, "Address updated");
        Ok(updated)
    }

    /// Deletes an address unless a shipping record references it.
    pub async fn delete(&self, caller: &Caller, address_id: &str) -> ServiceResult<()> {
        let mut tx = self.db.begin().await?;

        let address = AddressRepository::claim(&mut tx, address_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Address", address_id))?;

        require(
            caller,
            Scope::Personal(&address.user_id),
            "You can only delete your own addresses",
        )?;

        let references = ReferentialGuard::address_references(&mut tx, address_id).await?;
        if references > 0 {
            warn!(address_id = %address_id, references, "Address delete blocked");
            return Err(CoreError::conflict("Cannot delete address associated with shipping records").into());
        }

        AddressRepository::delete(&mut tx, address_id).await?;
        commit(tx).await?;

        info!(address_id = %address_id, "Address deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
