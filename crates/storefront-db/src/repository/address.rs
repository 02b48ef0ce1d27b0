//! # Address Repository
//!
//! User delivery addresses. Deleting one is guarded: see
//! [`ReferentialGuard::address_references`](super::guard::ReferentialGuard::address_references).

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use storefront_core::{new_id, Address, AddressUpdate, AddressView, NewAddress};

const ADDRESS_COLUMNS: &str =
    "id, user_id, country, city, zip_code, address_line, created_at, updated_at";

/// Repository for address rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressRepository;

impl AddressRepository {
    /// Inserts an address owned by `user_id`. `input` must already be validated.
    pub async fn insert(
        conn: &mut SqliteConnection,
        user_id: &str,
        input: &NewAddress,
    ) -> DbResult<Address> {
        let now = Utc::now();
        let address = Address {
            id: new_id(),
            user_id: user_id.to_string(),
            country: input.country.clone(),
            city: input.city.clone(),
            zip_code: input.zip_code.clone(),
            address_line: input.address_line.clone(),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %address.id, user_id = %user_id, "Inserting address");

        sqlx::query(
            r#"
            INSERT INTO addresses (id, user_id, country, city, zip_code, address_line, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&address.id)
        .bind(&address.user_id)
        .bind(&address.country)
        .bind(&address.city)
        .bind(&address.zip_code)
        .bind(&address.address_line)
        .bind(address.created_at)
        .bind(address.updated_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::ForeignKeyViolation { .. } => DbError::not_found("User", user_id),
            other => other,
        })?;

        Ok(address)
    }

    pub async fn get(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Address>> {
        let address = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(address)
    }

    pub async fn list_for_user(conn: &mut SqliteConnection, user_id: &str) -> DbResult<Vec<Address>> {
        let addresses = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE user_id = ?1 ORDER BY created_at, rowid"
        ))
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(addresses)
    }

    /// Every address with its owner's name.
    pub async fn list_views(conn: &mut SqliteConnection) -> DbResult<Vec<AddressView>> {
        let addresses = sqlx::query_as::<_, AddressView>(
            r#"
            SELECT a.id, a.user_id, u.name AS user_name,
                   a.country, a.city, a.zip_code, a.address_line
              FROM addresses a
              JOIN users u ON u.id = a.user_id
             ORDER BY u.name, a.created_at
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;
        Ok(addresses)
    }

    /// Takes the write lock on an address row and returns it; `None` if it
    /// does not exist.
    pub async fn claim(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Address>> {
        let address = sqlx::query_as::<_, Address>(&format!(
            "UPDATE addresses SET updated_at = ?1 WHERE id = ?2 RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(address)
    }

    /// Applies the present fields of `update`; `None` for an unknown id.
    pub async fn update(
        conn: &mut SqliteConnection,
        id: &str,
        update: &AddressUpdate,
    ) -> DbResult<Option<Address>> {
        debug!(id = %id, "Updating address");

        let address = sqlx::query_as::<_, Address>(&format!(
            r#"
            UPDATE addresses
               SET country = COALESCE(?1, country),
                   city = COALESCE(?2, city),
                   zip_code = COALESCE(?3, zip_code),
                   address_line = COALESCE(?4, address_line),
                   updated_at = ?5
             WHERE id = ?6
            RETURNING {ADDRESS_COLUMNS}
            "#
        ))
        .bind(&update.country)
        .bind(&update.city)
        .bind(&update.zip_code)
        .bind(&update.address_line)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(address)
    }

    pub async fn delete(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting address");

        let result = sqlx::query("DELETE FROM addresses WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Address", id));
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
    use storefront_core::Role;

    #[tokio::test]
    async fn test_insert_list_and_update() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let user = fixtures::user(&mut conn, Role::User).await;
        let address = fixtures::address(&mut conn, &user.id).await;

        let mine = AddressRepository::list_for_user(&mut conn, &user.id).await.unwrap();
        assert_eq!(mine.len(), 1);

        let updated = AddressRepository::update(
            &mut conn,
            &address.id,
            &AddressUpdate {
                city: Some("Hamburg".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.city, "Hamburg");
        assert_eq!(updated.country, "Germany");

        let views = AddressRepository::list_views(&mut conn).await.unwrap();
        assert_eq!(views[0].user_name, "Test User");
    }

    #[tokio::test]
    async fn test_insert_for_unknown_user() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();

        let err = AddressRepository::insert(
            &mut conn,
            "ghost",
            &NewAddress {
                country: "DE".to_string(),
                city: "Berlin".to_string(),
                zip_code: "10115".to_string(),
                address_line: "Main 1".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "User"));
    }

    #[tokio::test]
    async fn test_claim_and_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let user = fixtures::user(&mut conn, Role::User).await;
        let address = fixtures::address(&mut conn, &user.id).await;

        let claimed = AddressRepository::claim(&mut conn, &address.id).await.unwrap();
        assert_eq!(claimed.map(|a| a.user_id), Some(user.id));

        AddressRepository::delete(&mut conn, &address.id).await.unwrap();
        assert!(AddressRepository::claim(&mut conn, &address.id).await.unwrap().is_none());
    }
}
