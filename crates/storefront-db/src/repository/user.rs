//! # User Repository
//!
//! Users are registered elsewhere; this crate only needs to insert them
//! (seeding, tests) and look them up for ownership joins.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use storefront_core::{new_id, Role, User};

/// Repository for user rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserRepository;

impl UserRepository {
    /// Inserts a user.
    ///
    /// ## Errors
    /// [`DbError::UniqueViolation`] when the email is taken.
    pub async fn insert(
        conn: &mut SqliteConnection,
        name: &str,
        email: &str,
        role: Role,
    ) -> DbResult<User> {
        let user = User {
            id: new_id(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            created_at: Utc::now(),
        };

        debug!(id = %user.id, role = %role, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role)
        .bind(user.created_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("email", email),
            other => other,
        })?;

        Ok(user)
    }

    pub async fn get_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, created_at FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(user)
    }

    pub async fn get_by_email(conn: &mut SqliteConnection, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, created_at FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(user)
    }
}
