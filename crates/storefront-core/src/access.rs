//! # Access Control
//!
//! Pure decision function: (caller, resource scope) → allow or deny.
//!
//! ## Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Scope               │ Admin  │ Owner (User) │ Other User               │
//! │  ────────────────────┼────────┼──────────────┼───────────────────────── │
//! │  Personal(owner)     │ allow  │ allow        │ deny                     │
//! │  AdminOnly           │ allow  │ deny         │ deny                     │
//! │  AnyAuthenticated    │ allow  │ allow        │ allow                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Authentication happens before any of this: a [`Caller`] arrives with an
//! already-verified identity and role claim.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, ValidationError};

// =============================================================================
// Role
// =============================================================================

/// The role claim carried by an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Interprets a role claim.
    ///
    /// A missing claim means a regular user; an unrecognized one is rejected
    /// rather than silently downgraded.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::Role;
    ///
    /// assert_eq!(Role::from_claim(None).unwrap(), Role::User);
    /// assert_eq!(Role::from_claim(Some("admin")).unwrap(), Role::Admin);
    /// assert!(Role::from_claim(Some("root")).is_err());
    /// ```
    pub fn from_claim(claim: Option<&str>) -> Result<Role, ValidationError> {
        match claim.map(str::trim) {
            None => Ok(Role::User),
            Some(c) if c.eq_ignore_ascii_case("user") => Ok(Role::User),
            Some(c) if c.eq_ignore_ascii_case("admin") => Ok(Role::Admin),
            Some(_) => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec!["user".to_string(), "admin".to_string()],
            }),
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Caller
// =============================================================================

/// The authenticated identity behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Caller {
    pub user_id: String,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Caller {
            user_id: user_id.into(),
            role,
        }
    }

    /// A regular user.
    pub fn user(user_id: impl Into<String>) -> Self {
        Caller::new(user_id, Role::User)
    }

    /// An administrator.
    pub fn admin(user_id: impl Into<String>) -> Self {
        Caller::new(user_id, Role::Admin)
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        is_admin(self.role)
    }

    #[inline]
    pub fn owns(&self, owner_id: &str) -> bool {
        is_owner(&self.user_id, owner_id)
    }
}

// =============================================================================
// Decision
// =============================================================================

/// What a resource requires of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    /// Belongs to the given user id.
    Personal(&'a str),
    AdminOnly,
    AnyAuthenticated,
}

/// Outcome of [`authorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Access {
    Allow,
    Deny,
}

#[inline]
pub fn is_owner(caller_id: &str, owner_id: &str) -> bool {
    caller_id == owner_id
}

#[inline]
pub fn is_admin(role: Role) -> bool {
    role == Role::Admin
}

/// Decides whether `caller` may touch a resource with the given scope.
///
/// Admin bypasses ownership. Everyone else needs ownership for personal
/// resources and is denied admin-only ones.
pub fn authorize(caller: &Caller, scope: Scope<'_>) -> Access {
    if caller.is_admin() {
        return Access::Allow;
    }
    match scope {
        Scope::Personal(owner_id) if caller.owns(owner_id) => Access::Allow,
        Scope::Personal(_) | Scope::AdminOnly => Access::Deny,
        Scope::AnyAuthenticated => Access::Allow,
    }
}

/// Like [`authorize`], but a deny becomes [`CoreError::Forbidden`] with the
/// given reason.
///
/// ## Example
/// ```rust
/// use storefront_core::access::{require, Caller, Scope};
///
/// let caller = Caller::user("u1");
/// assert!(require(&caller, Scope::Personal("u1"), "not your order").is_ok());
/// assert!(require(&caller, Scope::AdminOnly, "admins only").is_err());
/// ```
pub fn require(caller: &Caller, scope: Scope<'_>, reason: &str) -> Result<(), CoreError> {
    match authorize(caller, scope) {
        Access::Allow => Ok(()),
        Access::Deny => Err(CoreError::forbidden(reason)),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_personal_scope() {
        let owner = Caller::user("u1");
        let other = Caller::user("u2");
        let admin = Caller::admin("a1");

        assert_eq!(authorize(&owner, Scope::Personal("u1")), Access::Allow);
        assert_eq!(authorize(&other, Scope::Personal("u1")), Access::Deny);
        assert_eq!(authorize(&admin, Scope::Personal("u1")), Access::Allow);
    }

    #[test]
    fn test_admin_only_scope() {
        assert_eq!(authorize(&Caller::user("u1"), Scope::AdminOnly), Access::Deny);
        assert_eq!(authorize(&Caller::admin("a1"), Scope::AdminOnly), Access::Allow);
    }

    #[test]
    fn test_any_authenticated_scope() {
        assert_eq!(
            authorize(&Caller::user("u1"), Scope::AnyAuthenticated),
            Access::Allow
        );
    }

    #[test]
    fn test_require_maps_deny_to_forbidden() {
        let err = require(&Caller::user("u2"), Scope::Personal("u1"), "not yours").unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(ref r) if r == "not yours"));
    }

    #[test]
    fn test_role_from_claim() {
        assert_eq!(Role::from_claim(None).unwrap(), Role::User);
        assert_eq!(Role::from_claim(Some("ADMIN")).unwrap(), Role::Admin);
        assert_eq!(Role::from_claim(Some("user")).unwrap(), Role::User);
        assert!(matches!(
            Role::from_claim(Some("superuser")),
            Err(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }
}
