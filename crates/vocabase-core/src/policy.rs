//! Ownership and role authorization policy.
//!
//! All handlers route their access decisions through [`authorize`] rather
//! than scattering role/ownership conditionals, so the rules live in exactly
//! one place: an owner may touch their own resources, an admin may touch
//! anyone's.

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::Role;

/// Identity resolved from a verified bearer credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthContext {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Gate for admin-only operations.
    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::Forbidden("Insufficient permissions".to_string()))
        }
    }
}

/// Allow when the caller owns the resource or holds the admin role.
pub fn authorize(ctx: &AuthContext, owner: Uuid) -> Result<()> {
    if ctx.user_id == owner || ctx.is_admin() {
        Ok(())
    } else {
        Err(Error::Forbidden("Insufficient permissions".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_is_allowed() {
        let id = Uuid::new_v4();
        let ctx = AuthContext::new(id, Role::User);
        assert!(authorize(&ctx, id).is_ok());
    }

    #[test]
    fn test_non_owner_is_forbidden() {
        let ctx = AuthContext::new(Uuid::new_v4(), Role::User);
        let err = authorize(&ctx, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[test]
    fn test_admin_may_touch_any_owner() {
        let ctx = AuthContext::new(Uuid::new_v4(), Role::Admin);
        assert!(authorize(&ctx, Uuid::new_v4()).is_ok());
    }

    #[test]
    fn test_require_admin() {
        assert!(AuthContext::new(Uuid::new_v4(), Role::Admin)
            .require_admin()
            .is_ok());
        assert!(AuthContext::new(Uuid::new_v4(), Role::User)
            .require_admin()
            .is_err());
    }
}
