//! Role gates for operations.
//!
//! Authentication is handled by the [`CurrentUser`] extractor; these checks run after it and
//! before any data is touched.

use crate::api::models::users::{CurrentUser, Role};
use crate::errors::{Error, Result};
use crate::types::{Operation, Resource};

/// Configuration changes: teams, users, tools, rate, categories.
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Reads and event logging, narrowed further by [`crate::auth::scope::Scope`].
pub const ANY_ROLE: &[Role] = &[Role::User, Role::Manager, Role::Admin];

/// Fail with [`Error::InsufficientPermissions`] unless the user's role is in `allowed`.
pub fn require_role(user: &CurrentUser, allowed: &'static [Role], action: Operation, resource: Resource) -> Result<()> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(Error::InsufficientPermissions {
            required: allowed,
            action,
            resource,
        })
    }
}
