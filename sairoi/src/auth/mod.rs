//! Authentication and authorization.
//!
//! Browsers sign in with email and password at `/login` and receive an HTTP-only cookie holding
//! an opaque session token. Every protected handler takes a [`CurrentUser`] argument; extracting
//! it resolves the cookie against the `sessions` table and rejects with 401 when that fails.
//!
//! What a signed-in user may do is decided in two steps:
//!
//! - [`permissions::require_role`] gates whole operations by role (configuration changes are
//!   admin-only).
//! - [`scope::Scope`] narrows every read of events and users to what the role and team allow.
//!
//! [`CurrentUser`]: crate::api::models::users::CurrentUser

pub mod current_user;
pub mod password;
pub mod permissions;
pub mod scope;
pub mod session;
