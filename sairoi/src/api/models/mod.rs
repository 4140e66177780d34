//! API request and response data models.
//!
//! API models are distinct from database models so storage and wire representations can evolve
//! independently. All response models derive `utoipa::ToSchema`.
//!
//! - [`users`]: Roles, the authenticated user and user listings
//! - [`teams`]: Team listings
//! - [`categories`]: Assist category catalog entries
//! - [`events`]: Wire enumerations and the event logging form
//! - [`dashboard`]: Dashboard view model
//! - [`reports`]: CSV export query and response
//! - [`admin`]: Admin view model and mutation forms
//! - [`auth`]: Login form and view

pub mod admin;
pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod events;
pub mod reports;
pub mod teams;
pub mod users;

/// Enumerations stored and submitted as fixed upper-case codes (e.g. `SENT_TO_CUSTOMER`).
pub trait WireCode: Sized + Copy + 'static {
    /// Every variant, in display order
    const ALL: &'static [Self];

    fn code(self) -> &'static str;

    fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.code() == code)
    }
}

/// Trim a submitted form value, treating blank input as absent.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Checkbox semantics for submitted forms: `on`, `true` and `1` are checked.
pub fn is_checked(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("on" | "true" | "1"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  Support ")), Some("Support"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn test_is_checked() {
        assert!(is_checked(Some("on")));
        assert!(is_checked(Some("true")));
        assert!(is_checked(Some("1")));
        assert!(!is_checked(Some("off")));
        assert!(!is_checked(Some("")));
        assert!(!is_checked(None));
    }
}
