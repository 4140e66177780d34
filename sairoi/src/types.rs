//! Common type definitions shared across the crate.
//!
//! # ID Types
//!
//! All entity IDs are UUIDs wrapped in type aliases so signatures say what they carry:
//!
//! - [`UserId`]: User account identifier
//! - [`TeamId`]: Team identifier
//! - [`CategoryId`]: Assist category identifier
//! - [`EventId`]: Logged AI-assist event identifier
//! - [`SessionId`]: Login session identifier
//!
//! # Authorization vocabulary
//!
//! [`Resource`] and [`Operation`] name what a denied request was trying to do. They only feed
//! error messages and logs; the actual decision is made on roles in [`crate::auth::permissions`].

use std::fmt;
use uuid::Uuid;

// Type aliases for IDs
pub type UserId = Uuid;
pub type TeamId = Uuid;
pub type CategoryId = Uuid;
pub type EventId = Uuid;
pub type SessionId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Read,
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Teams,
    Users,
    Tools,
    Settings,
    Categories,
    Events,
    Reports,
    Admin,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Read => write!(f, "read"),
            Operation::Update => write!(f, "update"),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Teams => "teams",
            Resource::Users => "users",
            Resource::Tools => "approved tools",
            Resource::Settings => "settings",
            Resource::Categories => "categories",
            Resource::Events => "events",
            Resource::Reports => "reports",
            Resource::Admin => "admin console",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbrev_uuid() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(abbrev_uuid(&id), "550e8400");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{} {}", Operation::Update, Resource::Tools), "update approved tools");
    }
}
