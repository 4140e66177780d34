//! Database record structures and repository request types.
//!
//! `*DBRequest` types carry validated input into a repository; `*DBResponse` types are what the
//! repositories hand back, usually with display fields (team name, category name) already joined.

pub mod categories;
pub mod events;
pub mod sessions;
pub mod settings;
pub mod teams;
pub mod tools;
pub mod users;
