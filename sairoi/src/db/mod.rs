//! Database layer for data persistence and access.
//!
//! Persistence is a single SQLite database accessed through SQLx. Handlers never issue SQL
//! themselves; they go through the repositories here.
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - queries)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - database records)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   SQLite    │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repository implementations, one per table
//! - [`models`]: Database record structures and repository request types
//! - [`errors`]: Database-specific error types
//!
//! ## Example Usage
//!
//! ```ignore
//! use sairoi::db::handlers::{Repository, Users};
//!
//! async fn example(pool: &sqlx::SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!     let mut users = Users::new(&mut tx);
//!
//!     if let Some(user) = users.get_user_by_email("agent@example.com").await? {
//!         println!("Found user: {}", user.email);
//!     }
//!
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```
//!
//! Identifiers are stored as UUID blobs and timestamps as RFC 3339 text; both are always bound
//! from Rust, so range comparisons on `created_at` are plain string comparisons.

pub mod errors;
pub mod handlers;
pub mod models;
