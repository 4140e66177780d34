//! Repository implementations for database access.
//!
//! Each repository wraps a `&mut SqliteConnection` (a pooled connection or a transaction) and
//! returns models from [`crate::db::models`]:
//!
//! ```ignore
//! use sairoi::db::handlers::{Repository, Teams};
//!
//! let mut conn = pool.acquire().await?;
//! let mut teams = Teams::new(&mut conn);
//! let team = teams.create(&TeamCreateDBRequest { name: "Billing".into() }).await?;
//! ```
//!
//! - [`Users`]: accounts, credentials and scoped user counts
//! - [`Teams`]: the team directory
//! - [`Sessions`]: login sessions, keyed by token digest
//! - [`Categories`]: the assist category catalog
//! - [`ApprovedTools`]: the tool allow-list
//! - [`Settings`]: key/value settings such as the hourly rate
//! - [`AiEvents`]: the append-only event log

pub mod categories;
pub mod events;
pub mod repository;
pub mod sessions;
pub mod settings;
pub mod teams;
pub mod tools;
pub mod users;

pub use categories::Categories;
pub use events::AiEvents;
pub use repository::Repository;
pub use sessions::Sessions;
pub use settings::Settings;
pub use teams::Teams;
pub use tools::ApprovedTools;
pub use users::Users;
