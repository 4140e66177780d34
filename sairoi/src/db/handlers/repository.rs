//! Base repository trait for database operations.

/// Contains the Repository trait.
///
/// A repository is a data access layer over one table. The trait covers the operations every
/// table here supports; anything entity-specific (lookups by natural key, upserts, scoped
/// counts) lives on the repository struct itself.
use crate::db::errors::Result;

/// Base repository trait providing common database operations
#[async_trait::async_trait]
pub trait Repository {
    /// The request type for creating entities
    type CreateRequest;

    /// The response/DTO type returned by operations
    type Response;

    /// The identifier type for lookups
    type Id: Send + Sync;

    /// The filter type for list operations
    type Filter: Send + Sync;

    /// Create a new entity
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response>;

    /// Get an entity by ID
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>>;

    /// List entities matching the filter
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>>;
}
