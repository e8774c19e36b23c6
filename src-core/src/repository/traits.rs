//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for data access.
//! Implementations can use SQLite, in-memory, etc.

use crate::domain::{DomainResult, Entity};

/// Core repository trait for CRUD operations
///
/// Generic over any Entity type. Calls are synchronous and run inline
/// with the action that triggered them.
pub trait Repository<T: Entity> {
    /// Insert an entity under its own id
    fn create(&self, entity: &T) -> DomainResult<T>;

    /// Find entity by ID
    fn find_by_id(&self, id: T::Id) -> DomainResult<Option<T>>;

    /// List all entities in the store's canonical order
    fn list(&self) -> DomainResult<Vec<T>>;

    /// Update an existing entity
    fn update(&self, entity: &T) -> DomainResult<T>;

    /// Delete entity by ID
    fn delete(&self, id: T::Id) -> DomainResult<()>;
}

/// Repositories that hand out ids themselves
pub trait IdAllocator<T: Entity>: Repository<T> {
    /// Smallest id greater than every stored id
    fn next_id(&self) -> DomainResult<T::Id>;
}
