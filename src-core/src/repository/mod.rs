//! Repository Layer
//!
//! Data access abstractions and implementations.

mod db;
mod item_repo;
mod traits;

#[cfg(test)]
mod tests;

pub use db::{open_in_memory, open_store, STORE_FILE};
pub use item_repo::ItemRepository;
pub use traits::{IdAllocator, Repository};
