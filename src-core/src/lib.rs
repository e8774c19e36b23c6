//! CoreTasks Backend
//!
//! Layered architecture:
//! - domain: Item entity, change records, errors
//! - repository: SQLite schema and row access
//! - context: the persistence gateway and its working set
//! - results: live ordered projection over the working set
//! - config: data directory and tunables

pub mod config;
pub mod context;
pub mod domain;
pub mod repository;
pub mod results;

pub use config::AppConfig;
pub use context::{
    DataController, PendingChanges, SaveOutcome, SaveReport, SharedController, WorkingSet,
};
pub use domain::{
    ChangeBatch, DomainError, DomainResult, Entity, IndexPath, Item, ItemId, ObjectChange,
    ObjectChangeKind, RowChange, TransactionId,
};
pub use results::{FetchRequest, FetchedResults, SortDescriptor, SortKey};
