//! Domain Layer
//!
//! Contains the Item entity, change records, and core abstractions.
//! This layer has NO external dependencies (except serde for serialization).

mod change;
mod entity;
mod item;

pub use change::{ChangeBatch, IndexPath, ObjectChange, ObjectChangeKind, RowChange, TransactionId};
pub use entity::{DomainError, DomainResult, Entity};
pub use item::{Item, ItemId};
