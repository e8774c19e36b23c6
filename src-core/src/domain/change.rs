//! Change Records
//!
//! Two levels of change notification:
//! - `ObjectChange`: what happened to an item in the working set
//! - `RowChange`: where that lands in an ordered projection
//!
//! Both carry a `TransactionId`; consecutive records with the same id
//! belong to one logical transaction.

use serde::{Deserialize, Serialize};
use super::item::{Item, ItemId};

/// Groups consecutive change records into one logical transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub u64);

impl TransactionId {
    pub fn next(self) -> Self {
        TransactionId(self.0 + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectChangeKind {
    Inserted,
    Updated,
    Deleted,
}

/// A single working-set mutation, published on the change channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectChange {
    pub txn: TransactionId,
    pub kind: ObjectChangeKind,
    /// State after the change (state before it, for deletes)
    pub item: Item,
}

impl ObjectChange {
    pub fn item_id(&self) -> ItemId {
        self.item.id
    }
}

/// Position of a row in a sectioned list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndexPath {
    pub section: usize,
    pub row: usize,
}

impl IndexPath {
    pub fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }
}

impl std::fmt::Display for IndexPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.section, self.row)
    }
}

/// Row-level change emitted by a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RowChange {
    Insert { item: Item, new: IndexPath },
    Delete { item: Item, old: IndexPath },
    Update { item: Item, at: IndexPath },
    Move { item: Item, old: IndexPath, new: IndexPath },
}

impl RowChange {
    pub fn item(&self) -> &Item {
        match self {
            RowChange::Insert { item, .. }
            | RowChange::Delete { item, .. }
            | RowChange::Update { item, .. }
            | RowChange::Move { item, .. } => item,
        }
    }

    /// Position before the change, if the row existed
    pub fn old_index(&self) -> Option<IndexPath> {
        match self {
            RowChange::Insert { .. } => None,
            RowChange::Delete { old, .. } | RowChange::Move { old, .. } => Some(*old),
            RowChange::Update { at, .. } => Some(*at),
        }
    }

    /// Position after the change, if the row still exists
    pub fn new_index(&self) -> Option<IndexPath> {
        match self {
            RowChange::Delete { .. } => None,
            RowChange::Insert { new, .. } | RowChange::Move { new, .. } => Some(*new),
            RowChange::Update { at, .. } => Some(*at),
        }
    }
}

/// All row changes of one transaction, in the order they happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeBatch {
    pub txn: TransactionId,
    pub changes: Vec<RowChange>,
    /// Set when the projection lost track of the channel and refetched;
    /// consumers should reload everything instead of applying `changes`.
    pub reloaded: bool,
}

impl ChangeBatch {
    pub fn new(txn: TransactionId) -> Self {
        Self {
            txn,
            changes: Vec::new(),
            reloaded: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && !self.reloaded
    }
}
