//! Working Set
//!
//! The in-memory edit buffer. Holds every registered item, tracks which ones
//! were inserted, updated or deleted since the last flush, and publishes an
//! `ObjectChange` for each mutation.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use tokio::sync::broadcast;

use crate::domain::{DomainError, DomainResult, Item, ItemId, ObjectChange, ObjectChangeKind, TransactionId};

/// Snapshot of everything a flush has to write
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingChanges {
    pub inserted: Vec<Item>,
    pub updated: Vec<Item>,
    pub deleted: Vec<ItemId>,
}

impl PendingChanges {
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }
}

pub struct WorkingSet {
    /// Current state of every live item
    objects: BTreeMap<ItemId, Item>,
    /// Last durable state of every item known to be on disk
    committed: HashMap<ItemId, Item>,
    inserted: BTreeSet<ItemId>,
    updated: BTreeSet<ItemId>,
    deleted: BTreeSet<ItemId>,
    dirty: bool,
    /// Wider than `ItemId` so running out of ids is an error, not an overflow
    next_id: u64,
    last_txn: TransactionId,
    open_batch: Option<TransactionId>,
    changes: broadcast::Sender<ObjectChange>,
}

impl WorkingSet {
    pub(crate) fn new(first_free_id: ItemId, change_buffer: usize) -> Self {
        let (changes, _) = broadcast::channel(change_buffer.max(1));
        Self {
            objects: BTreeMap::new(),
            committed: HashMap::new(),
            inserted: BTreeSet::new(),
            updated: BTreeSet::new(),
            deleted: BTreeSet::new(),
            dirty: false,
            next_id: u64::from(first_free_id.0.max(1)),
            last_txn: TransactionId(0),
            open_batch: None,
            changes,
        }
    }

    /// New receiver for every change published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ObjectChange> {
        self.changes.subscribe()
    }

    /// True when something changed since the last flush or discard
    pub fn has_changes(&self) -> bool {
        self.dirty
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.objects.get(&id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Live items in id order
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.objects.values()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Create a new item in memory
    pub fn insert(&mut self, text: Option<String>) -> DomainResult<ItemId> {
        let id = u32::try_from(self.next_id)
            .map(ItemId)
            .map_err(|_| DomainError::Internal("No item ids left".to_string()))?;
        self.next_id += 1;

        let item = Item::new(id, text);
        self.objects.insert(id, item.clone());
        self.inserted.insert(id);
        self.dirty = true;

        let txn = self.begin_txn();
        self.publish(txn, ObjectChangeKind::Inserted, item);
        Ok(id)
    }

    /// Mutate an item in place. The id cannot be changed.
    ///
    /// Leaving the item unchanged records nothing.
    pub fn update(&mut self, id: ItemId, f: impl FnOnce(&mut Item)) -> DomainResult<Item> {
        let item = self
            .objects
            .get_mut(&id)
            .ok_or_else(|| DomainError::NotFound(format!("Item {} not found", id)))?;

        let before = item.clone();
        f(item);
        item.id = id;
        if *item == before {
            return Ok(before);
        }
        let after = item.clone();

        if !self.inserted.contains(&id) {
            self.updated.insert(id);
        }
        self.dirty = true;

        let txn = self.begin_txn();
        self.publish(txn, ObjectChangeKind::Updated, after.clone());
        Ok(after)
    }

    pub fn set_text(&mut self, id: ItemId, text: Option<String>) -> DomainResult<Item> {
        self.update(id, |item| item.text = text)
    }

    /// Remove an item; returns its last in-memory state
    pub fn delete(&mut self, id: ItemId) -> DomainResult<Item> {
        let item = self
            .objects
            .remove(&id)
            .ok_or_else(|| DomainError::NotFound(format!("Item {} not found", id)))?;

        // Never flushed: forgetting it is enough
        if !self.inserted.remove(&id) {
            self.updated.remove(&id);
            self.deleted.insert(id);
        }
        self.dirty = true;

        let txn = self.begin_txn();
        self.publish(txn, ObjectChangeKind::Deleted, item.clone());
        Ok(item)
    }

    /// Run several mutations as one transaction
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut WorkingSet) -> R) -> R {
        if self.open_batch.is_some() {
            return f(self);
        }
        self.last_txn = self.last_txn.next();
        self.open_batch = Some(self.last_txn);
        let result = f(self);
        self.open_batch = None;
        result
    }

    /// Throw away every unsaved change and return to the last durable state.
    /// The reverting changes are published as one transaction.
    pub fn discard(&mut self) -> usize {
        let inserted = std::mem::take(&mut self.inserted);
        let updated = std::mem::take(&mut self.updated);
        let deleted = std::mem::take(&mut self.deleted);
        let reverted = inserted.len() + updated.len() + deleted.len();

        self.batch(|ws| {
            for id in inserted {
                if let Some(item) = ws.objects.remove(&id) {
                    let txn = ws.begin_txn();
                    ws.publish(txn, ObjectChangeKind::Deleted, item);
                }
            }
            for id in updated {
                if let Some(original) = ws.committed.get(&id).cloned() {
                    ws.objects.insert(id, original.clone());
                    let txn = ws.begin_txn();
                    ws.publish(txn, ObjectChangeKind::Updated, original);
                }
            }
            for id in deleted {
                if let Some(original) = ws.committed.get(&id).cloned() {
                    ws.objects.insert(id, original.clone());
                    let txn = ws.begin_txn();
                    ws.publish(txn, ObjectChangeKind::Inserted, original);
                }
            }
        });
        self.dirty = false;

        if reverted > 0 {
            log::info!("Discarded {} unsaved change(s)", reverted);
        }
        reverted
    }

    /// What a flush has to write right now
    pub fn pending(&self) -> PendingChanges {
        let live = |ids: &BTreeSet<ItemId>| -> Vec<Item> {
            ids.iter().filter_map(|id| self.objects.get(id).cloned()).collect()
        };
        PendingChanges {
            inserted: live(&self.inserted),
            updated: live(&self.updated),
            deleted: self.deleted.iter().copied().collect(),
        }
    }

    /// Make stored rows known to the working set.
    ///
    /// Rows already registered keep their in-memory state; rows deleted in
    /// memory stay deleted.
    pub(crate) fn register_stored(&mut self, stored: Vec<Item>) {
        for item in stored {
            if self.deleted.contains(&item.id) || self.objects.contains_key(&item.id) {
                continue;
            }
            self.next_id = self.next_id.max(u64::from(item.id.0) + 1);
            self.committed.insert(item.id, item.clone());
            self.objects.insert(item.id, item);
        }
    }

    /// Everything pending is now durable
    pub(crate) fn mark_saved(&mut self) {
        for id in std::mem::take(&mut self.inserted)
            .into_iter()
            .chain(std::mem::take(&mut self.updated))
        {
            if let Some(item) = self.objects.get(&id) {
                self.committed.insert(id, item.clone());
            }
        }
        for id in std::mem::take(&mut self.deleted) {
            self.committed.remove(&id);
        }
        self.dirty = false;
    }

    fn begin_txn(&mut self) -> TransactionId {
        if let Some(txn) = self.open_batch {
            return txn;
        }
        self.last_txn = self.last_txn.next();
        self.last_txn
    }

    fn publish(&self, txn: TransactionId, kind: ObjectChangeKind, item: Item) {
        // No subscribers is fine; nobody is watching yet
        if self.changes.send(ObjectChange { txn, kind, item }).is_err() {
            log::trace!("No subscribers for {:?} change", kind);
        }
    }
}
