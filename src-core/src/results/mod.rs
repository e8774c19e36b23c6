//! Fetched Results
//!
//! A live, ordered, sectioned projection of the items matching a fetch
//! request. Subscribes to the working set's change channel and turns each
//! object change into the row change a list needs to stay in sync.

mod request;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

use crate::context::SharedController;
use crate::domain::{
    ChangeBatch, DomainResult, IndexPath, Item, ItemId, ObjectChange, ObjectChangeKind, RowChange,
    TransactionId,
};

pub use request::{FetchRequest, SortDescriptor, SortKey};

/// No section key: everything lives in section 0
const SECTION: usize = 0;

const BATCH_BUFFER: usize = 64;

pub struct FetchedResults {
    controller: SharedController,
    request: FetchRequest,
    changes: broadcast::Receiver<ObjectChange>,
    rows: Vec<Item>,
    fetched: bool,
    last_txn: TransactionId,
    batches: broadcast::Sender<ChangeBatch>,
}

impl FetchedResults {
    /// Attach to the controller's change channel. Call `perform_fetch` to
    /// populate.
    pub fn new(controller: SharedController, request: FetchRequest) -> Self {
        let changes = controller.subscribe();
        let (batches, _) = broadcast::channel(BATCH_BUFFER);
        Self {
            controller,
            request,
            changes,
            rows: Vec::new(),
            fetched: false,
            last_txn: TransactionId(0),
            batches,
        }
    }

    pub fn request(&self) -> &FetchRequest {
        &self.request
    }

    /// Run the request. On failure the error is logged and the projection
    /// is left empty.
    pub fn perform_fetch(&mut self) -> DomainResult<()> {
        // Anything already published is part of what the fetch returns
        loop {
            match self.changes.try_recv() {
                Ok(change) => self.last_txn = change.txn,
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        match self.controller.fetch(&self.request) {
            Ok(items) => {
                log::debug!("Fetched {} {} row(s)", items.len(), self.request.entity);
                self.rows = items;
                self.fetched = true;
                Ok(())
            }
            Err(e) => {
                log::error!("Unresolved error while fetching: {}", e);
                self.rows.clear();
                self.fetched = false;
                Err(e)
            }
        }
    }

    pub fn section_count(&self) -> usize {
        if self.fetched {
            1
        } else {
            0
        }
    }

    pub fn row_count(&self, section: usize) -> usize {
        if self.fetched && section == SECTION {
            self.rows.len()
        } else {
            0
        }
    }

    pub fn item_at(&self, path: IndexPath) -> Option<&Item> {
        if path.section != SECTION {
            return None;
        }
        self.rows.get(path.row)
    }

    pub fn index_path_of(&self, id: ItemId) -> Option<IndexPath> {
        self.position_of(id).map(|row| IndexPath::new(SECTION, row))
    }

    /// Current rows, in order
    pub fn fetched_items(&self) -> &[Item] {
        &self.rows
    }

    /// Receive every batch this projection publishes from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeBatch> {
        self.batches.subscribe()
    }

    /// Apply one object change and report where it landed.
    ///
    /// Returns None when the projection is not populated or the change does
    /// not touch any row.
    pub fn on_change(&mut self, change: &ObjectChange) -> Option<RowChange> {
        self.last_txn = change.txn;
        if !self.fetched {
            return None;
        }

        let id = change.item_id();
        let old = self.position_of(id);

        match change.kind {
            ObjectChangeKind::Deleted => {
                let row = old?;
                let item = self.rows.remove(row);
                Some(RowChange::Delete {
                    item,
                    old: IndexPath::new(SECTION, row),
                })
            }
            ObjectChangeKind::Inserted | ObjectChangeKind::Updated => {
                if let Some(row) = old {
                    self.rows.remove(row);
                }
                let item = change.item.clone();
                let new = self
                    .rows
                    .partition_point(|probe| self.request.compare(probe, &item).is_lt());
                self.rows.insert(new, item.clone());

                let new = IndexPath::new(SECTION, new);
                Some(match old.map(|row| IndexPath::new(SECTION, row)) {
                    None => RowChange::Insert { item, new },
                    Some(old) if old == new => RowChange::Update { item, at: new },
                    Some(old) => RowChange::Move { item, old, new },
                })
            }
        }
    }

    /// Drain the change channel and group the resulting row changes by
    /// transaction, in arrival order. Each batch is also published to
    /// subscribers.
    pub fn process_pending_changes(&mut self) -> Vec<ChangeBatch> {
        let mut batches: Vec<ChangeBatch> = Vec::new();

        loop {
            match self.changes.try_recv() {
                Ok(change) => {
                    let Some(row) = self.on_change(&change) else {
                        continue;
                    };
                    match batches.last_mut() {
                        Some(batch) if batch.txn == change.txn => batch.changes.push(row),
                        _ => {
                            let mut batch = ChangeBatch::new(change.txn);
                            batch.changes.push(row);
                            batches.push(batch);
                        }
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    log::warn!("Missed {} change(s), refetching", skipped);
                    // The refetch supersedes whatever was collected so far
                    batches.clear();
                    if let Err(e) = self.perform_fetch() {
                        log::debug!("Refetch after lag left the projection empty: {}", e);
                    }
                    let mut batch = ChangeBatch::new(self.last_txn);
                    batch.reloaded = true;
                    batches.push(batch);
                    break;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        for batch in &batches {
            // Nobody listening is fine
            let _ = self.batches.send(batch.clone());
        }
        batches
    }

    fn position_of(&self, id: ItemId) -> Option<usize> {
        self.rows.iter().position(|item| item.id == id)
    }
}
