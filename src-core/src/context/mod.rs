//! Persistence Gateway
//!
//! `DataController` owns the store connection and the one working set.
//! It is created once by the entry point and shared with every screen as
//! `Rc<DataController>`, which keeps it on a single thread.

mod working_set;

use chrono::{DateTime, Local};
use rusqlite::Connection;
use std::cell::{Cell, RefCell, RefMut};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::domain::{DomainError, DomainResult, Item, ItemId, ObjectChange};
use crate::repository::{open_in_memory, open_store, IdAllocator, ItemRepository, Repository};
use crate::results::FetchRequest;

pub use working_set::{PendingChanges, WorkingSet};

/// The gateway as handed to screens
pub type SharedController = Rc<DataController>;

/// Result of a successful flush
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReport {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    pub saved_at: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// Nothing was pending; the store was not touched
    NoChanges,
    Saved(SaveReport),
}

pub struct DataController {
    conn: Connection,
    store_path: Option<PathBuf>,
    working_set: RefCell<WorkingSet>,
    flush_count: Cell<u64>,
    last_saved_at: RefCell<Option<DateTime<Local>>>,
}

impl DataController {
    /// Open the store described by `config`.
    ///
    /// Fails with `DomainError::StoreUnavailable` if the data directory,
    /// schema or store file cannot be opened.
    pub fn open(config: &AppConfig) -> DomainResult<Self> {
        let path = config.store_path();
        let conn = open_store(&path)?;
        Self::with_connection(conn, Some(path), config.change_buffer)
    }

    /// Store file at an explicit path with default tunables
    pub fn open_at(path: impl AsRef<Path>) -> DomainResult<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = open_store(&path)?;
        Self::with_connection(conn, Some(path), AppConfig::default().change_buffer)
    }

    /// Private in-memory store, gone when the controller is dropped
    pub fn open_in_memory() -> DomainResult<Self> {
        let conn = open_in_memory()?;
        Self::with_connection(conn, None, AppConfig::default().change_buffer)
    }

    fn with_connection(conn: Connection, store_path: Option<PathBuf>, change_buffer: usize) -> DomainResult<Self> {
        let first_free_id = ItemRepository::new(&conn)
            .next_id()
            .map_err(DomainError::store_unavailable)?;

        Ok(Self {
            conn,
            store_path,
            working_set: RefCell::new(WorkingSet::new(first_free_id, change_buffer)),
            flush_count: Cell::new(0),
            last_saved_at: RefCell::new(None),
        })
    }

    pub fn shared(self) -> SharedController {
        Rc::new(self)
    }

    /// The shared edit buffer. Do not hold the guard across calls back into
    /// the controller.
    pub fn working_set(&self) -> RefMut<'_, WorkingSet> {
        self.working_set.borrow_mut()
    }

    /// Receiver for working-set changes published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ObjectChange> {
        self.working_set.borrow().subscribe()
    }

    pub fn has_changes(&self) -> bool {
        self.working_set.borrow().has_changes()
    }

    /// Run `request` against stored rows merged with pending in-memory state
    pub fn fetch(&self, request: &FetchRequest) -> DomainResult<Vec<Item>> {
        if request.entity != Item::ENTITY {
            return Err(DomainError::InvalidInput(format!(
                "Unknown entity {}",
                request.entity
            )));
        }

        let stored = ItemRepository::new(&self.conn).list()?;
        let mut ws = self.working_set.borrow_mut();
        ws.register_stored(stored);

        let mut items: Vec<Item> = ws.items().cloned().collect();
        request.sort(&mut items);
        Ok(items)
    }

    /// Look up one item, loading it from the store if it is not registered yet
    pub fn object(&self, id: ItemId) -> DomainResult<Option<Item>> {
        if let Some(item) = self.working_set.borrow().get(id) {
            return Ok(Some(item.clone()));
        }
        let Some(stored) = ItemRepository::new(&self.conn).find_by_id(id)? else {
            return Ok(None);
        };
        let mut ws = self.working_set.borrow_mut();
        ws.register_stored(vec![stored]);
        Ok(ws.get(id).cloned())
    }

    /// Flush pending changes to the store file.
    ///
    /// Clean working set: no disk access. On failure the error is logged and
    /// every pending change stays in the working set.
    pub fn save(&self) -> DomainResult<SaveOutcome> {
        let mut ws = self.working_set.borrow_mut();
        if !ws.has_changes() {
            log::debug!("Save skipped, no changes");
            return Ok(SaveOutcome::NoChanges);
        }

        let pending = ws.pending();
        if let Err(e) = self.flush(&pending) {
            log::error!("Unresolved error while saving: {}", e);
            return Err(e);
        }
        ws.mark_saved();

        let saved_at = Local::now();
        self.flush_count.set(self.flush_count.get() + 1);
        *self.last_saved_at.borrow_mut() = Some(saved_at);

        let report = SaveReport {
            inserted: pending.inserted.len(),
            updated: pending.updated.len(),
            deleted: pending.deleted.len(),
            saved_at,
        };
        log::info!(
            "Saved {} inserted, {} updated, {} deleted",
            report.inserted,
            report.updated,
            report.deleted
        );
        Ok(SaveOutcome::Saved(report))
    }

    fn flush(&self, pending: &PendingChanges) -> DomainResult<()> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        {
            let repo = ItemRepository::new(&tx);
            for id in &pending.deleted {
                repo.delete(*id)?;
            }
            for item in &pending.inserted {
                repo.create(item)?;
            }
            for item in &pending.updated {
                repo.update(item)?;
            }
        }

        // Dropping an uncommitted transaction rolls it back
        tx.commit().map_err(|e| DomainError::Internal(e.to_string()))
    }

    /// Store file location; None for in-memory stores
    pub fn store_path(&self) -> Option<&Path> {
        self.store_path.as_deref()
    }

    /// Number of flushes that reached the store
    pub fn flush_count(&self) -> u64 {
        self.flush_count.get()
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Local>> {
        *self.last_saved_at.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::STORE_FILE;

    fn stored_texts(path: &Path) -> Vec<String> {
        let conn = Connection::open(path).unwrap();
        ItemRepository::new(&conn)
            .list()
            .unwrap()
            .into_iter()
            .map(|i| i.text.unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_created_item_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE);

        {
            let controller = DataController::open_at(&path).unwrap();
            controller.working_set().insert(Some("Buy milk".into())).unwrap();
            controller.save().unwrap();
        }

        let controller = DataController::open_at(&path).unwrap();
        let items = controller.fetch(&FetchRequest::all_items()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].text.as_deref(), Some("Buy milk"));
    }

    #[test]
    fn test_second_save_is_a_no_op() {
        let controller = DataController::open_in_memory().unwrap();
        controller.working_set().insert(Some("a".into())).unwrap();

        assert!(matches!(controller.save().unwrap(), SaveOutcome::Saved(_)));
        assert_eq!(controller.save().unwrap(), SaveOutcome::NoChanges);
        assert_eq!(controller.flush_count(), 1);
        assert!(controller.last_saved_at().is_some());
    }

    #[test]
    fn test_save_without_changes_never_writes() {
        let controller = DataController::open_in_memory().unwrap();
        assert_eq!(controller.save().unwrap(), SaveOutcome::NoChanges);
        assert_eq!(controller.flush_count(), 0);
        assert!(controller.last_saved_at().is_none());
    }

    #[test]
    fn test_save_report_counts() {
        let controller = DataController::open_in_memory().unwrap();
        let (a, b) = {
            let mut ws = controller.working_set();
            (ws.insert(Some("a".into())).unwrap(), ws.insert(Some("b".into())).unwrap())
        };
        controller.save().unwrap();

        controller.working_set().set_text(a, Some("A".into())).unwrap();
        controller.working_set().delete(b).unwrap();
        controller.working_set().insert(Some("c".into())).unwrap();

        match controller.save().unwrap() {
            SaveOutcome::Saved(report) => {
                assert_eq!((report.inserted, report.updated, report.deleted), (1, 1, 1));
            }
            SaveOutcome::NoChanges => panic!("expected a flush"),
        }
    }

    #[test]
    fn test_delete_reaches_disk_only_after_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE);
        let controller = DataController::open_at(&path).unwrap();
        let id = controller.working_set().insert(Some("Buy milk".into())).unwrap();
        controller.save().unwrap();

        controller.working_set().delete(id).unwrap();
        let visible = controller.fetch(&FetchRequest::all_items()).unwrap();
        assert!(visible.is_empty());
        assert_eq!(stored_texts(&path), vec!["Buy milk".to_string()]);

        controller.save().unwrap();
        assert!(stored_texts(&path).is_empty());
    }

    #[test]
    fn test_discarded_edit_leaves_store_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE);
        let controller = DataController::open_at(&path).unwrap();
        let id = controller.working_set().insert(Some("Buy milk".into())).unwrap();
        controller.save().unwrap();

        controller.working_set().set_text(id, Some("Buy oat milk".into())).unwrap();
        controller.working_set().discard();

        assert_eq!(controller.save().unwrap(), SaveOutcome::NoChanges);
        assert_eq!(stored_texts(&path), vec!["Buy milk".to_string()]);
        let item = controller.object(id).unwrap().unwrap();
        assert_eq!(item.text.as_deref(), Some("Buy milk"));
    }

    #[test]
    fn test_failed_save_keeps_pending_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE);
        let controller = DataController::open_at(&path).unwrap();
        controller.working_set().insert(Some("Buy milk".into())).unwrap();

        let other = Connection::open(&path).unwrap();
        other.execute("DROP TABLE items", []).unwrap();

        assert!(controller.save().is_err());
        assert!(controller.has_changes());
        assert_eq!(controller.flush_count(), 0);

        other
            .execute(
                "CREATE TABLE items (id INTEGER PRIMARY KEY, text TEXT, completed INTEGER NOT NULL DEFAULT 0)",
                [],
            )
            .unwrap();
        assert!(matches!(controller.save().unwrap(), SaveOutcome::Saved(_)));
        assert_eq!(stored_texts(&path), vec!["Buy milk".to_string()]);
    }

    #[test]
    fn test_object_loads_unregistered_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE);
        {
            let controller = DataController::open_at(&path).unwrap();
            controller.working_set().insert(Some("stored".into())).unwrap();
            controller.save().unwrap();
        }

        let controller = DataController::open_at(&path).unwrap();
        assert!(controller.working_set().is_empty());
        let item = controller.object(ItemId(1)).unwrap().unwrap();
        assert_eq!(item.display_text(), "stored");
        assert!(controller.object(ItemId(2)).unwrap().is_none());
    }

    #[test]
    fn test_new_ids_continue_after_stored_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE);
        {
            let controller = DataController::open_at(&path).unwrap();
            controller.working_set().insert(Some("one".into())).unwrap();
            controller.working_set().insert(Some("two".into())).unwrap();
            controller.save().unwrap();
        }

        let controller = DataController::open_at(&path).unwrap();
        let id = controller.working_set().insert(Some("three".into())).unwrap();
        assert_eq!(id, ItemId(3));
        controller.save().unwrap();
    }

    #[test]
    fn test_open_reports_store_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let config = AppConfig::with_data_dir(blocker.join("data"));
        match DataController::open(&config) {
            Err(err) => assert!(err.is_fatal()),
            Ok(_) => panic!("store under a regular file must not open"),
        }
    }
}
