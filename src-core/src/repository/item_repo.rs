//! Item Repository Implementation
//!
//! SQLite-backed implementation of Repository<Item>. Borrows a connection,
//! so the same code runs against a plain connection or an open transaction.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{DomainError, DomainResult, Item, ItemId};
use super::traits::{IdAllocator, Repository};

const SELECT_ITEM: &str = "SELECT id, text, completed FROM items";

/// SQLite implementation of Item repository
pub struct ItemRepository<'c> {
    conn: &'c Connection,
}

impl<'c> ItemRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Number of stored items
    pub fn count(&self) -> DomainResult<usize> {
        self.conn
            .query_row("SELECT COUNT(*) FROM items", [], |row| row.get::<_, i64>(0))
            .map(|n| n as usize)
            .map_err(|e| DomainError::Internal(e.to_string()))
    }
}

impl Repository<Item> for ItemRepository<'_> {
    fn create(&self, entity: &Item) -> DomainResult<Item> {
        self.conn
            .execute(
                "INSERT INTO items (id, text, completed) VALUES (?1, ?2, ?3)",
                params![entity.id.0, entity.text, entity.completed],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(err, _)
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    DomainError::Conflict(format!("Item {} already stored", entity.id))
                }
                other => DomainError::Internal(other.to_string()),
            })?;

        Ok(entity.clone())
    }

    fn find_by_id(&self, id: ItemId) -> DomainResult<Option<Item>> {
        self.conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_ITEM),
                params![id.0],
                row_to_item,
            )
            .optional()
            .map_err(|e| DomainError::Internal(e.to_string()))
    }

    fn list(&self) -> DomainResult<Vec<Item>> {
        // NULL text sorts first under ASC, matching Item::cmp_by_text
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY text ASC, id ASC", SELECT_ITEM))
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let rows = stmt
            .query_map([], row_to_item)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::Internal(e.to_string()))
    }

    fn update(&self, entity: &Item) -> DomainResult<Item> {
        let changed = self
            .conn
            .execute(
                "UPDATE items SET text = ?1, completed = ?2 WHERE id = ?3",
                params![entity.text, entity.completed, entity.id.0],
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if changed == 0 {
            return Err(DomainError::NotFound(format!("Item {} not found", entity.id)));
        }
        Ok(entity.clone())
    }

    fn delete(&self, id: ItemId) -> DomainResult<()> {
        self.conn
            .execute("DELETE FROM items WHERE id = ?1", params![id.0])
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        Ok(())
    }
}

impl IdAllocator<Item> for ItemRepository<'_> {
    fn next_id(&self) -> DomainResult<ItemId> {
        self.conn
            .query_row("SELECT COALESCE(MAX(id), 0) + 1 FROM items", [], |row| {
                row.get::<_, u32>(0)
            })
            .map(ItemId)
            .map_err(|e| DomainError::Internal(e.to_string()))
    }
}

/// Convert a database row to Item
fn row_to_item(row: &Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: ItemId(row.get(0)?),
        text: row.get(1)?,
        completed: row.get::<_, i64>(2)? != 0,
    })
}
