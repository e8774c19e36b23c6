//! Frontend Models
//!
//! What a rendered list row looks like.

use core_tasks_lib::{IndexPath, Item, ItemId};
use serde::{Deserialize, Serialize};

/// One rendered row of the item list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRow {
    pub id: ItemId,
    pub section: usize,
    pub row: usize,
    pub text: String,
    pub completed: bool,
}

impl ItemRow {
    pub fn new(path: IndexPath, item: &Item) -> Self {
        Self {
            id: item.id,
            section: path.section,
            row: path.row,
            text: item.display_text().to_string(),
            completed: item.completed,
        }
    }
}
