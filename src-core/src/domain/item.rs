//! Item Entity
//!
//! The single to-do record: optional text plus a completion flag.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use super::entity::Entity;

/// Row identity, assigned when the item enters the working set
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier
    pub id: ItemId,
    /// Item text content
    pub text: Option<String>,
    /// Completion status. Stored and loaded, nothing toggles it.
    pub completed: bool,
}

impl Item {
    /// Entity name used by fetch requests and log lines
    pub const ENTITY: &'static str = "Item";

    pub fn new(id: ItemId, text: Option<String>) -> Self {
        Self {
            id,
            text,
            completed: false,
        }
    }

    /// Text as shown in a list row
    pub fn display_text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Canonical list order: by text (absent first, then bytewise), then id.
    pub fn cmp_by_text(&self, other: &Item) -> Ordering {
        let by_text = match (&self.text, &other.text) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => a.as_bytes().cmp(b.as_bytes()),
        };
        by_text.then_with(|| self.id.cmp(&other.id))
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u32, text: Option<&str>) -> Item {
        Item::new(ItemId(id), text.map(str::to_string))
    }

    #[test]
    fn test_item_creation() {
        let item = item(1, Some("Test item"));
        assert_eq!(item.id(), ItemId(1));
        assert_eq!(item.display_text(), "Test item");
        assert!(!item.completed);
    }

    #[test]
    fn test_missing_text_sorts_first() {
        assert_eq!(item(2, None).cmp_by_text(&item(1, Some(""))), Ordering::Less);
        assert_eq!(item(1, Some("b")).cmp_by_text(&item(2, Some("a"))), Ordering::Greater);
    }

    #[test]
    fn test_ties_break_by_id() {
        assert_eq!(item(1, Some("x")).cmp_by_text(&item(2, Some("x"))), Ordering::Less);
    }

    #[test]
    fn test_uppercase_before_lowercase() {
        // Matches SQLite's BINARY collation
        assert_eq!(item(1, Some("banana")).cmp_by_text(&item(2, Some("Zebra"))), Ordering::Greater);
    }
}
