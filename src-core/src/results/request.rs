//! Fetch Request
//!
//! The one query the application runs: every Item, ordered by text.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::domain::Item;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDescriptor {
    pub key: SortKey,
    pub ascending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub entity: String,
    pub sort: SortDescriptor,
}

impl FetchRequest {
    /// All items, ascending by text, no predicate
    pub fn all_items() -> Self {
        Self {
            entity: Item::ENTITY.to_string(),
            sort: SortDescriptor {
                key: SortKey::Text,
                ascending: true,
            },
        }
    }

    pub fn compare(&self, a: &Item, b: &Item) -> Ordering {
        let ord = match self.sort.key {
            SortKey::Text => a.cmp_by_text(b),
        };
        if self.sort.ascending {
            ord
        } else {
            ord.reverse()
        }
    }

    pub fn sort(&self, items: &mut [Item]) {
        items.sort_by(|a, b| self.compare(a, b));
    }
}

impl Default for FetchRequest {
    fn default() -> Self {
        Self::all_items()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ItemId;

    fn items(texts: &[&str]) -> Vec<Item> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Item::new(ItemId(i as u32 + 1), Some(t.to_string())))
            .collect()
    }

    #[test]
    fn test_sort_ascending_by_text() {
        let mut list = items(&["Call mom", "Buy milk", "Walk dog"]);
        FetchRequest::all_items().sort(&mut list);
        let texts: Vec<_> = list.iter().map(Item::display_text).collect();
        assert_eq!(texts, vec!["Buy milk", "Call mom", "Walk dog"]);
    }

    #[test]
    fn test_sort_descending() {
        let mut request = FetchRequest::all_items();
        request.sort.ascending = false;
        let mut list = items(&["a", "c", "b"]);
        request.sort(&mut list);
        let texts: Vec<_> = list.iter().map(Item::display_text).collect();
        assert_eq!(texts, vec!["c", "b", "a"]);
    }
}
