//! Repository Integration Tests
//!
//! Tests for ItemRepository with in-memory and on-disk SQLite databases.

#[cfg(test)]
mod tests {
    use crate::domain::{DomainError, Item, ItemId};
    use crate::repository::{open_in_memory, open_store, IdAllocator, ItemRepository, Repository, STORE_FILE};

    fn item(id: u32, text: &str) -> Item {
        Item::new(ItemId(id), Some(text.to_string()))
    }

    #[test]
    fn test_create_item() {
        let conn = open_in_memory().expect("Failed to init test DB");
        let repo = ItemRepository::new(&conn);

        let created = repo.create(&item(1, "Test item")).expect("Failed to create");

        assert_eq!(created.id, ItemId(1));
        assert_eq!(created.text.as_deref(), Some("Test item"));
        assert!(!created.completed);
    }

    #[test]
    fn test_create_duplicate_id_conflicts() {
        let conn = open_in_memory().unwrap();
        let repo = ItemRepository::new(&conn);

        repo.create(&item(1, "first")).unwrap();
        let err = repo.create(&item(1, "second")).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn test_find_by_id() {
        let conn = open_in_memory().unwrap();
        let repo = ItemRepository::new(&conn);

        repo.create(&item(4, "Find me")).unwrap();

        let found = repo.find_by_id(ItemId(4)).expect("Find failed");
        assert_eq!(found.unwrap().text.as_deref(), Some("Find me"));
        assert!(repo.find_by_id(ItemId(5)).unwrap().is_none());
    }

    #[test]
    fn test_list_is_ordered_by_text() {
        let conn = open_in_memory().unwrap();
        let repo = ItemRepository::new(&conn);

        repo.create(&item(1, "Call mom")).unwrap();
        repo.create(&item(2, "Buy milk")).unwrap();
        repo.create(&Item::new(ItemId(3), None)).unwrap();

        let texts: Vec<_> = repo
            .list()
            .expect("List failed")
            .into_iter()
            .map(|i| i.text)
            .collect();
        assert_eq!(
            texts,
            vec![None, Some("Buy milk".to_string()), Some("Call mom".to_string())]
        );
    }

    #[test]
    fn test_update_item() {
        let conn = open_in_memory().unwrap();
        let repo = ItemRepository::new(&conn);

        let mut created = repo.create(&item(1, "Original")).unwrap();
        created.text = Some("Updated".to_string());
        created.completed = true;

        repo.update(&created).expect("Update failed");
        let found = repo.find_by_id(ItemId(1)).unwrap().unwrap();
        assert_eq!(found.text.as_deref(), Some("Updated"));
        assert!(found.completed);
    }

    #[test]
    fn test_update_missing_item() {
        let conn = open_in_memory().unwrap();
        let repo = ItemRepository::new(&conn);

        let err = repo.update(&item(9, "ghost")).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn test_delete_item() {
        let conn = open_in_memory().unwrap();
        let repo = ItemRepository::new(&conn);

        repo.create(&item(1, "To delete")).unwrap();
        repo.delete(ItemId(1)).expect("Delete failed");

        assert!(repo.find_by_id(ItemId(1)).unwrap().is_none());
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_next_id() {
        let conn = open_in_memory().unwrap();
        let repo = ItemRepository::new(&conn);

        assert_eq!(repo.next_id().unwrap(), ItemId(1));
        repo.create(&item(7, "seven")).unwrap();
        assert_eq!(repo.next_id().unwrap(), ItemId(8));
    }

    #[test]
    fn test_rows_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE);

        {
            let conn = open_store(&path).unwrap();
            ItemRepository::new(&conn).create(&item(1, "Buy milk")).unwrap();
        }

        let conn = open_store(&path).unwrap();
        let items = ItemRepository::new(&conn).list().unwrap();
        assert_eq!(items, vec![item(1, "Buy milk")]);
    }
}
