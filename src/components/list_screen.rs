//! List Screen
//!
//! Data source and delegate for the item table. Rows come from a
//! `FetchedResults` projection; `sync` forwards its change batches to the
//! table view so only affected rows are redrawn.

use core_tasks_lib::{ChangeBatch, DomainResult, FetchRequest, FetchedResults, IndexPath, RowChange};

use crate::commands;
use crate::context::AppContext;
use crate::models::ItemRow;
use super::detail_screen::DetailScreen;
use super::new_item_form::NewItemForm;
use super::table_view::{EditingStyle, RowAnimation, TableView};

pub struct ListScreen<T: TableView> {
    ctx: AppContext,
    results: FetchedResults,
    table: T,
}

impl<T: TableView> ListScreen<T> {
    /// Fetch the rows and draw them. A failed fetch is logged and shows an
    /// empty list.
    pub fn new(ctx: AppContext, mut table: T) -> Self {
        let mut results = FetchedResults::new(ctx.controller(), FetchRequest::all_items());
        if let Err(e) = results.perform_fetch() {
            log::debug!("List starts empty: {}", e);
        }
        table.reload_data();
        Self { ctx, results, table }
    }

    pub fn number_of_sections(&self) -> usize {
        self.results.section_count()
    }

    pub fn number_of_rows(&self, section: usize) -> usize {
        self.results.row_count(section)
    }

    /// Text for the cell at `path`
    pub fn cell_text(&self, path: IndexPath) -> Option<&str> {
        self.results.item_at(path).map(|item| item.display_text())
    }

    /// Every row of every section, in display order
    pub fn rows(&self) -> Vec<ItemRow> {
        (0..self.number_of_sections())
            .flat_map(|section| {
                (0..self.number_of_rows(section)).map(move |row| IndexPath::new(section, row))
            })
            .filter_map(|path| self.results.item_at(path).map(|item| ItemRow::new(path, item)))
            .collect()
    }

    pub fn editing_style(&self, _path: IndexPath) -> EditingStyle {
        EditingStyle::Delete
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    /// Apply pending working-set changes to the table.
    /// Returns the number of row operations performed.
    pub fn sync(&mut self) -> usize {
        self.results
            .process_pending_changes()
            .iter()
            .map(|batch| self.apply(batch))
            .sum()
    }

    fn apply(&mut self, batch: &ChangeBatch) -> usize {
        if batch.reloaded {
            self.table.reload_data();
            return 0;
        }

        self.table.begin_updates();
        for change in &batch.changes {
            match change {
                RowChange::Insert { new, .. } => self.table.insert_rows(&[*new], RowAnimation::Automatic),
                RowChange::Delete { old, .. } => self.table.delete_rows(&[*old], RowAnimation::Automatic),
                RowChange::Update { at, .. } => self.table.reload_rows(&[*at], RowAnimation::Automatic),
                RowChange::Move { old, new, .. } => self.table.move_row(*old, *new),
            }
        }
        self.table.end_updates();
        batch.changes.len()
    }

    /// Swipe-to-delete: remove the row's item and save immediately
    pub fn commit_delete(&mut self, path: IndexPath) -> DomainResult<()> {
        let Some(item) = self.results.item_at(path) else {
            log::warn!("Delete ignored, no row at {}", path);
            return Ok(());
        };
        let id = item.id;
        let result = commands::delete_item(&self.ctx, id).map(|_| ());
        self.sync();
        result
    }

    /// Detail screen for the row at `path`, if there is one
    pub fn detail_for(&self, path: IndexPath) -> Option<DetailScreen> {
        let item = self.results.item_at(path)?.clone();
        Some(DetailScreen::new(self.ctx.clone(), item))
    }

    pub fn new_item_form(&self) -> NewItemForm {
        NewItemForm::new(self.ctx.clone())
    }
}
