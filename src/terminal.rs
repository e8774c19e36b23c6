//! Terminal Table
//!
//! Table view for the line-oriented front end. Rows are printed by the app
//! after each command; this view only records what changed so the app can
//! report it.

use core_tasks_lib::IndexPath;

use crate::components::{RowAnimation, TableView};

#[derive(Debug, Default)]
pub struct TerminalTable {
    /// Row operations of the last update block
    last_updates: Vec<String>,
    in_update: bool,
}

impl TerminalTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Human readable summary of the last update block
    pub fn last_updates(&self) -> &[String] {
        &self.last_updates
    }

    fn record(&mut self, op: String) {
        log::debug!("table: {}", op);
        if !self.in_update {
            self.last_updates.clear();
        }
        self.last_updates.push(op);
    }
}

impl TableView for TerminalTable {
    fn reload_data(&mut self) {
        self.last_updates.clear();
        self.last_updates.push("reloaded all rows".to_string());
        log::debug!("table: reload");
    }

    fn begin_updates(&mut self) {
        self.last_updates.clear();
        self.in_update = true;
    }

    fn end_updates(&mut self) {
        self.in_update = false;
    }

    fn insert_rows(&mut self, paths: &[IndexPath], _animation: RowAnimation) {
        for path in paths {
            self.record(format!("inserted row {}", path.row + 1));
        }
    }

    fn delete_rows(&mut self, paths: &[IndexPath], _animation: RowAnimation) {
        for path in paths {
            self.record(format!("deleted row {}", path.row + 1));
        }
    }

    fn reload_rows(&mut self, paths: &[IndexPath], _animation: RowAnimation) {
        for path in paths {
            self.record(format!("updated row {}", path.row + 1));
        }
    }

    fn move_row(&mut self, from: IndexPath, to: IndexPath) {
        self.record(format!("moved row {} to {}", from.row + 1, to.row + 1));
    }
}
