//! Table View
//!
//! What the list screen needs from whatever draws the rows.

use core_tasks_lib::IndexPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowAnimation {
    #[default]
    Automatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditingStyle {
    Delete,
}

/// Row-level drawing surface. Updates arrive between `begin_updates` and
/// `end_updates`, one call per row change, in the order they happened.
pub trait TableView {
    /// Forget everything and redraw from the data source
    fn reload_data(&mut self);

    fn begin_updates(&mut self);
    fn end_updates(&mut self);

    fn insert_rows(&mut self, paths: &[IndexPath], animation: RowAnimation);
    fn delete_rows(&mut self, paths: &[IndexPath], animation: RowAnimation);
    fn reload_rows(&mut self, paths: &[IndexPath], animation: RowAnimation);
    fn move_row(&mut self, from: IndexPath, to: IndexPath);
}
