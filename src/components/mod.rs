//! Screens
//!
//! List, create form and detail editor, plus the table-view seam they draw
//! through.

mod detail_screen;
mod list_screen;
mod new_item_form;
mod table_view;

pub use detail_screen::DetailScreen;
pub use list_screen::ListScreen;
pub use new_item_form::NewItemForm;
pub use table_view::{EditingStyle, RowAnimation, TableView};
