//! New Item Form
//!
//! Single text field with save and cancel. Both dismiss the form.

use core_tasks_lib::{DomainResult, ItemId};

use crate::commands;
use crate::context::AppContext;

pub struct NewItemForm {
    ctx: AppContext,
    text: String,
    dismissed: bool,
}

impl NewItemForm {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            text: String::new(),
            dismissed: false,
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    #[cfg(test)]
    pub fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    /// Create the item and save.
    ///
    /// Empty text does nothing and keeps the form open, and a dismissed form
    /// creates nothing. Otherwise the form is dismissed even when the save
    /// fails; the new item then stays pending in the working set.
    pub fn save(&mut self) -> DomainResult<Option<ItemId>> {
        if self.dismissed || self.text.is_empty() {
            return Ok(None);
        }
        self.dismissed = true;
        let text = std::mem::take(&mut self.text);
        commands::create_item(&self.ctx, &text).map(Some)
    }

    pub fn cancel(&mut self) {
        self.text.clear();
        self.dismissed = true;
    }
}
