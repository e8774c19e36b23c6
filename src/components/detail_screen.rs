//! Detail Screen
//!
//! Edits the text of exactly one item. Built from an `Item`, so there is no
//! way to open it empty.

use core_tasks_lib::{DomainResult, Item};

use crate::commands;
use crate::context::AppContext;

pub struct DetailScreen {
    ctx: AppContext,
    item: Item,
    text: String,
    closed: bool,
}

impl DetailScreen {
    pub fn new(ctx: AppContext, item: Item) -> Self {
        let text = item.text.clone().unwrap_or_default();
        Self {
            ctx,
            item,
            text,
            closed: false,
        }
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    /// Contents of the text field
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    #[cfg(test)]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Write the field back to the item, save, and navigate back.
    /// A screen that is already closed writes nothing.
    pub fn confirm(&mut self) -> DomainResult<Item> {
        if self.closed {
            return Ok(self.item.clone());
        }
        self.closed = true;
        self.item = commands::update_item_text(&self.ctx, self.item.id, &self.text)?;
        Ok(self.item.clone())
    }

    /// Navigate back without touching the item
    pub fn back(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_tasks_lib::DataController;

    fn screen(text: &str) -> (AppContext, DetailScreen) {
        let ctx: AppContext = DataController::open_in_memory().unwrap().into();
        let id = commands::create_item(&ctx, text).unwrap();
        let item = ctx.working_set().get(id).cloned().unwrap();
        let screen = DetailScreen::new(ctx.clone(), item);
        (ctx, screen)
    }

    #[test]
    fn test_field_is_prefilled() {
        let (_ctx, screen) = screen("Buy milk");
        assert_eq!(screen.text(), "Buy milk");
        assert!(!screen.is_closed());
    }

    #[test]
    fn test_confirm_saves_and_closes() {
        let (ctx, mut screen) = screen("Buy milk");
        screen.set_text("Buy oat milk");

        let updated = screen.confirm().unwrap();

        assert!(screen.is_closed());
        assert_eq!(updated.display_text(), "Buy oat milk");
        assert!(!ctx.controller().has_changes());
        assert_eq!(ctx.controller().flush_count(), 2);
    }

    #[test]
    fn test_back_without_confirm_changes_nothing() {
        let (ctx, mut screen) = screen("Buy milk");
        screen.set_text("Something else");

        screen.back();

        let id = screen.item().id;
        assert_eq!(ctx.working_set().get(id).unwrap().display_text(), "Buy milk");
        assert!(!ctx.controller().has_changes());
    }

    #[test]
    fn test_closed_screen_does_not_save_again() {
        let (ctx, mut screen) = screen("Buy milk");
        screen.set_text("Buy oat milk");
        screen.confirm().unwrap();

        screen.set_text("Buy soy milk");
        let item = screen.confirm().unwrap();

        assert_eq!(item.display_text(), "Buy oat milk");
        assert_eq!(ctx.controller().flush_count(), 2);
    }

    #[test]
    fn test_confirm_after_item_was_deleted() {
        let (ctx, mut screen) = screen("Buy milk");
        commands::delete_item(&ctx, screen.item().id).unwrap();

        assert!(screen.confirm().is_err());
    }
}
