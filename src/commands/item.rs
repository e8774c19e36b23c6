//! Item Commands
//!
//! Each command mutates the working set and then saves. A failed save is
//! logged by the controller and returned; the mutation stays pending and is
//! still visible in the list.

use core_tasks_lib::{DomainResult, Item, ItemId, SaveOutcome};

use crate::context::AppContext;

/// Create a new item with `text`
pub fn create_item(ctx: &AppContext, text: &str) -> DomainResult<ItemId> {
    let id = ctx.working_set().insert(Some(text.to_string()))?;
    ctx.controller().save()?;
    Ok(id)
}

/// Replace an item's text
pub fn update_item_text(ctx: &AppContext, id: ItemId, text: &str) -> DomainResult<Item> {
    let item = ctx.working_set().set_text(id, Some(text.to_string()))?;
    ctx.controller().save()?;
    Ok(item)
}

/// Delete an item and save right away
pub fn delete_item(ctx: &AppContext, id: ItemId) -> DomainResult<Item> {
    let item = ctx.working_set().delete(id)?;
    ctx.controller().save()?;
    Ok(item)
}

/// Flush whatever is pending
pub fn save(ctx: &AppContext) -> DomainResult<SaveOutcome> {
    ctx.controller().save()
}
