//! Application Context
//!
//! Handed to every screen at construction time.

use core_tasks_lib::{DataController, SharedController, WorkingSet};
use std::cell::RefMut;

#[derive(Clone)]
pub struct AppContext {
    controller: SharedController,
}

impl AppContext {
    pub fn new(controller: SharedController) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> SharedController {
        self.controller.clone()
    }

    pub fn working_set(&self) -> RefMut<'_, WorkingSet> {
        self.controller.working_set()
    }
}

impl From<DataController> for AppContext {
    fn from(controller: DataController) -> Self {
        Self::new(controller.shared())
    }
}
