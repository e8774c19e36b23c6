//! Commands Layer
//!
//! User intents as working-set mutations followed by an explicit save.

mod item;

pub use item::*;
