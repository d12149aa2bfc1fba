//! Keyboard shortcuts and held-key tracking

mod bindings;
mod keys;

pub use bindings::*;
pub use keys::*;
