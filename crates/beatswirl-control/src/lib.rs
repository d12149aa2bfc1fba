//! BeatSwirl Control - Input handling for the animation
//!
//! This crate turns discrete input events into changes of the live
//! animation parameters and user presets:
//! - **Shortcuts**: key names, held-key tracking and key bindings
//! - **Interpreter**: the single entry point that mutates a [`Session`]
//! - **Persistence**: synchronous or background preset saving
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use beatswirl_control::{CommandInterpreter, HeldKeys, Key, Session};
//! use beatswirl_core::{Preset, PresetStore};
//!
//! let audio = std::fs::read("june.wav").unwrap();
//! let mut session = Session::new(audio, &Preset::default(), PresetStore::in_memory()).unwrap();
//! let mut interpreter = CommandInterpreter::new();
//! let held = HeldKeys::new();
//! interpreter.handle_event(Key::Char('z'), &held, &mut session).unwrap();
//! ```

#![allow(missing_docs)]

/// Error types
pub mod error;
/// Input event interpretation
pub mod interpreter;
/// Preset persistence strategies
pub mod persistence;
/// Keyboard shortcuts
pub mod shortcuts;
/// Background preset writer
pub mod writer;

// Re-exports
pub use error::{ControlError, Result};
pub use interpreter::{CommandInterpreter, Outcome, PresetSource, Session, StatusReport};
pub use persistence::{DirectPersistence, PresetPersistence};
pub use shortcuts::{Action, Binding, HeldKeys, Key, KeyBindings};
pub use writer::PresetWriter;
