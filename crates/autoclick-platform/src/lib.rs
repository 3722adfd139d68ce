//! autoclick-platform: platform-specific I/O boundary for autoclick.
//!
//! This crate provides:
//! - Click injection at the current cursor position via `enigo`
//! - Global keyboard/mouse hook via `rdev`, delivering `autoclick_core::InputEvent`s

mod error;
mod injector;
mod input_hook;

// Re-export error types
pub use error::{PlatformError, PlatformResult};

// Re-export click injection
pub use injector::{EnigoInjector, NoopInjector};

// Re-export input hook
pub use input_hook::{canonical_key_name, start_input_hook, InputHookHandle};
