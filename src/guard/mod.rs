//! Unsaved-changes protection
//!
//! One `UnsavedChangesGuard` per form instance, driven by tab changes,
//! navigation starts and window close.

pub mod events;
pub mod hooks;
pub mod unsaved;

pub use events::*;
pub use hooks::*;
pub use unsaved::*;
