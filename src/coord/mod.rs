//! Single-active-form coordination
//!
//! Forms register their lifecycle actions here; the UI asks which actions
//! the currently visible form offers and invokes them.

pub mod types;
pub mod registry;
pub mod trigger;
pub mod resolver;
pub mod coordinator;

pub use types::*;
pub use registry::*;
pub use trigger::*;
pub use resolver::*;
pub use coordinator::*;
