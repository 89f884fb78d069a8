//! # ovi-vi: Modal editing over an ovi document
//!
//! - **[`mode`]**: navigation and insertion
//! - **[`command`]**: the pending-buffer grammar (counts, operators, motions)
//! - **[`dispatch`]**: the mode-scoped rule table
//! - **[`vi`]**: the engine tying them to a [`Document`](ovi_text::Document)

pub mod command;
pub mod dispatch;
pub mod mode;
pub mod vi;

pub use command::{Action, Invocation, Motion, Parse, Target};
pub use mode::Mode;
pub use vi::Vi;
