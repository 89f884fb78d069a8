//! # ovi-text: Editing primitives shared by every ovi emulation
//!
//! - **[`position`]**: `Position` (line, col) and `Range` types, 0-indexed
//! - **[`buffer`]**: `Buffer`, a line sequence over a rope, with one-pass
//!   multi-cursor mutation primitives
//! - **[`cursor`]**: validated `Cursor`s, wrapping movement, `CursorSet`
//! - **[`selection`]**: fluid, line and block selections
//! - **[`word`]**: word and WORD motions
//! - **[`document`]**: buffer + cursors + selection + file, load and save
//! - **[`event`]** / **[`emulation`]**: the surface an emulation exposes to
//!   its host
//! - **[`options`]** / **[`diagnostics`]**: TOML options and the injected
//!   tracing capability

pub mod buffer;
pub mod cursor;
pub mod diagnostics;
pub mod document;
pub mod emulation;
pub mod event;
pub mod options;
pub mod position;
pub mod selection;
pub mod word;

pub use buffer::{Buffer, LineEnding, Side};
pub use cursor::{Cursor, CursorSet, Direction};
pub use diagnostics::Diagnostics;
pub use document::{Document, LoadError, SaveError};
pub use emulation::{Emulation, HandlesEvents, ReportsStatus, Request};
pub use event::{Event, InputEvent, InputId, Key, KeyEvent, Modifiers};
pub use options::{ConfigError, Options};
pub use position::{Position, Range};
pub use selection::{Selection, Shape};
