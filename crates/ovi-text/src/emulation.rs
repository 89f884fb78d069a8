//! The capability surface an editing emulation offers its host.
//!
//! An emulation is anything that [handles events](HandlesEvents) against a
//! [`Document`] and [reports a status line](ReportsStatus). Features the
//! emulation deliberately leaves to the host (prompts, persistence,
//! quitting, error display) travel the other way as [`Request`]s over a
//! channel handed to the emulation at construction.

use std::sync::mpsc::Sender;

use crate::document::Document;
use crate::event::{Event, InputId};

/// Consume one input event.
pub trait HandlesEvents {
    /// Apply `event`, addressed to input `source`, to `doc`.
    ///
    /// Returns `false` when no binding matched, so an outer layer may try
    /// its own. Never fails: bad input is absorbed locally.
    fn handle_event(&mut self, doc: &mut Document, source: InputId, event: &Event) -> bool;
}

/// Project the current state as one status line.
pub trait ReportsStatus {
    fn status(&self, doc: &Document) -> String;
}

/// A complete emulation variant.
pub trait Emulation: HandlesEvents + ReportsStatus {}

impl<T: HandlesEvents + ReportsStatus> Emulation for T {}

/// Something the emulation asks its host to do.
///
/// The prompt requests are part of the host contract; no vi command opens a
/// prompt yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Open a prompt; events typed into it are addressed to `id`.
    AskInput { id: InputId, prompt: String },
    /// Close a prompt opened with `AskInput`.
    CloseInput(InputId),
    /// Replace a prompt's text and caret.
    UpdateInput { id: InputId, text: String, pos: usize },
    /// Write the document, to `name` if given, else its own path.
    Save { name: Option<String>, force: bool },
    /// End the session.
    Quit { force: bool },
    /// Show an error message.
    Error(String),
}

/// Sending half of the request channel, as held by an emulation.
pub type Requests = Sender<Request>;
