// SPDX-License-Identifier: MIT
//
// Session: the host side of an emulation.
//
// The session owns the document and the emulation, routes events from host
// input sources to emulation input ids, and serves whatever the emulation
// asks of it over the request channel:
//
//   host event → source map → handle_event → drain requests → push status
//
// Source 0 is the main editing area and always maps to the main input.
// Prompts opened with `AskInput` get a fresh source from the frontend and
// keep it until `CloseInput`.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::mpsc::{Receiver, TryRecvError};

use tracing::{debug, info, warn};

use ovi_text::{Diagnostics, Document, Emulation, Event, InputEvent, InputId, Request};

// ─── Sources ─────────────────────────────────────────────────────────────────

/// A host-side input: the editing area, a prompt line, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(pub u32);

impl SourceId {
    pub const MAIN: Self = Self(0);
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source#{}", self.0)
    }
}

/// An event as the host saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostEvent {
    pub source: SourceId,
    pub event: Event,
}

impl HostEvent {
    pub fn main(event: impl Into<Event>) -> Self {
        Self {
            source: SourceId::MAIN,
            event: event.into(),
        }
    }
}

// ─── Frontend ────────────────────────────────────────────────────────────────

/// What the session does after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// Display surface driven by the session.
///
/// Only [`set_status`](Frontend::set_status) and
/// [`set_error`](Frontend::set_error) are required; a frontend without
/// prompts still hands out a fresh source per request so the mapping stays
/// consistent.
pub trait Frontend {
    fn set_status(&mut self, text: &str);

    fn set_error(&mut self, text: &str);

    /// Open a prompt and return the source its events will carry.
    fn ask_input(&mut self, prompt: &str) -> SourceId;

    fn close_input(&mut self, _source: SourceId) {}

    fn update_input(&mut self, _source: SourceId, _text: &str, _pos: usize) {}
}

// ─── Session ─────────────────────────────────────────────────────────────────

pub struct Session<E, F> {
    doc: Document,
    emulation: E,
    frontend: F,
    requests: Receiver<Request>,
    sources: HashMap<SourceId, InputId>,
    diag: Diagnostics,
}

impl<E: Emulation, F: Frontend> Session<E, F> {
    /// `requests` must be the receiving half of the channel the emulation
    /// was built with.
    pub fn new(
        doc: Document,
        emulation: E,
        requests: Receiver<Request>,
        frontend: F,
        diag: Diagnostics,
    ) -> Self {
        let mut sources = HashMap::new();
        sources.insert(SourceId::MAIN, InputId::MAIN);
        let mut session = Self {
            doc,
            emulation,
            frontend,
            requests,
            sources,
            diag,
        };
        session.push_status();
        session
    }

    pub const fn document(&self) -> &Document {
        &self.doc
    }

    /// Handle events until the emulation asks to quit or `events` closes.
    pub fn run(&mut self, events: &Receiver<HostEvent>) {
        while let Ok(event) = events.recv() {
            if self.handle(event) == Action::Quit {
                return;
            }
        }
        debug!(target: "ovi::session", "input closed");
    }

    /// Route one host event to the emulation and serve what it requested.
    pub fn handle(&mut self, host: HostEvent) -> Action {
        let diag = self.diag.clone();
        diag.in_scope(|| self.handle_inner(host))
    }

    fn handle_inner(&mut self, host: HostEvent) -> Action {
        let Some(&id) = self.sources.get(&host.source) else {
            debug!(target: "ovi::session", source = %host.source, "event from unmapped source dropped");
            return Action::Continue;
        };
        let input = InputEvent::new(id, host.event);
        if !self.emulation.handle_event(&mut self.doc, input.source, &input.event) {
            debug!(target: "ovi::session", event = ?input.event, "unhandled");
        }
        let action = self.drain_requests();
        self.push_status();
        action
    }

    fn drain_requests(&mut self) -> Action {
        let mut action = Action::Continue;
        loop {
            match self.requests.try_recv() {
                Ok(request) => {
                    if self.serve(request) == Action::Quit {
                        action = Action::Quit;
                    }
                }
                Err(TryRecvError::Empty) => return action,
                Err(TryRecvError::Disconnected) => {
                    warn!(target: "ovi::session", "emulation dropped its request channel");
                    return action;
                }
            }
        }
    }

    fn serve(&mut self, request: Request) -> Action {
        match request {
            Request::AskInput { id, prompt } => {
                let source = self.frontend.ask_input(&prompt);
                debug!(target: "ovi::session", %id, %source, "input opened");
                self.sources.insert(source, id);
            }
            Request::CloseInput(id) => {
                let found = self.source_of(id);
                if let Some(source) = found {
                    self.sources.remove(&source);
                    self.frontend.close_input(source);
                }
            }
            Request::UpdateInput { id, text, pos } => {
                if let Some(source) = self.source_of(id) {
                    self.frontend.update_input(source, &text, pos);
                }
            }
            Request::Save { name, force } => {
                match self.doc.save(name.as_deref().map(Path::new), force) {
                    Ok(path) => info!(target: "ovi::session", path = %path.display(), "written"),
                    Err(e) => self.frontend.set_error(&e.to_string()),
                }
            }
            Request::Quit { force } => {
                if force || !self.doc.is_modified() {
                    info!(target: "ovi::session", force, "quit");
                    return Action::Quit;
                }
                self.frontend
                    .set_error("No write since last change (add ! to override)");
            }
            Request::Error(message) => self.frontend.set_error(&message),
        }
        Action::Continue
    }

    fn source_of(&self, id: InputId) -> Option<SourceId> {
        self.sources
            .iter()
            .find(|&(&source, &input)| input == id && source != SourceId::MAIN)
            .map(|(&source, _)| source)
    }

    fn push_status(&mut self) {
        let status = self.emulation.status(&self.doc);
        self.frontend.set_status(&status);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
