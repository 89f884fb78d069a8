// SPDX-License-Identifier: MIT
//
// ovi: a headless host for the ovi vi emulation.
//
// This binary wires the crates together:
//
//   ovi-text → document, cursors, events, options, diagnostics
//   ovi-vi   → the modal emulation
//
// Input is read from stdin one line at a time in key notation (see
// `keys`), so a session can be scripted:
//
//   printf 'ihello<Esc>ZZ\n' | ovi notes.txt
//
// Each event flows through:
//
//   stdin reader → keys::parse → Session::handle → Vi → Document
//   requests → Session::serve → save / quit / errors
//   status → Headless frontend → stdout
//
// Logs go to stderr, filtered by OVI_LOG (default `warn`). Options come
// from the TOML file named by OVI_CONFIG, when set.

mod keys;
mod session;

use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use anyhow::{Context, Result};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use ovi_text::{Diagnostics, Document, Options};
use ovi_vi::Vi;

use session::{Frontend, HostEvent, Session, SourceId};

const USAGE: &str = "usage: ovi [FILE]\n\nReads key notation from stdin, one line at a time.";

// ─── Frontend ───────────────────────────────────────────────────────────────

/// Prints status changes to stdout and errors to stderr.
struct Headless<W> {
    out: W,
    last_status: String,
    next_source: u32,
}

impl<W: Write> Headless<W> {
    const fn new(out: W) -> Self {
        Self {
            out,
            last_status: String::new(),
            next_source: 1,
        }
    }

    fn emit(&mut self, line: &str) {
        if writeln!(self.out, "{line}").and_then(|()| self.out.flush()).is_err() {
            warn!(target: "ovi::session", "stdout closed");
        }
    }
}

impl<W: Write> Frontend for Headless<W> {
    fn set_status(&mut self, text: &str) {
        if text != self.last_status {
            text.clone_into(&mut self.last_status);
            self.emit(text);
        }
    }

    fn set_error(&mut self, text: &str) {
        eprintln!("ovi: {text}");
    }

    fn ask_input(&mut self, prompt: &str) -> SourceId {
        let source = SourceId(self.next_source);
        self.next_source += 1;
        self.emit(&format!("{prompt}:"));
        source
    }
}

// ─── Startup ────────────────────────────────────────────────────────────────

/// A stderr logger as an injectable capability; no global default is set.
fn diagnostics() -> Diagnostics {
    let filter = EnvFilter::try_from_env("OVI_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish();
    Diagnostics::new(subscriber.into())
}

fn options() -> Result<Options> {
    match env::var_os("OVI_CONFIG") {
        Some(path) => {
            let path = PathBuf::from(path);
            Options::load(&path).with_context(|| format!("loading options from {}", path.display()))
        }
        None => Ok(Options::default()),
    }
}

/// Forward stdin lines as main-source events until EOF.
fn spawn_reader(diag: Diagnostics) -> Receiver<HostEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        diag.in_scope(|| {
            for line in io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!(target: "ovi::session", error = %e, "stdin read failed");
                        return;
                    }
                };
                match keys::parse(&line) {
                    Ok(events) => {
                        for event in events {
                            if tx.send(HostEvent::main(event)).is_err() {
                                return;
                            }
                        }
                    }
                    Err(e) => warn!(target: "ovi::session", error = %e, "skipping line"),
                }
            }
            debug!(target: "ovi::session", "stdin closed");
        });
    });
    rx
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        println!("{USAGE}");
        return Ok(());
    }
    if args.len() > 1 {
        anyhow::bail!("{USAGE}");
    }

    let diag = diagnostics();
    let options = options()?;
    let doc = match args.first() {
        Some(name) => Document::open(Path::new(name), options, diag.clone())
            .with_context(|| format!("opening {name}"))?,
        None => Document::new(options, diag.clone()),
    };

    let (tx, requests) = mpsc::channel();
    let vi = Vi::new(tx, diag.clone());
    let mut session = Session::new(doc, vi, requests, Headless::new(io::stdout()), diag.clone());

    let events = spawn_reader(diag);
    session.run(&events);

    if session.document().is_modified() {
        eprintln!("ovi: exiting with unsaved changes");
    }
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ovi_text::Buffer;
    use pretty_assertions::assert_eq;

    fn output(frontend: &Headless<Vec<u8>>) -> String {
        String::from_utf8_lossy(&frontend.out).into_owned()
    }

    #[test]
    fn headless_prints_status_only_when_it_changes() {
        let mut f = Headless::new(Vec::new());
        f.set_status("a");
        f.set_status("a");
        f.set_status("b");
        assert_eq!(output(&f), "a\nb\n");
    }

    #[test]
    fn headless_hands_out_fresh_sources() {
        let mut f = Headless::new(Vec::new());
        assert_eq!(f.ask_input("name"), SourceId(1));
        assert_eq!(f.ask_input("again"), SourceId(2));
        assert_eq!(output(&f), "name:\nagain:\n");
    }

    #[test]
    fn scripted_lines_drive_a_session() {
        let (tx, requests) = mpsc::channel();
        let doc = Document::from_buffer(Buffer::from_lines(["world"]), Options::default(), Diagnostics::disabled());
        let vi = Vi::new(tx, Diagnostics::disabled());
        let mut s = Session::new(doc, vi, requests, Headless::new(Vec::new()), Diagnostics::disabled());
        for event in keys::parse("ihello <Esc>").unwrap() {
            s.handle(HostEvent::main(event));
        }
        assert_eq!(s.document().buffer().get_line(0), Some("hello world".to_owned()));
    }
}
