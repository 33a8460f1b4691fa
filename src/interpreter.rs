//! The interactive loop: a line-reading producer thread and a
//! command-executing consumer thread coordinated through the
//! [`ExecutionSlot`].

use crate::launcher::{self, LaunchError};
use crate::lexer;
use crate::parser;
use crate::reaper::{Reaper, ReaperHandle};
use crate::slot::{ExecutionSlot, Handoff};
use anyhow::Context;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::time::Duration;

/// Maximum usable bytes per input line. Longer lines are reported and
/// discarded whole.
pub const MAX_LINE_LEN: usize = 512;

/// How the reader treats one raw input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    /// More than [`MAX_LINE_LEN`] usable bytes; reported and dropped.
    Oversized,
    /// Nothing but whitespace; prompt again without handing anything off.
    Empty,
    /// The exit builtin, recognized here before any tokenization.
    Exit,
    /// A candidate command line for the executor.
    Command,
}

fn classify(line: &str) -> LineKind {
    if line.len() > MAX_LINE_LEN {
        return LineKind::Oversized;
    }
    let trimmed = line.trim();
    if trimmed.is_empty() {
        LineKind::Empty
    } else if trimmed == "exit" {
        LineKind::Exit
    } else {
        LineKind::Command
    }
}

/// The interactive shell.
///
/// `run` blocks until the user types `exit` (or closes stdin) and drives
/// three threads: the reader, the executor, and the background reaper.
/// Commands launch strictly in input order; at most one command is ever
/// mid-launch.
pub struct Interpreter {
    prompt: String,
    reap_interval: Duration,
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter {
            prompt: "$ ".to_string(),
            reap_interval: Duration::from_millis(50),
        }
    }
}

impl Interpreter {
    pub fn new(prompt: String, reap_interval: Duration) -> Self {
        Interpreter {
            prompt,
            reap_interval,
        }
    }

    /// Run the shell until `exit`.
    pub fn run(&self) -> anyhow::Result<()> {
        let slot = ExecutionSlot::new();
        let (reaper, reaper_thread) = Reaper::spawn(self.reap_interval);

        let result = std::thread::scope(|scope| {
            let reader = scope.spawn(|| self.read_loop(&slot));
            let executor = scope.spawn(|| self.exec_loop(&slot, &reaper));
            let read_result = reader
                .join()
                .map_err(|_| anyhow::anyhow!("reader thread panicked"));
            executor
                .join()
                .map_err(|_| anyhow::anyhow!("executor thread panicked"))?;
            read_result?.context("reading input")?;
            Ok::<(), anyhow::Error>(())
        });

        // Outstanding background children are abandoned on exit; the reaper
        // makes one last sweep for those that already terminated.
        reaper.shutdown();
        reaper_thread
            .join()
            .map_err(|_| anyhow::anyhow!("reaper thread panicked"))?;
        result
    }

    /// Producer: prompt, read, classify, hand off.
    fn read_loop(&self, slot: &ExecutionSlot) -> anyhow::Result<()> {
        let mut editor = DefaultEditor::new().context("initializing line editor")?;

        while slot.is_running() {
            match editor.readline(&self.prompt) {
                Ok(line) => match classify(&line) {
                    LineKind::Oversized => {
                        eprintln!("minish: input line longer than {MAX_LINE_LEN} bytes, ignored");
                    }
                    LineKind::Empty => {}
                    LineKind::Exit => {
                        let _ = editor.add_history_entry(&line);
                        slot.stop();
                        break;
                    }
                    LineKind::Command => {
                        let _ = editor.add_history_entry(&line);
                        slot.submit(line);
                    }
                },
                // Ctrl-C aborts the pending read and redraws the prompt.
                Err(ReadlineError::Interrupted) => continue,
                // Ctrl-D behaves like exit.
                Err(ReadlineError::Eof) => {
                    slot.stop();
                    break;
                }
                Err(err) => {
                    slot.stop();
                    return Err(err).context("reading line");
                }
            }
        }
        Ok(())
    }

    /// Consumer: tokenize, parse and launch one line at a time.
    fn exec_loop(&self, slot: &ExecutionSlot, reaper: &ReaperHandle) {
        loop {
            match slot.take() {
                Handoff::Stop => return,
                Handoff::Line(line) => {
                    if let Err(err) = execute_line(&line, reaper) {
                        // Process creation is exhausted; there is nothing to
                        // wait for and the reader may be parked on stdin, so
                        // the whole shell terminates here.
                        eprintln!("minish: {err}");
                        std::process::exit(1);
                    }
                    slot.finish();
                }
            }
        }
    }
}

/// Tokenize, parse and launch one raw line.
///
/// Parse failures and recoverable launch failures are reported and
/// swallowed here; only a fatal launch failure propagates.
fn execute_line(line: &str, reaper: &ReaperHandle) -> Result<(), LaunchError> {
    let tokens = match lexer::scan(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            eprintln!("minish: {err}");
            return Ok(());
        }
    };
    let command = match parser::parse(tokens) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("minish: {err}");
            return Ok(());
        }
    };
    match launcher::launch(command, reaper) {
        Ok(()) => Ok(()),
        Err(err) if err.is_fatal() => Err(err),
        Err(err) => {
            eprintln!("minish: {err}");
            Ok(())
        }
    }
}
