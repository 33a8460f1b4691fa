//! A tiny interactive command shell.
//!
//! The shell reads one line per prompt, parses it into a command with
//! optional `<`/`>` redirects and an `&` background marker, and launches it
//! as a child process. Reading and execution run on separate threads,
//! coordinated through a single-command-in-flight [`slot::ExecutionSlot`];
//! background children are collected asynchronously by the [`reaper`].
//!
//! The main entry point is [`Interpreter`], which owns the prompt loop.
//! The public modules expose the individual stages for reuse and testing:
//! [`lexer`] and [`parser`] turn raw lines into [`command::Command`]
//! values, and [`launcher`] spawns them.

pub mod command;
pub mod launcher;
pub mod lexer;
pub mod parser;
pub mod reaper;
pub mod slot;

mod interpreter;

/// Just a convenient re-export of the interactive prompt loop.
pub use interpreter::{Interpreter, MAX_LINE_LEN};
