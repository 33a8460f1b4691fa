//! Spawns child processes for parsed commands: wires redirections, resolves
//! the program through `PATH`, and either waits (foreground) or hands the
//! child to the reaper (background).

use crate::command::Command;
use crate::reaper::ReaperHandle;
use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;

/// Errors that can occur while launching a command.
///
/// Only [`LaunchError::Spawn`] is fatal to the shell; every other variant
/// aborts the current command and the prompt loop continues.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// A redirect target could not be opened. The command is not run.
    #[error("cannot redirect {stream} to `{path}`: {source}")]
    Redirect {
        stream: &'static str,
        path: PathBuf,
        source: io::Error,
    },
    /// The program was not found on `PATH` or is not executable.
    #[error("cannot execute `{program}`: {source}")]
    Exec { program: String, source: io::Error },
    /// Process creation itself failed, e.g. the process table is exhausted.
    /// There is no retry policy for this; the shell gives up.
    #[error("process creation failed: {0}")]
    Spawn(io::Error),
    /// Waiting on a foreground child failed.
    #[error("wait for pid {pid} failed: {source}")]
    Wait { pid: u32, source: io::Error },
}

impl LaunchError {
    /// Whether this failure must take the whole shell down.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LaunchError::Spawn(_))
    }
}

/// Launch a parsed command.
///
/// Foreground commands block until the child terminates. Background
/// commands are registered with the reaper and control returns at once.
pub fn launch(command: Command, reaper: &ReaperHandle) -> Result<(), LaunchError> {
    // The parser never emits an empty argv.
    let Some(program) = command.program() else {
        return Ok(());
    };

    let mut process = std::process::Command::new(program);
    process.args(&command.argv[1..]);

    if let Some(path) = &command.stdin_redirect {
        let file = File::open(path).map_err(|source| LaunchError::Redirect {
            stream: "stdin",
            path: path.clone(),
            source,
        })?;
        process.stdin(Stdio::from(file));
    }
    if let Some(path) = &command.stdout_redirect {
        let file = open_output(path).map_err(|source| LaunchError::Redirect {
            stream: "stdout",
            path: path.clone(),
            source,
        })?;
        process.stdout(Stdio::from(file));
    }

    let mut child = process.spawn().map_err(|source| match source.kind() {
        ErrorKind::NotFound | ErrorKind::PermissionDenied => LaunchError::Exec {
            program: program.to_string(),
            source,
        },
        _ => LaunchError::Spawn(source),
    })?;
    let pid = child.id();
    log::debug!("launched pid {pid}: {:?}", command.argv);

    if command.background {
        reaper.watch(child);
    } else {
        child.wait().map_err(|source| LaunchError::Wait { pid, source })?;
    }
    Ok(())
}

/// Open (or create) an output redirect target, truncating existing content.
/// Created files get mode 0666 masked by the process umask.
fn open_output(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o666);
    }
    options.open(path)
}
