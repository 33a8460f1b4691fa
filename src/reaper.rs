//! Asynchronous collection of terminated background children.
//!
//! The reaper runs on its own thread so the prompt loop never blocks on a
//! background child. Launched children arrive over a channel; every sweep
//! drains *all* currently-terminated children, since several may finish
//! between sweeps.

use std::fmt;
use std::process::{Child, ExitStatus};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, TryRecvError, channel};
use std::thread::JoinHandle;
use std::time::Duration;

/// What happened to one reaped child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReapReport {
    /// The child exited normally.
    Exited { pid: u32, code: i32 },
    /// The child was killed by a signal.
    Signaled { pid: u32, signal: i32 },
}

impl fmt::Display for ReapReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReapReport::Exited { pid, code } => {
                write!(f, "minish: pid {pid} exited with code {code}")
            }
            ReapReport::Signaled { pid, signal } => {
                write!(f, "minish: pid {pid} killed by signal {signal}")
            }
        }
    }
}

enum ReaperMsg {
    Watch(Child),
    Shutdown,
}

/// Cloneable handle used by the launcher to register background children
/// and by the shell to stop the reaper thread.
#[derive(Clone)]
pub struct ReaperHandle {
    tx: Sender<ReaperMsg>,
}

impl ReaperHandle {
    /// Hand a just-launched background child over to the reaper.
    pub fn watch(&self, child: Child) {
        // A send can only fail after shutdown; the child is then abandoned,
        // which matches the shutdown policy.
        if self.tx.send(ReaperMsg::Watch(child)).is_err() {
            log::warn!("reaper already stopped; background child left unwatched");
        }
    }

    /// Ask the reaper thread to perform a final sweep and stop.
    pub fn shutdown(&self) {
        let _ = self.tx.send(ReaperMsg::Shutdown);
    }
}

/// Bookkeeper for background children. Owned by the reaper thread; tests
/// drive [`Reaper::sweep`] directly.
pub struct Reaper {
    rx: Receiver<ReaperMsg>,
    children: Vec<Child>,
    interval: Duration,
}

impl Reaper {
    /// Start the reaper thread. `interval` is the pause between sweeps.
    pub fn spawn(interval: Duration) -> (ReaperHandle, JoinHandle<()>) {
        let (tx, rx) = channel();
        let reaper = Reaper {
            rx,
            children: Vec::new(),
            interval,
        };
        let thread = std::thread::spawn(move || reaper.run());
        (ReaperHandle { tx }, thread)
    }

    fn run(mut self) {
        let mut stopping = false;
        while !stopping {
            // Park until something arrives or it is time to sweep again.
            match self.rx.recv_timeout(self.interval) {
                Ok(ReaperMsg::Watch(child)) => self.children.push(child),
                Ok(ReaperMsg::Shutdown) | Err(RecvTimeoutError::Disconnected) => stopping = true,
                Err(RecvTimeoutError::Timeout) => {}
            }
            // Pick up any further children queued behind the first message.
            loop {
                match self.rx.try_recv() {
                    Ok(ReaperMsg::Watch(child)) => self.children.push(child),
                    Ok(ReaperMsg::Shutdown) | Err(TryRecvError::Disconnected) => {
                        stopping = true;
                        break;
                    }
                    Err(TryRecvError::Empty) => break,
                }
            }
            for report in self.sweep() {
                println!("{report}");
            }
        }
        if !self.children.is_empty() {
            log::debug!("abandoning {} running background child(ren)", self.children.len());
        }
    }

    /// Collect every child that has terminated since the last sweep.
    ///
    /// Non-blocking: children still running stay tracked, everything else
    /// is reported and dropped.
    pub fn sweep(&mut self) -> Vec<ReapReport> {
        let mut reports = Vec::new();
        self.children.retain_mut(|child| {
            let pid = child.id();
            match child.try_wait() {
                Ok(Some(status)) => {
                    reports.push(classify(pid, status));
                    false
                }
                Ok(None) => true,
                Err(err) => {
                    log::warn!("wait for pid {pid} failed: {err}");
                    false
                }
            }
        });
        reports
    }

    #[cfg(test)]
    fn track(&mut self, child: Child) {
        self.children.push(child);
    }
}

fn classify(pid: u32, status: ExitStatus) -> ReapReport {
    match status.code() {
        Some(code) => ReapReport::Exited { pid, code },
        None => ReapReport::Signaled {
            pid,
            signal: termination_signal(status),
        },
    }
}

#[cfg(unix)]
fn termination_signal(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    ExitStatusExt::signal(&status).unwrap_or(-1)
}

#[cfg(not(unix))]
fn termination_signal(_status: ExitStatus) -> i32 {
    -1
}
