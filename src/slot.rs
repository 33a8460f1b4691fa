//! The execution slot: the single-command-in-flight hand-off point between
//! the line-reading producer and the command-executing consumer.
//!
//! One mutex and one condition variable serve both directions. `executing`
//! goes 0→1 only in the producer once it holds a non-empty line, and 1→0
//! only in the consumer after the launch step completes — for foreground
//! commands that includes the wait on the child, so clearing the flag also
//! means "safe to prompt again". Every transition broadcasts to all
//! waiters; a single wake could leave the opposite side parked forever.

use std::sync::{Condvar, Mutex, MutexGuard};

/// What the consumer receives when it asks for work.
#[derive(Debug, PartialEq, Eq)]
pub enum Handoff {
    /// A raw input line to tokenize and launch.
    Line(String),
    /// The shell is shutting down; the consumer loop must end.
    Stop,
}

#[derive(Debug, Default)]
struct SlotState {
    /// The raw line handed off for this in-flight command.
    handoff: Option<String>,
    /// True from hand-off until the launch step has completed.
    executing: bool,
    /// Cleared once, by the producer, when `exit` is read.
    running: bool,
}

/// Shared state between the reader and executor threads.
pub struct ExecutionSlot {
    state: Mutex<SlotState>,
    cond: Condvar,
}

impl Default for ExecutionSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionSlot {
    pub fn new() -> Self {
        ExecutionSlot {
            state: Mutex::new(SlotState {
                handoff: None,
                executing: false,
                running: true,
            }),
            cond: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, SlotState>) -> MutexGuard<'a, SlotState> {
        self.cond.wait(guard).unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Producer side: hand a raw line to the executor, then block until the
    /// launch step has completed (for foreground commands, until the child
    /// has exited) so the caller can prompt again.
    pub fn submit(&self, line: String) {
        let mut state = self.lock();
        while state.executing && state.running {
            state = self.wait(state);
        }
        if !state.running {
            return;
        }
        state.handoff = Some(line);
        state.executing = true;
        self.cond.notify_all();
        while state.executing && state.running {
            state = self.wait(state);
        }
    }

    /// Consumer side: block until a line is handed off or the shell stops.
    pub fn take(&self) -> Handoff {
        let mut state = self.lock();
        while !state.executing && state.running {
            state = self.wait(state);
        }
        if !state.running {
            self.cond.notify_all();
            return Handoff::Stop;
        }
        debug_assert!(state.handoff.is_some(), "executing without a handed-off line");
        match state.handoff.take() {
            Some(line) => Handoff::Line(line),
            None => Handoff::Stop,
        }
    }

    /// Consumer side: mark the launch step finished and wake the producer.
    pub fn finish(&self) {
        let mut state = self.lock();
        state.executing = false;
        self.cond.notify_all();
    }

    /// Terminal transition: stop both loops. Any waiter, on either side,
    /// is woken and observes `running == false`.
    pub fn stop(&self) {
        let mut state = self.lock();
        state.running = false;
        self.cond.notify_all();
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    #[test]
    fn hands_lines_over_in_submission_order() {
        let slot = Arc::new(ExecutionSlot::new());
        let consumer = {
            let slot = Arc::clone(&slot);
            std::thread::spawn(move || {
                let mut seen = Vec::new();
                loop {
                    match slot.take() {
                        Handoff::Line(line) => {
                            seen.push(line);
                            slot.finish();
                        }
                        Handoff::Stop => return seen,
                    }
                }
            })
        };

        for line in ["first", "second", "third"] {
            slot.submit(line.to_string());
        }
        slot.stop();

        let seen = consumer.join().expect("consumer thread");
        assert_eq!(seen, ["first", "second", "third"]);
    }

    #[test]
    fn submit_blocks_until_launch_step_completes() {
        let slot = Arc::new(ExecutionSlot::new());
        let consumer = {
            let slot = Arc::clone(&slot);
            std::thread::spawn(move || {
                if let Handoff::Line(_) = slot.take() {
                    // Simulate a foreground child that takes a while.
                    std::thread::sleep(Duration::from_millis(200));
                    slot.finish();
                }
            })
        };

        let start = Instant::now();
        slot.submit("sleepy".to_string());
        assert!(
            start.elapsed() >= Duration::from_millis(200),
            "submit returned before the consumer finished"
        );
        slot.stop();
        consumer.join().expect("consumer thread");
    }

    #[test]
    fn stop_wakes_a_parked_consumer() {
        let slot = Arc::new(ExecutionSlot::new());
        let consumer = {
            let slot = Arc::clone(&slot);
            std::thread::spawn(move || slot.take())
        };

        // Give the consumer time to park on the condvar.
        std::thread::sleep(Duration::from_millis(50));
        slot.stop();
        assert_eq!(consumer.join().expect("consumer thread"), Handoff::Stop);
    }

    #[test]
    fn stop_wakes_a_parked_producer() {
        let slot = Arc::new(ExecutionSlot::new());
        // Occupy the slot without a consumer, then submit from another
        // thread; only stop() can release it.
        slot.submit_nowait_for_test("occupier".to_string());
        let producer = {
            let slot = Arc::clone(&slot);
            std::thread::spawn(move || slot.submit("blocked".to_string()))
        };

        std::thread::sleep(Duration::from_millis(50));
        slot.stop();
        producer.join().expect("producer thread");
        assert!(!slot.is_running());
    }

    #[test]
    fn submit_after_stop_is_a_no_op() {
        let slot = ExecutionSlot::new();
        slot.stop();
        slot.submit("too late".to_string());
        assert_eq!(slot.take(), Handoff::Stop);
    }

    impl ExecutionSlot {
        /// Occupy the slot without blocking for completion.
        fn submit_nowait_for_test(&self, line: String) {
            let mut state = self.lock();
            state.handoff = Some(line);
            state.executing = true;
            self.cond.notify_all();
        }
    }
}
