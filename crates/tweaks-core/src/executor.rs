//! Execution contexts for subscriber callbacks
//!
//! Change notifications can originate on any thread. Callbacks registered
//! through the coordinator are handed to an [`Executor`] so that they run on
//! the caller's primary context rather than the publisher's thread.

use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};

/// Unit of work scheduled on an executor.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Somewhere to run subscriber callbacks.
pub trait Executor: Send + Sync {
    fn execute(&self, task: Task);
}

/// Runs every task immediately on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, task: Task) {
        task();
    }
}

/// Queue drained by the thread that owns the primary context.
///
/// Tasks may be enqueued from any thread; they only run when the owner calls
/// [`MainQueue::run_pending`], typically once per iteration of its event loop.
pub struct MainQueue {
    sender: Sender<Task>,
    receiver: Mutex<Receiver<Task>>,
}

impl MainQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver: Mutex::new(receiver),
        }
    }

    /// Run every task queued so far. Returns how many ran.
    ///
    /// Tasks enqueued while draining are picked up in the same call.
    pub fn run_pending(&self) -> usize {
        let receiver = self
            .receiver
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut ran = 0;
        while let Ok(task) = receiver.try_recv() {
            task();
            ran += 1;
        }
        ran
    }
}

impl Default for MainQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for MainQueue {
    fn execute(&self, task: Task) {
        // The receiver lives as long as `self`, so sending cannot fail here.
        let _ = self.sender.send(task);
    }
}

impl std::fmt::Debug for MainQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MainQueue").finish_non_exhaustive()
    }
}
