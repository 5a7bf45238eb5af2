//! Background workers and the shared retry shape.
//!
//! Every long operation runs the same way: a spawned thread owning its
//! working data, a one-shot event stream back to the caller, and a stop flag
//! checked between steps. Callers drain events; they never share state with
//! the worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{anyhow, Result};

const RETRY_ATTEMPTS: u32 = 3;
const RETRY_BASE_MS: u64 = 150;

/// Runs `op` up to three times with growing backoff between attempts,
/// returning the last error once the attempts are spent.
pub fn with_retry<T>(label: &str, mut op: impl FnMut() -> Result<T>) -> Result<T> {
    let mut last = None;
    for attempt in 1..=RETRY_ATTEMPTS {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) => {
                tracing::debug!(label, attempt, error = %err, "attempt failed");
                last = Some(err);
                if attempt < RETRY_ATTEMPTS {
                    thread::sleep(Duration::from_millis(RETRY_BASE_MS << attempt));
                }
            }
        }
    }
    Err(last.unwrap_or_else(|| anyhow!("{label} failed")))
}

#[derive(Debug)]
pub enum WorkerEvent<T> {
    /// Human-readable stage change ("Fetching application data...").
    Progress(String),
    /// Numeric progress for bounded work, 0..=100.
    Percent(u8),
    Finished(T),
    Failed(String),
}

/// Handed to the worker closure for progress reporting and cancellation
/// checks. Sends are best-effort: a caller that has stopped listening does
/// not fail the worker.
pub struct WorkerScope<T> {
    events: Sender<WorkerEvent<T>>,
    stop: Arc<AtomicBool>,
}

impl<T> WorkerScope<T> {
    pub fn progress(&self, text: impl Into<String>) {
        let _ = self.events.send(WorkerEvent::Progress(text.into()));
    }

    pub fn percent(&self, value: u8) {
        let _ = self.events.send(WorkerEvent::Percent(value));
    }

    pub fn cancelled(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

pub struct WorkerHandle<T> {
    events: Receiver<WorkerEvent<T>>,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl<T> WorkerHandle<T> {
    /// Blocks for the next event; None once the worker is done and the
    /// channel has drained.
    pub fn next_event(&self) -> Option<WorkerEvent<T>> {
        self.events.recv().ok()
    }

    /// Asks the worker to wind down at its next cancellation check.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl<T> Drop for WorkerHandle<T> {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Spawns `op` on its own thread. The closure's Ok value becomes a
/// `Finished` event; an Err is caught at this boundary and becomes `Failed`.
/// A cancelled worker emits nothing further.
pub fn spawn_worker<T, F>(label: &str, op: F) -> WorkerHandle<T>
where
    T: Send + 'static,
    F: FnOnce(&WorkerScope<T>) -> Result<T> + Send + 'static,
{
    let (events, receiver) = mpsc::channel();
    let stop = Arc::new(AtomicBool::new(false));
    let scope = WorkerScope {
        events,
        stop: Arc::clone(&stop),
    };
    let label = label.to_string();
    let thread = thread::Builder::new()
        .name(format!("pslv-{label}"))
        .spawn(move || match op(&scope) {
            Ok(value) => {
                if !scope.cancelled() {
                    let _ = scope.events.send(WorkerEvent::Finished(value));
                }
            }
            Err(err) => {
                if !scope.cancelled() {
                    let _ = scope.events.send(WorkerEvent::Failed(format!("{err:#}")));
                }
            }
        })
        .expect("spawning worker thread");

    WorkerHandle {
        events: receiver,
        stop,
        thread: Some(thread),
    }
}
