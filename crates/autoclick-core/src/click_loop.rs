//! Click loop: a cancellable worker thread that emits clicks.

use crate::{ClickConfig, MouseButton};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Emits one click at the current pointer position (implemented by autoclick-platform).
pub trait ClickSink: Send + Sync {
    fn click(&self, button: MouseButton) -> Result<(), String>;
}

/// Why a click loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// A stop was requested (or the handle went away).
    Stopped,
    /// The click budget was used up.
    Exhausted,
}

/// Handle to a running click loop worker.
pub struct ClickLoopHandle {
    stop_tx: Sender<()>,
    running: Arc<AtomicBool>,
    clicks: Arc<AtomicU64>,
    thread: Option<JoinHandle<()>>,
}

impl ClickLoopHandle {
    /// Check if the worker is still emitting clicks.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Clicks emitted so far by this run.
    pub fn clicks(&self) -> u64 {
        self.clicks.load(Ordering::SeqCst)
    }

    /// Request a stop. The worker finishes the click in flight, then exits.
    pub fn stop(&self) {
        let _ = self.stop_tx.try_send(());
    }

    /// Request a stop and wait for the worker thread. Returns the clicks emitted.
    pub fn stop_and_join(mut self) -> u64 {
        self.stop();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Click loop thread panicked");
            }
        }
        self.clicks()
    }

    /// Release the handle without joining.
    ///
    /// Used from the worker's own exit path, where joining would deadlock.
    pub fn detach(mut self) {
        let _ = self.thread.take();
    }
}

impl Drop for ClickLoopHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Spawns click loop workers.
pub struct ClickLoop;

impl ClickLoop {
    /// Start a worker emitting clicks for `snapshot`.
    ///
    /// `on_exit` runs on the worker thread after the last click, with the
    /// exit reason and the number of clicks emitted.
    pub fn spawn<F>(snapshot: ClickConfig, sink: Arc<dyn ClickSink>, on_exit: F) -> ClickLoopHandle
    where
        F: FnOnce(LoopExit, u64) + Send + 'static,
    {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let running = Arc::new(AtomicBool::new(true));
        let clicks = Arc::new(AtomicU64::new(0));

        let running_clone = running.clone();
        let clicks_clone = clicks.clone();

        let thread = thread::spawn(move || {
            info!(
                button = %snapshot.button,
                budget = ?snapshot.click_budget(),
                delay_ms = snapshot.delay_ms(),
                "Click loop started"
            );
            let exit = run_click_loop(&snapshot, sink.as_ref(), &stop_rx, &clicks_clone);
            running_clone.store(false, Ordering::SeqCst);
            let total = clicks_clone.load(Ordering::SeqCst);
            info!(?exit, total, "Click loop exited");
            on_exit(exit, total);
        });

        ClickLoopHandle {
            stop_tx,
            running,
            clicks,
            thread: Some(thread),
        }
    }
}

/// Emit clicks for `config` on the current thread until stopped or out of budget.
///
/// `stop_rx` is checked before every click and while waiting between clicks;
/// a disconnected channel counts as a stop. `clicks` is incremented per click.
pub fn run_click_loop(
    config: &ClickConfig,
    sink: &dyn ClickSink,
    stop_rx: &Receiver<()>,
    clicks: &AtomicU64,
) -> LoopExit {
    let delay = config.effective_delay();
    let budget = config.click_budget();
    let mut count = 0u64;

    loop {
        if budget.is_some_and(|max| count >= max) {
            return LoopExit::Exhausted;
        }

        match stop_rx.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => return LoopExit::Stopped,
            Err(TryRecvError::Empty) => {}
        }

        if let Err(e) = sink.click(config.button) {
            warn!(error = %e, button = %config.button, "Failed to emit click");
        }
        count += 1;
        clicks.store(count, Ordering::SeqCst);
        debug!(count, "Click emitted");

        if budget.is_some_and(|max| count >= max) {
            return LoopExit::Exhausted;
        }

        if delay.is_zero() {
            continue;
        }
        match stop_rx.recv_timeout(delay) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return LoopExit::Stopped,
        }
    }
}
