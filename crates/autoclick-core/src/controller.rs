//! Activation controller: Idle/Active state machine that owns the click loop.

use crate::{ClickLoop, ClickLoopHandle, ClickSink, ConfigStore, LoopExit};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, info};

/// Activation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivationState {
    /// No click loop running.
    #[default]
    Idle,
    /// Click loop running (or about to report that it finished).
    Active,
}

struct ControllerInner {
    state: ActivationState,
    /// Incremented on every start. Exit notifications from older runs are ignored.
    generation: u64,
    worker: Option<ClickLoopHandle>,
    last_run_clicks: u64,
}

type Shared = Arc<Mutex<ControllerInner>>;

fn lock(shared: &Mutex<ControllerInner>) -> MutexGuard<'_, ControllerInner> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The single authority that starts and stops the click loop.
pub struct ActivationController {
    shared: Shared,
    config: ConfigStore,
    sink: Arc<dyn ClickSink>,
}

impl ActivationController {
    pub fn new(config: ConfigStore, sink: Arc<dyn ClickSink>) -> Self {
        Self {
            shared: Arc::new(Mutex::new(ControllerInner {
                state: ActivationState::Idle,
                generation: 0,
                worker: None,
                last_run_clicks: 0,
            })),
            config,
            sink,
        }
    }

    /// Get current state.
    pub fn state(&self) -> ActivationState {
        lock(&self.shared).state
    }

    /// Whether a click loop worker is currently emitting clicks.
    pub fn is_running(&self) -> bool {
        lock(&self.shared)
            .worker
            .as_ref()
            .is_some_and(ClickLoopHandle::is_running)
    }

    /// Clicks emitted by the current run, or by the last finished one.
    pub fn last_run_clicks(&self) -> u64 {
        let inner = lock(&self.shared);
        match &inner.worker {
            Some(worker) => worker.clicks(),
            None => inner.last_run_clicks,
        }
    }

    /// Idle → Active, starting the click loop. Returns false if already Active.
    pub fn engage(&self) -> bool {
        let mut inner = lock(&self.shared);
        if inner.state == ActivationState::Active {
            debug!("engage ignored, already active");
            return false;
        }
        self.start_locked(&mut inner);
        true
    }

    /// Active → Idle, stopping the click loop. Returns false if already Idle.
    pub fn disengage(&self) -> bool {
        let worker = {
            let mut inner = lock(&self.shared);
            if inner.state == ActivationState::Idle {
                debug!("disengage ignored, already idle");
                return false;
            }
            Self::stop_locked(&mut inner)
        };
        self.join_worker(worker);
        true
    }

    /// Flip between Idle and Active. Returns the new state.
    pub fn toggle(&self) -> ActivationState {
        let worker = {
            let mut inner = lock(&self.shared);
            match inner.state {
                ActivationState::Idle => {
                    self.start_locked(&mut inner);
                    return ActivationState::Active;
                }
                ActivationState::Active => Self::stop_locked(&mut inner),
            }
        };
        self.join_worker(worker);
        ActivationState::Idle
    }

    /// Stop any running loop and wait for it. Safe to call repeatedly.
    pub fn shutdown(&self) {
        let worker = Self::stop_locked(&mut lock(&self.shared));
        self.join_worker(worker);
    }

    fn start_locked(&self, inner: &mut ControllerInner) {
        inner.generation += 1;
        let generation = inner.generation;
        let snapshot = self.config.snapshot();
        let shared = Arc::downgrade(&self.shared);

        let worker = ClickLoop::spawn(snapshot, self.sink.clone(), move |exit, clicks| {
            finish_run(&shared, generation, exit, clicks);
        });

        inner.state = ActivationState::Active;
        inner.worker = Some(worker);
        info!(generation, "Activation: Idle -> Active");
    }

    fn stop_locked(inner: &mut ControllerInner) -> Option<ClickLoopHandle> {
        if inner.state == ActivationState::Active {
            info!(generation = inner.generation, "Activation: Active -> Idle");
        }
        inner.state = ActivationState::Idle;
        let worker = inner.worker.take();
        if let Some(worker) = &worker {
            worker.stop();
        }
        worker
    }

    /// Join outside the lock: the worker's exit path takes the same lock.
    fn join_worker(&self, worker: Option<ClickLoopHandle>) {
        if let Some(worker) = worker {
            let clicks = worker.stop_and_join();
            lock(&self.shared).last_run_clicks = clicks;
        }
    }
}

impl Drop for ActivationController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Exit notification from a click loop worker.
fn finish_run(shared: &Weak<Mutex<ControllerInner>>, generation: u64, exit: LoopExit, clicks: u64) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let mut inner = lock(&shared);
    if inner.generation != generation {
        debug!(generation, current = inner.generation, "stale click loop exit ignored");
        return;
    }
    inner.last_run_clicks = clicks;
    if exit == LoopExit::Exhausted && inner.state == ActivationState::Active {
        inner.state = ActivationState::Idle;
        if let Some(worker) = inner.worker.take() {
            worker.detach();
        }
        info!(generation, clicks, "Click budget exhausted, Activation: Active -> Idle");
    }
}
