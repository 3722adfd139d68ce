//! Global input event hook.
//!
//! Captures keyboard and mouse button events system-wide and delivers them, in
//! order, as `autoclick_core::InputEvent`s over a bounded channel.

use autoclick_core::InputEvent;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::thread;

mod rdev_impl;

pub use rdev_impl::canonical_key_name;

/// Handle to control the input hook.
///
/// The OS listener blocks for the life of the process, so its thread is
/// detached rather than joined.
pub struct InputHookHandle {
    event_rx: Receiver<InputEvent>,
    stop_tx: Sender<()>,
}

impl InputHookHandle {
    /// Channel of captured events, for blocking consumers.
    pub fn events(&self) -> &Receiver<InputEvent> {
        &self.event_rx
    }

    /// Signal the hook to stop delivering events.
    pub fn stop(&self) {
        let _ = self.stop_tx.try_send(());
    }
}

impl Drop for InputHookHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Start capturing global input events.
///
/// Returns a handle that can be used to receive events and stop the hook.
pub fn start_input_hook() -> InputHookHandle {
    let (event_tx, event_rx) = bounded(1024);
    let (stop_tx, stop_rx) = bounded(1);

    thread::spawn(move || {
        rdev_impl::start_hook(event_tx, stop_rx);
    });

    InputHookHandle { event_rx, stop_tx }
}
