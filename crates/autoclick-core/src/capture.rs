//! Hotkey capture: bind the hotkey to the next qualifying input.

use crate::{ActivationMode, ConfigStore, HotkeyBinding, InputEvent, Point, StatusSink};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Status shown while waiting for the new hotkey.
pub const CAPTURE_PROMPT: &str = "Press any key or mouse button...";

/// Tells whether a screen position belongs to the configuration UI.
///
/// Mouse presses over it never bind, so clicking "Set Hotkey" does not bind itself.
pub trait ConfigSurface: Send + Sync {
    fn contains(&self, position: Point) -> bool;
}

impl<F> ConfigSurface for F
where
    F: Fn(Point) -> bool + Send + Sync,
{
    fn contains(&self, position: Point) -> bool {
        self(position)
    }
}

/// A shell without any on-screen configuration surface.
pub struct NoSurface;

impl ConfigSurface for NoSurface {
    fn contains(&self, _position: Point) -> bool {
        false
    }
}

/// Why a candidate input did not bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureIgnore {
    /// Only presses bind.
    Release,
    /// Mouse press landed on the configuration surface.
    OverSurface,
    /// Key event without a usable key code.
    MissingKeyCode,
}

/// Result of offering an input to the capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// No capture in progress; the event is for normal routing.
    NotCapturing,
    /// The event became the new hotkey and capture ended.
    Bound(HotkeyBinding),
    /// Capture stays open.
    Ignored(CaptureIgnore),
}

struct CaptureState {
    previous_mode: ActivationMode,
}

/// "Listen for next input" hotkey assignment.
pub struct HotkeyCapture {
    state: Mutex<Option<CaptureState>>,
    config: ConfigStore,
    status: Arc<dyn StatusSink>,
    surface: Arc<dyn ConfigSurface>,
}

impl HotkeyCapture {
    pub fn new(config: ConfigStore, status: Arc<dyn StatusSink>, surface: Arc<dyn ConfigSurface>) -> Self {
        Self {
            state: Mutex::new(None),
            config,
            status,
            surface,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<CaptureState>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_capturing(&self) -> bool {
        self.lock().is_some()
    }

    /// Start listening for the next input. Returns false if a capture is already open.
    pub fn begin_capture(&self) -> bool {
        {
            let mut state = self.lock();
            if state.is_some() {
                debug!("capture already in progress");
                return false;
            }
            *state = Some(CaptureState {
                previous_mode: self.config.mode(),
            });
        }
        info!("Hotkey capture started");
        self.status.status(CAPTURE_PROMPT);
        true
    }

    /// Abandon the capture, leaving the current binding untouched.
    pub fn cancel_capture(&self) -> bool {
        let Some(capture) = self.lock().take() else {
            return false;
        };
        self.config.set_mode(capture.previous_mode);
        info!("Hotkey capture cancelled");
        self.status.status("");
        true
    }

    /// Offer a raw input event to the capture.
    pub fn on_candidate_input(&self, event: &InputEvent) -> CaptureOutcome {
        let binding = {
            let mut state = self.lock();
            let Some(capture) = state.as_ref() else {
                return CaptureOutcome::NotCapturing;
            };

            let binding = match event {
                InputEvent::KeyRelease(_) | InputEvent::MouseRelease { .. } => {
                    return CaptureOutcome::Ignored(CaptureIgnore::Release);
                }
                InputEvent::KeyPress(code) if code.is_empty() => {
                    debug!("key press without key code ignored during capture");
                    return CaptureOutcome::Ignored(CaptureIgnore::MissingKeyCode);
                }
                InputEvent::KeyPress(code) => HotkeyBinding::Keyboard(code.clone()),
                InputEvent::MousePress { button, position } => {
                    if self.surface.contains(*position) {
                        debug!(?position, "mouse press over configuration surface ignored");
                        return CaptureOutcome::Ignored(CaptureIgnore::OverSurface);
                    }
                    HotkeyBinding::Mouse(*button)
                }
            };

            let previous_mode = capture.previous_mode;
            self.config.update(|c| {
                c.hotkey = binding.clone();
                c.mode = previous_mode;
            });
            *state = None;
            binding
        };

        info!(hotkey = %binding.label(), "Hotkey bound");
        self.status.status("");
        CaptureOutcome::Bound(binding)
    }
}
