//! Input event router: capture first, then hotkey matching and activation.

use crate::{
    ActivationController, ActivationMode, ActivationState, CaptureOutcome, ConfigStore,
    HotkeyCapture, InputEvent,
};
use crossbeam_channel::{select, Receiver};
use std::sync::Arc;
use tracing::{debug, info};

/// What routing one event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A hotkey capture consumed the event.
    Capture(CaptureOutcome),
    /// Hold press started clicking.
    Engaged,
    /// Hold release stopped clicking.
    Disengaged,
    /// Toggle press; carries the new state.
    Toggled(ActivationState),
    /// The hotkey matched but the state did not change.
    Unchanged,
    /// Not the hotkey.
    NoMatch,
}

pub struct InputRouter {
    config: ConfigStore,
    capture: Arc<HotkeyCapture>,
    controller: Arc<ActivationController>,
}

impl InputRouter {
    pub fn new(
        config: ConfigStore,
        capture: Arc<HotkeyCapture>,
        controller: Arc<ActivationController>,
    ) -> Self {
        Self {
            config,
            capture,
            controller,
        }
    }

    /// Start a hotkey capture, stopping any active run first.
    ///
    /// Capture swallows the old hotkey's events, so a hold release would
    /// otherwise never reach the controller.
    pub fn begin_capture(&self) -> bool {
        if !self.capture.begin_capture() {
            return false;
        }
        if self.controller.disengage() {
            info!("Clicking stopped for hotkey capture");
        }
        true
    }

    /// Route a single event.
    pub fn dispatch(&self, event: &InputEvent) -> RouteOutcome {
        match self.capture.on_candidate_input(event) {
            CaptureOutcome::NotCapturing => {}
            outcome => return RouteOutcome::Capture(outcome),
        }

        let (mode, matched) = self.config.read(|c| (c.mode, c.hotkey.matches(event)));
        if !matched {
            return RouteOutcome::NoMatch;
        }
        debug!(?event, ?mode, "hotkey matched");

        match (mode, event.is_press()) {
            (ActivationMode::Hold, true) => {
                if self.controller.engage() {
                    RouteOutcome::Engaged
                } else {
                    RouteOutcome::Unchanged
                }
            }
            (ActivationMode::Hold, false) => {
                if self.controller.disengage() {
                    RouteOutcome::Disengaged
                } else {
                    RouteOutcome::Unchanged
                }
            }
            (ActivationMode::Toggle, true) => RouteOutcome::Toggled(self.controller.toggle()),
            (ActivationMode::Toggle, false) => RouteOutcome::Unchanged,
        }
    }

    /// Route events in delivery order until `shutdown` fires or the source disconnects.
    pub fn run(&self, events: &Receiver<InputEvent>, shutdown: &Receiver<()>) {
        info!("Input router started");
        loop {
            select! {
                recv(events) -> event => match event {
                    Ok(event) => {
                        self.dispatch(&event);
                    }
                    Err(_) => {
                        info!("Input source disconnected");
                        break;
                    }
                },
                recv(shutdown) -> _ => break,
            }
        }
        info!("Input router exiting");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClickConfig, ClickSink, HotkeyBinding, KeyCode, MouseButton, NoSurface, Point};
    use crossbeam_channel::bounded;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::thread;
    use std::time::Duration;

    #[derive(Default)]
    struct CountingSink {
        clicks: AtomicU64,
    }

    impl ClickSink for CountingSink {
        fn click(&self, _button: MouseButton) -> Result<(), String> {
            self.clicks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Fixture {
        router: InputRouter,
        config: ConfigStore,
        capture: Arc<HotkeyCapture>,
        controller: Arc<ActivationController>,
    }

    fn fixture(config: ClickConfig) -> Fixture {
        let config = ConfigStore::new(config);
        let status = Arc::new(|_: &str| {});
        let capture = Arc::new(HotkeyCapture::new(config.clone(), status, Arc::new(NoSurface)));
        let controller = Arc::new(ActivationController::new(
            config.clone(),
            Arc::new(CountingSink::default()),
        ));
        Fixture {
            router: InputRouter::new(config.clone(), capture.clone(), controller.clone()),
            config,
            capture,
            controller,
        }
    }

    fn infinite_on(hotkey: HotkeyBinding, mode: ActivationMode) -> ClickConfig {
        ClickConfig {
            interval: 50.0,
            mode,
            hotkey,
            ..ClickConfig::default()
        }
    }

    fn key(code: &str) -> HotkeyBinding {
        HotkeyBinding::Keyboard(KeyCode::from(code))
    }

    fn mouse_press(button: MouseButton) -> InputEvent {
        InputEvent::MousePress {
            button,
            position: Point::default(),
        }
    }

    fn mouse_release(button: MouseButton) -> InputEvent {
        InputEvent::MouseRelease {
            button,
            position: Point::default(),
        }
    }

    #[test]
    fn test_toggle_press_flips_release_ignored() {
        let f = fixture(infinite_on(key("F6"), ActivationMode::Toggle));
        assert_eq!(
            f.router.dispatch(&InputEvent::KeyPress("F6".into())),
            RouteOutcome::Toggled(ActivationState::Active)
        );
        assert_eq!(f.router.dispatch(&InputEvent::KeyRelease("F6".into())), RouteOutcome::Unchanged);
        assert_eq!(f.controller.state(), ActivationState::Active);
        assert_eq!(
            f.router.dispatch(&InputEvent::KeyPress("F6".into())),
            RouteOutcome::Toggled(ActivationState::Idle)
        );
    }

    #[test]
    fn test_hold_press_and_release() {
        let f = fixture(infinite_on(HotkeyBinding::Mouse(MouseButton::Middle), ActivationMode::Hold));
        assert_eq!(f.router.dispatch(&mouse_press(MouseButton::Middle)), RouteOutcome::Engaged);
        assert_eq!(f.router.dispatch(&mouse_press(MouseButton::Middle)), RouteOutcome::Unchanged);
        assert_eq!(f.router.dispatch(&mouse_release(MouseButton::Middle)), RouteOutcome::Disengaged);
        assert_eq!(f.router.dispatch(&mouse_release(MouseButton::Middle)), RouteOutcome::Unchanged);
        assert_eq!(f.controller.state(), ActivationState::Idle);
    }

    #[test]
    fn test_hold_release_of_other_input_does_not_stop() {
        let f = fixture(infinite_on(key("KeyQ"), ActivationMode::Hold));
        f.router.dispatch(&InputEvent::KeyPress("KeyQ".into()));
        assert_eq!(f.router.dispatch(&InputEvent::KeyRelease("KeyW".into())), RouteOutcome::NoMatch);
        assert_eq!(f.router.dispatch(&mouse_release(MouseButton::Left)), RouteOutcome::NoMatch);
        assert_eq!(f.controller.state(), ActivationState::Active);
        f.router.dispatch(&InputEvent::KeyRelease("KeyQ".into()));
        assert_eq!(f.controller.state(), ActivationState::Idle);
    }

    #[test]
    fn test_keyboard_binding_never_matches_mouse() {
        let f = fixture(infinite_on(key("F6"), ActivationMode::Toggle));
        for button in [MouseButton::Left, MouseButton::Right, MouseButton::Middle, MouseButton::Extra(1)] {
            assert_eq!(f.router.dispatch(&mouse_press(button)), RouteOutcome::NoMatch);
        }
        assert_eq!(f.controller.state(), ActivationState::Idle);
    }

    #[test]
    fn test_unset_binding_has_no_effect() {
        let f = fixture(infinite_on(HotkeyBinding::Unset, ActivationMode::Toggle));
        assert_eq!(f.router.dispatch(&InputEvent::KeyPress("F6".into())), RouteOutcome::NoMatch);
        assert_eq!(f.router.dispatch(&mouse_press(MouseButton::Left)), RouteOutcome::NoMatch);
        assert_eq!(f.controller.state(), ActivationState::Idle);
    }

    #[test]
    fn test_capture_suppresses_activation() {
        let f = fixture(infinite_on(key("F6"), ActivationMode::Toggle));
        f.capture.begin_capture();
        let outcome = f.router.dispatch(&InputEvent::KeyPress("F6".into()));
        assert_eq!(outcome, RouteOutcome::Capture(CaptureOutcome::Bound(key("F6"))));
        assert_eq!(f.controller.state(), ActivationState::Idle);

        // Capture has ended, the same key now toggles.
        assert_eq!(
            f.router.dispatch(&InputEvent::KeyPress("F6".into())),
            RouteOutcome::Toggled(ActivationState::Active)
        );
        f.controller.shutdown();
    }

    #[test]
    fn test_capture_stops_active_hold_run() {
        let f = fixture(infinite_on(key("Space"), ActivationMode::Hold));
        assert_eq!(f.router.dispatch(&InputEvent::KeyPress("Space".into())), RouteOutcome::Engaged);

        assert!(f.router.begin_capture());
        assert_eq!(f.controller.state(), ActivationState::Idle);
        assert!(!f.controller.is_running());
        assert_eq!(
            f.router.dispatch(&InputEvent::KeyRelease("Space".into())),
            RouteOutcome::Capture(CaptureOutcome::Ignored(crate::CaptureIgnore::Release))
        );
        assert_eq!(f.controller.state(), ActivationState::Idle);
        assert!(!f.router.begin_capture());
    }

    #[test]
    fn test_rebinding_switches_kind() {
        let f = fixture(infinite_on(key("F6"), ActivationMode::Toggle));
        f.capture.begin_capture();
        f.router.dispatch(&mouse_press(MouseButton::Right));
        assert_eq!(f.config.hotkey(), HotkeyBinding::Mouse(MouseButton::Right));
        assert_eq!(f.router.dispatch(&InputEvent::KeyPress("F6".into())), RouteOutcome::NoMatch);
        assert_eq!(
            f.router.dispatch(&mouse_press(MouseButton::Right)),
            RouteOutcome::Toggled(ActivationState::Active)
        );
        f.controller.shutdown();
    }

    #[test]
    fn test_run_processes_in_order_until_shutdown() {
        let f = fixture(infinite_on(key("F6"), ActivationMode::Hold));
        let (event_tx, event_rx) = bounded(16);
        let (shutdown_tx, shutdown_rx) = bounded(1);

        let controller = f.controller.clone();
        let runner = thread::spawn(move || f.router.run(&event_rx, &shutdown_rx));

        for _ in 0..5 {
            event_tx.send(InputEvent::KeyPress("F6".into())).unwrap();
            event_tx.send(InputEvent::KeyRelease("F6".into())).unwrap();
        }
        thread::sleep(Duration::from_millis(100));
        assert_eq!(controller.state(), ActivationState::Idle);

        shutdown_tx.send(()).unwrap();
        runner.join().unwrap();
    }
}
