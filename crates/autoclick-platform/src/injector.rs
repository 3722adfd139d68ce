//! Click injection implementations.

use crate::{PlatformError, PlatformResult};
use autoclick_core::{ClickSink, MouseButton};
use enigo::{Button, Direction, Enigo, Mouse, Settings};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

/// No-op injector for dry runs and testing.
pub struct NoopInjector;

impl ClickSink for NoopInjector {
    fn click(&self, button: MouseButton) -> Result<(), String> {
        info!(%button, "NoopInjector: would click");
        Ok(())
    }
}

/// Real click injector using `enigo` crate.
pub struct EnigoInjector {
    enigo: Mutex<Enigo>,
}

impl EnigoInjector {
    /// Create a new EnigoInjector.
    pub fn new() -> PlatformResult<Self> {
        let settings = Settings::default();
        let enigo = Enigo::new(&settings).map_err(|e| {
            PlatformError::InjectionFailed(format!("failed to create Enigo: {e}"))
        })?;
        Ok(Self {
            enigo: Mutex::new(enigo),
        })
    }

    /// Press and release `button` wherever the cursor currently is.
    pub fn inject_click(&self, button: MouseButton) -> PlatformResult<()> {
        let btn = mouse_button_to_enigo(button)?;
        let mut enigo = self.enigo.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(%button, "injecting click");
        enigo
            .button(btn, Direction::Click)
            .map_err(|e| PlatformError::InjectionFailed(e.to_string()))
    }
}

impl ClickSink for EnigoInjector {
    fn click(&self, button: MouseButton) -> Result<(), String> {
        self.inject_click(button).map_err(|e| e.to_string())
    }
}

fn mouse_button_to_enigo(button: MouseButton) -> PlatformResult<Button> {
    match button {
        MouseButton::Left => Ok(Button::Left),
        MouseButton::Right => Ok(Button::Right),
        MouseButton::Middle => Ok(Button::Middle),
        #[cfg(not(target_os = "macos"))]
        MouseButton::Extra(1) => Ok(Button::Back),
        #[cfg(not(target_os = "macos"))]
        MouseButton::Extra(2) => Ok(Button::Forward),
        MouseButton::Extra(_) => Err(PlatformError::UnsupportedButton(button)),
    }
}
