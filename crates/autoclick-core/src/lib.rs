//! autoclick-core: hotkey routing, activation state machine and click loop.
//!
//! Design goal: keep this crate UI-agnostic and platform-agnostic.
//! Platform specific I/O (hook/inject) lives in `autoclick-platform`.

mod capture;
mod click_loop;
mod config;
mod controller;
mod router;
mod storage;

pub use capture::{CaptureIgnore, CaptureOutcome, ConfigSurface, HotkeyCapture, NoSurface, CAPTURE_PROMPT};
pub use click_loop::{run_click_loop, ClickLoop, ClickLoopHandle, ClickSink, LoopExit};
pub use config::{parse_click_count, parse_interval, ClickConfig, ConfigError, ConfigResult, ConfigStore};
pub use controller::{ActivationController, ActivationState};
pub use router::{InputRouter, RouteOutcome};
pub use storage::{
    decode_settings, default_settings_path, encode_settings, get_app_data_dir, get_log_dir,
    load_settings, load_settings_or_default, save_settings, StorageError, StorageResult,
};

use std::fmt;
use std::str::FromStr;

/// Mouse buttons the clicker can emit or bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    /// Side button, numbered from 1 (1 is back, 2 is forward).
    Extra(u8),
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MouseButton::Left => f.write_str("left"),
            MouseButton::Right => f.write_str("right"),
            MouseButton::Middle => f.write_str("middle"),
            MouseButton::Extra(n) => write!(f, "extra{n}"),
        }
    }
}

impl FromStr for MouseButton {
    type Err = ConfigError;

    /// Accepts `left`, `right`, `middle`, `extraN` and the legacy
    /// `button4`..`button8` names: 4 and 6 are the first side button, 5 and 7
    /// the second, 8 is middle.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let parsed = match name.as_str() {
            "left" => Some(MouseButton::Left),
            "right" => Some(MouseButton::Right),
            "middle" => Some(MouseButton::Middle),
            other => {
                if let Some(n) = other.strip_prefix("extra") {
                    n.parse::<u8>().ok().filter(|n| *n >= 1).map(MouseButton::Extra)
                } else if let Some(n) = other.strip_prefix("button") {
                    match n {
                        "4" | "6" => Some(MouseButton::Extra(1)),
                        "5" | "7" => Some(MouseButton::Extra(2)),
                        "8" => Some(MouseButton::Middle),
                        _ => None,
                    }
                } else {
                    None
                }
            }
        };
        parsed.ok_or_else(|| ConfigError::UnknownButton(s.to_string()))
    }
}

/// Unit the click interval is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntervalUnit {
    #[default]
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
}

impl IntervalUnit {
    /// Number of milliseconds in one unit.
    pub fn multiplier_ms(self) -> f64 {
        match self {
            IntervalUnit::Milliseconds => 1.0,
            IntervalUnit::Seconds => 1_000.0,
            IntervalUnit::Minutes => 60_000.0,
            IntervalUnit::Hours => 3_600_000.0,
        }
    }
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IntervalUnit::Milliseconds => "ms",
            IntervalUnit::Seconds => "seconds",
            IntervalUnit::Minutes => "minutes",
            IntervalUnit::Hours => "hours",
        })
    }
}

impl FromStr for IntervalUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ms" | "millis" | "milliseconds" => Ok(IntervalUnit::Milliseconds),
            "s" | "sec" | "secs" | "seconds" => Ok(IntervalUnit::Seconds),
            "min" | "mins" | "minutes" => Ok(IntervalUnit::Minutes),
            "h" | "hr" | "hours" => Ok(IntervalUnit::Hours),
            _ => Err(ConfigError::UnknownUnit(s.to_string())),
        }
    }
}

/// How the hotkey drives activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivationMode {
    /// Each press flips between idle and active.
    #[default]
    Toggle,
    /// Active while the hotkey is held down.
    Hold,
}

impl fmt::Display for ActivationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActivationMode::Toggle => "toggle",
            ActivationMode::Hold => "hold",
        })
    }
}

impl FromStr for ActivationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "toggle" => Ok(ActivationMode::Toggle),
            "hold" => Ok(ActivationMode::Hold),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

/// Opaque keyboard key identifier as reported by the input source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCode(String);

impl KeyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for KeyCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The trigger that drives activation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HotkeyBinding {
    /// Matches nothing.
    #[default]
    Unset,
    Keyboard(KeyCode),
    Mouse(MouseButton),
}

impl HotkeyBinding {
    /// Whether `event` (press or release) was produced by this binding.
    pub fn matches(&self, event: &InputEvent) -> bool {
        match (self, event) {
            (HotkeyBinding::Keyboard(bound), InputEvent::KeyPress(code))
            | (HotkeyBinding::Keyboard(bound), InputEvent::KeyRelease(code)) => bound == code,
            (HotkeyBinding::Mouse(bound), InputEvent::MousePress { button, .. })
            | (HotkeyBinding::Mouse(bound), InputEvent::MouseRelease { button, .. }) => {
                bound == button
            }
            _ => false,
        }
    }

    /// Human-readable label, e.g. `F6` or `middle`.
    pub fn label(&self) -> String {
        match self {
            HotkeyBinding::Unset => "None".to_string(),
            HotkeyBinding::Keyboard(code) => code.to_string(),
            HotkeyBinding::Mouse(button) => button.to_string(),
        }
    }
}

/// Screen position in physical pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Global input event delivered by the input source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    KeyPress(KeyCode),
    KeyRelease(KeyCode),
    MousePress { button: MouseButton, position: Point },
    MouseRelease { button: MouseButton, position: Point },
}

impl InputEvent {
    pub fn is_press(&self) -> bool {
        matches!(self, InputEvent::KeyPress(_) | InputEvent::MousePress { .. })
    }
}

/// Receiver of human-readable status lines. An empty message clears the status.
pub trait StatusSink: Send + Sync {
    fn status(&self, message: &str);
}

impl<F> StatusSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn status(&self, message: &str) {
        self(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_multipliers() {
        assert_eq!(IntervalUnit::Milliseconds.multiplier_ms(), 1.0);
        assert_eq!(IntervalUnit::Seconds.multiplier_ms(), 1_000.0);
        assert_eq!(IntervalUnit::Minutes.multiplier_ms(), 60_000.0);
        assert_eq!(IntervalUnit::Hours.multiplier_ms(), 3_600_000.0);
    }

    #[test]
    fn test_parse_unit_names() {
        assert_eq!("ms".parse::<IntervalUnit>().unwrap(), IntervalUnit::Milliseconds);
        assert_eq!("s".parse::<IntervalUnit>().unwrap(), IntervalUnit::Seconds);
        assert_eq!("Seconds".parse::<IntervalUnit>().unwrap(), IntervalUnit::Seconds);
        assert_eq!("min".parse::<IntervalUnit>().unwrap(), IntervalUnit::Minutes);
        assert_eq!("hours".parse::<IntervalUnit>().unwrap(), IntervalUnit::Hours);
        assert!("fortnights".parse::<IntervalUnit>().is_err());
    }

    #[test]
    fn test_parse_mouse_button() {
        assert_eq!("left".parse::<MouseButton>().unwrap(), MouseButton::Left);
        assert_eq!("MIDDLE".parse::<MouseButton>().unwrap(), MouseButton::Middle);
        assert_eq!("extra2".parse::<MouseButton>().unwrap(), MouseButton::Extra(2));
        assert_eq!("button4".parse::<MouseButton>().unwrap(), MouseButton::Extra(1));
        assert_eq!("button5".parse::<MouseButton>().unwrap(), MouseButton::Extra(2));
        assert_eq!("button6".parse::<MouseButton>().unwrap(), MouseButton::Extra(1));
        assert_eq!("button7".parse::<MouseButton>().unwrap(), MouseButton::Extra(2));
        assert_eq!("button8".parse::<MouseButton>().unwrap(), MouseButton::Middle);
        assert!("button3".parse::<MouseButton>().is_err());
        assert!("button9".parse::<MouseButton>().is_err());
        assert!("extra0".parse::<MouseButton>().is_err());
        assert!("thumb".parse::<MouseButton>().is_err());
    }

    #[test]
    fn test_keyboard_binding_ignores_mouse() {
        let binding = HotkeyBinding::Keyboard(KeyCode::from("F6"));
        assert!(binding.matches(&InputEvent::KeyPress("F6".into())));
        assert!(binding.matches(&InputEvent::KeyRelease("F6".into())));
        assert!(!binding.matches(&InputEvent::KeyPress("F7".into())));
        assert!(!binding.matches(&InputEvent::MousePress {
            button: MouseButton::Left,
            position: Point::default(),
        }));
    }

    #[test]
    fn test_mouse_binding_ignores_keys() {
        let binding = HotkeyBinding::Mouse(MouseButton::Middle);
        assert!(binding.matches(&InputEvent::MouseRelease {
            button: MouseButton::Middle,
            position: Point { x: 5, y: 5 },
        }));
        assert!(!binding.matches(&InputEvent::MousePress {
            button: MouseButton::Right,
            position: Point::default(),
        }));
        assert!(!binding.matches(&InputEvent::KeyPress("middle".into())));
    }

    #[test]
    fn test_unset_matches_nothing() {
        let binding = HotkeyBinding::Unset;
        assert!(!binding.matches(&InputEvent::KeyPress("F6".into())));
        assert!(!binding.matches(&InputEvent::MousePress {
            button: MouseButton::Left,
            position: Point::default(),
        }));
        assert_eq!(binding.label(), "None");
    }
}
