//! Click configuration and the shared configuration store.

use crate::{ActivationMode, HotkeyBinding, IntervalUnit, KeyCode, MouseButton};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid {field}: {value:?} is not a valid number")]
    InvalidNumber { field: &'static str, value: String },
    #[error("unknown time unit: {0}")]
    UnknownUnit(String),
    #[error("unknown mouse button: {0}")]
    UnknownButton(String),
    #[error("unknown activation mode: {0}")]
    UnknownMode(String),
    #[error("unknown key name: {0}")]
    UnknownKey(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Everything the clicker needs to know about one run.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickConfig {
    /// Clicks per run when `infinite` is false. Zero means no clicks.
    pub click_count: u64,
    pub infinite: bool,
    /// Pause between clicks, in `interval_unit`.
    pub interval: f64,
    pub interval_unit: IntervalUnit,
    pub button: MouseButton,
    pub mode: ActivationMode,
    pub hotkey: HotkeyBinding,
}

impl Default for ClickConfig {
    fn default() -> Self {
        Self {
            click_count: 0,
            infinite: true,
            interval: 0.0,
            interval_unit: IntervalUnit::Milliseconds,
            button: MouseButton::Left,
            mode: ActivationMode::Toggle,
            hotkey: HotkeyBinding::Keyboard(KeyCode::from("F6")),
        }
    }
}

impl ClickConfig {
    /// Interval converted to milliseconds.
    pub fn delay_ms(&self) -> f64 {
        self.interval * self.interval_unit.multiplier_ms()
    }

    /// Pause between two clicks. Negative or NaN intervals collapse to zero.
    pub fn effective_delay(&self) -> Duration {
        let secs = self.delay_ms() / 1000.0;
        if secs.is_nan() || secs <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Number of clicks a run may emit, `None` for unlimited.
    pub fn click_budget(&self) -> Option<u64> {
        if self.infinite {
            None
        } else {
            Some(self.click_count)
        }
    }
}

/// Parse a user-entered click count.
pub fn parse_click_count(text: &str) -> ConfigResult<u64> {
    text.trim().parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
        field: "click count",
        value: text.to_string(),
    })
}

/// Parse a user-entered interval. Must be finite and non-negative.
pub fn parse_interval(text: &str) -> ConfigResult<f64> {
    match text.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(ConfigError::InvalidNumber {
            field: "interval",
            value: text.to_string(),
        }),
    }
}

/// Shared, lock-protected current configuration.
///
/// Cloning the store shares the same underlying configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    inner: Arc<Mutex<ClickConfig>>,
}

impl ConfigStore {
    pub fn new(config: ClickConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(config)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ClickConfig> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current configuration, used as a run snapshot.
    pub fn snapshot(&self) -> ClickConfig {
        self.lock().clone()
    }

    /// Read part of the configuration under a single lock.
    pub fn read<R>(&self, f: impl FnOnce(&ClickConfig) -> R) -> R {
        f(&self.lock())
    }

    /// Mutate the configuration under a single lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut ClickConfig) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn mode(&self) -> ActivationMode {
        self.lock().mode
    }

    pub fn set_mode(&self, mode: ActivationMode) {
        self.lock().mode = mode;
    }

    pub fn hotkey(&self) -> HotkeyBinding {
        self.lock().hotkey.clone()
    }

    pub fn set_hotkey(&self, hotkey: HotkeyBinding) {
        debug!(hotkey = %hotkey.label(), "hotkey updated");
        self.lock().hotkey = hotkey;
    }

    /// Apply a click count typed by the user. On error the last valid value is kept.
    pub fn edit_click_count(&self, text: &str) -> ConfigResult<u64> {
        match parse_click_count(text) {
            Ok(count) => {
                self.lock().click_count = count;
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, kept = self.lock().click_count, "rejected click count edit");
                Err(e)
            }
        }
    }

    /// Apply an interval typed by the user. On error the last valid value is kept.
    pub fn edit_interval(&self, text: &str) -> ConfigResult<f64> {
        match parse_interval(text) {
            Ok(interval) => {
                self.lock().interval = interval;
                Ok(interval)
            }
            Err(e) => {
                warn!(error = %e, kept = self.lock().interval, "rejected interval edit");
                Err(e)
            }
        }
    }
}
