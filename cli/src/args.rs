//! Command-line arguments and how they are applied to the configuration.

use autoclick_core::{
    ActivationMode, ConfigError, ConfigStore, HotkeyBinding, IntervalUnit, MouseButton, StatusSink,
};
use autoclick_platform::canonical_key_name;
use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

/// Auto clicker driven by a global hotkey.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Auto clicker driven by a global hotkey",
    long_about = "Auto clicker driven by a global hotkey.

Press the hotkey (F6 by default) to start clicking at the current cursor
position. In toggle mode the next press stops; in hold mode clicking lasts
while the hotkey is held.

Settings are loaded from and saved back to the settings file. Options given
here override the stored values and are saved on exit. Press Ctrl+C to quit."
)]
pub struct Args {
    /// Clicks per activation (ignored with --infinite)
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub count: Option<String>,

    /// Click until stopped
    #[arg(long, conflicts_with = "finite")]
    pub infinite: bool,

    /// Stop after --count clicks
    #[arg(long)]
    pub finite: bool,

    /// Pause between clicks, in --unit
    #[arg(short, long, value_name = "INTERVAL")]
    pub interval: Option<String>,

    /// Interval unit: ms, s, min or h
    #[arg(short, long)]
    pub unit: Option<String>,

    /// Button to click: left, right, middle or extraN
    #[arg(short, long)]
    pub button: Option<String>,

    /// Activation mode: toggle or hold
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Bind the hotkey to a keyboard key, by name (e.g. F6, KeyQ, Unknown(65))
    #[arg(long, value_name = "KEY", conflicts_with = "hotkey_mouse")]
    pub hotkey_key: Option<String>,

    /// Bind the hotkey to a mouse button (e.g. middle, extra1)
    #[arg(long, value_name = "BUTTON")]
    pub hotkey_mouse: Option<String>,

    /// Bind the hotkey to the next key or mouse button pressed
    #[arg(long)]
    pub capture: bool,

    /// Log clicks instead of injecting them
    #[arg(long)]
    pub dry_run: bool,

    /// Settings file (defaults to the per-user data directory)
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Also write logs to a daily rolling file
    #[arg(long)]
    pub log_file: bool,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Apply overrides to `store`. Invalid values are reported and the stored value kept.
    pub fn apply(&self, store: &ConfigStore, status: &dyn StatusSink) {
        let report = |e: ConfigError| status.status(&format!("Ignoring option: {e}"));

        if let Some(count) = &self.count {
            if let Err(e) = store.edit_click_count(count) {
                report(e);
            }
        }
        if let Some(interval) = &self.interval {
            if let Err(e) = store.edit_interval(interval) {
                report(e);
            }
        }
        if self.infinite {
            store.update(|c| c.infinite = true);
        }
        if self.finite {
            store.update(|c| c.infinite = false);
        }
        if let Some(unit) = parse_option::<IntervalUnit>(&self.unit, &report) {
            store.update(|c| c.interval_unit = unit);
        }
        if let Some(button) = parse_option::<MouseButton>(&self.button, &report) {
            store.update(|c| c.button = button);
        }
        if let Some(mode) = parse_option::<ActivationMode>(&self.mode, &report) {
            store.set_mode(mode);
        }
        if let Some(key) = &self.hotkey_key {
            match canonical_key_name(key) {
                Some(code) => store.set_hotkey(HotkeyBinding::Keyboard(code)),
                None => report(ConfigError::UnknownKey(key.clone())),
            }
        }
        if let Some(button) = parse_option::<MouseButton>(&self.hotkey_mouse, &report) {
            store.set_hotkey(HotkeyBinding::Mouse(button));
        }
    }
}

fn parse_option<T>(value: &Option<String>, report: &dyn Fn(ConfigError)) -> Option<T>
where
    T: FromStr<Err = ConfigError>,
{
    match value.as_deref()?.parse() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            report(e);
            None
        }
    }
}
