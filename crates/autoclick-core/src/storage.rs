//! Settings storage and persistence.
//!
//! Settings are a flat JSON object. Every field is decoded on its own and
//! falls back to its default when absent or malformed.

use crate::{ClickConfig, HotkeyBinding, KeyCode, MouseButton};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Settings not found: {0}")]
    NotFound(PathBuf),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Get the app data directory for autoclick.
pub fn get_app_data_dir() -> PathBuf {
    let base = dirs_next::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("autoclick")
}

/// Default location of the settings file.
pub fn default_settings_path() -> PathBuf {
    get_app_data_dir().join("settings.json")
}

/// Directory for rolling log files.
pub fn get_log_dir() -> PathBuf {
    get_app_data_dir().join("logs")
}

/// On-disk layout, written in this field order.
#[derive(Serialize)]
struct StoredSettings {
    click_count: u64,
    infinite_clicks: bool,
    delay: f64,
    time_unit: String,
    mouse_button: String,
    hotkey: String,
    hotkey_type: Option<&'static str>,
    hotkey_code: Option<String>,
    mode: String,
}

/// Encode a configuration as the flat settings record.
pub fn encode_settings(config: &ClickConfig) -> Value {
    let (hotkey_type, hotkey_code) = match &config.hotkey {
        HotkeyBinding::Unset => (None, None),
        HotkeyBinding::Keyboard(code) => (Some("keyboard"), Some(code.to_string())),
        HotkeyBinding::Mouse(button) => (Some("mouse"), Some(button.to_string())),
    };
    let stored = StoredSettings {
        click_count: config.click_count,
        infinite_clicks: config.infinite,
        delay: config.interval,
        time_unit: config.interval_unit.to_string(),
        mouse_button: config.button.to_string(),
        hotkey: config.hotkey.label(),
        hotkey_type,
        hotkey_code,
        mode: config.mode.to_string(),
    };
    // A struct of plain fields always serializes.
    serde_json::to_value(stored).unwrap_or(Value::Null)
}

/// Decode a settings record, defaulting each field independently.
pub fn decode_settings(value: &Value) -> ClickConfig {
    let defaults = ClickConfig::default();
    let Some(record) = value.as_object() else {
        warn!("settings are not a JSON object, using defaults");
        return defaults;
    };

    ClickConfig {
        click_count: field(record, "click_count", Value::as_u64).unwrap_or(defaults.click_count),
        infinite: field(record, "infinite_clicks", Value::as_bool).unwrap_or(defaults.infinite),
        interval: field(record, "delay", |v| v.as_f64().filter(|d| d.is_finite() && *d >= 0.0))
            .unwrap_or(defaults.interval),
        interval_unit: field(record, "time_unit", |v| v.as_str()?.parse().ok())
            .unwrap_or(defaults.interval_unit),
        button: field(record, "mouse_button", |v| v.as_str()?.parse().ok())
            .unwrap_or(defaults.button),
        mode: field(record, "mode", |v| v.as_str()?.parse().ok()).unwrap_or(defaults.mode),
        hotkey: decode_hotkey(record).unwrap_or(defaults.hotkey),
    }
}

/// Look up and convert one field, warning when it is present but unusable.
fn field<T>(record: &Map<String, Value>, key: &str, convert: impl Fn(&Value) -> Option<T>) -> Option<T> {
    let value = record.get(key)?;
    let converted = convert(value);
    if converted.is_none() {
        warn!(key, %value, "malformed settings field, using default");
    }
    converted
}

/// `hotkey_type` absent means "use the default binding"; explicit null means unset.
fn decode_hotkey(record: &Map<String, Value>) -> Option<HotkeyBinding> {
    let kind = record.get("hotkey_type")?;
    let code = record.get("hotkey_code");
    let binding = match (kind.as_str(), code) {
        (None, _) if kind.is_null() => Some(HotkeyBinding::Unset),
        (Some("keyboard"), Some(Value::String(s))) if !s.trim().is_empty() => {
            Some(HotkeyBinding::Keyboard(KeyCode::new(s.clone())))
        }
        (Some("keyboard"), Some(Value::Number(n))) => Some(HotkeyBinding::Keyboard(KeyCode::new(n.to_string()))),
        (Some("mouse"), Some(Value::String(s))) => s.parse::<MouseButton>().ok().map(HotkeyBinding::Mouse),
        _ => None,
    };
    if binding.is_none() {
        warn!(?kind, ?code, "malformed hotkey in settings, using default");
    }
    binding
}

/// Load settings from `path`.
pub fn load_settings(path: &Path) -> StorageResult<ClickConfig> {
    if !path.exists() {
        return Err(StorageError::NotFound(path.to_path_buf()));
    }
    let json = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&json)?;
    debug!(?path, "Loaded settings");
    Ok(decode_settings(&value))
}

/// Load settings, falling back to defaults on any error.
///
/// A missing file is created with the defaults.
pub fn load_settings_or_default(path: &Path) -> ClickConfig {
    match load_settings(path) {
        Ok(config) => {
            info!(?path, "Loaded settings");
            config
        }
        Err(StorageError::NotFound(_)) => {
            let defaults = ClickConfig::default();
            match save_settings(path, &defaults) {
                Ok(()) => info!(?path, "Created initial settings file"),
                Err(e) => warn!(error = %e, "Could not create initial settings file"),
            }
            defaults
        }
        Err(e) => {
            warn!(error = %e, ?path, "Error loading settings, using defaults");
            ClickConfig::default()
        }
    }
}

/// Save settings to `path`, replacing the old file atomically.
pub fn save_settings(path: &Path, config: &ClickConfig) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
            info!(?parent, "Created settings directory");
        }
    }

    let json = serde_json::to_string_pretty(&encode_settings(config))?;
    let tmp = tmp_path(path);
    fs::write(&tmp, json)?;

    if let Err(e) = fs::rename(&tmp, path) {
        if e.kind() == io::ErrorKind::PermissionDenied {
            let _ = fs::remove_file(&tmp);
        }
        return Err(e.into());
    }

    info!(?path, "Saved settings");
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActivationMode, IntervalUnit};
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn scratch_path(name: &str) -> PathBuf {
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir()
            .join(format!("autoclick-test-{}-{}", std::process::id(), n))
            .join(name)
    }

    #[test]
    fn test_missing_fields_default_independently() {
        let config = decode_settings(&json!({ "click_count": 9, "mode": "hold" }));
        let defaults = ClickConfig::default();
        assert_eq!(config.click_count, 9);
        assert_eq!(config.mode, ActivationMode::Hold);
        assert_eq!(config.infinite, defaults.infinite);
        assert_eq!(config.interval_unit, defaults.interval_unit);
        assert_eq!(config.hotkey, defaults.hotkey);
    }

    #[test]
    fn test_malformed_fields_fall_back() {
        let config = decode_settings(&json!({
            "click_count": "lots",
            "infinite_clicks": false,
            "delay": -4,
            "time_unit": "seconds",
            "mouse_button": "thumb",
            "mode": 3,
            "hotkey_type": "keyboard",
        }));
        let defaults = ClickConfig::default();
        assert_eq!(config.click_count, defaults.click_count);
        assert!(!config.infinite);
        assert_eq!(config.interval, defaults.interval);
        assert_eq!(config.interval_unit, IntervalUnit::Seconds);
        assert_eq!(config.button, defaults.button);
        assert_eq!(config.mode, defaults.mode);
        assert_eq!(config.hotkey, defaults.hotkey);
    }

    #[test]
    fn test_not_an_object() {
        assert_eq!(decode_settings(&json!([1, 2, 3])), ClickConfig::default());
    }

    #[test]
    fn test_hotkey_decoding() {
        let unset = decode_settings(&json!({ "hotkey_type": null, "hotkey_code": null }));
        assert_eq!(unset.hotkey, HotkeyBinding::Unset);

        let mouse = decode_settings(&json!({ "hotkey_type": "mouse", "hotkey_code": "middle" }));
        assert_eq!(mouse.hotkey, HotkeyBinding::Mouse(MouseButton::Middle));

        let vk = decode_settings(&json!({ "hotkey_type": "keyboard", "hotkey_code": 117 }));
        assert_eq!(vk.hotkey, HotkeyBinding::Keyboard(KeyCode::from("117")));
    }

    #[test]
    fn test_encoded_record_layout() {
        let config = ClickConfig {
            click_count: 5,
            infinite: false,
            interval: 1.5,
            interval_unit: IntervalUnit::Minutes,
            button: MouseButton::Extra(2),
            mode: ActivationMode::Hold,
            hotkey: HotkeyBinding::Mouse(MouseButton::Middle),
        };
        let value = encode_settings(&config);
        assert_eq!(value["time_unit"], "minutes");
        assert_eq!(value["mouse_button"], "extra2");
        assert_eq!(value["hotkey"], "middle");
        assert_eq!(value["hotkey_type"], "mouse");
        assert_eq!(decode_settings(&value), config);
    }

    #[test]
    fn test_save_then_load() {
        let path = scratch_path("settings.json");
        let config = ClickConfig {
            click_count: 3,
            infinite: false,
            hotkey: HotkeyBinding::Keyboard(KeyCode::from("F9")),
            ..ClickConfig::default()
        };
        save_settings(&path, &config).unwrap();
        assert!(!tmp_path(&path).exists());
        assert_eq!(load_settings(&path).unwrap(), config);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_file_creates_defaults() {
        let path = scratch_path("settings.json");
        assert!(matches!(load_settings(&path), Err(StorageError::NotFound(_))));
        assert_eq!(load_settings_or_default(&path), ClickConfig::default());
        assert!(path.exists());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_corrupt_file_uses_defaults() {
        let path = scratch_path("settings.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_settings(&path), Err(StorageError::Json(_))));
        assert_eq!(load_settings_or_default(&path), ClickConfig::default());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_tmp_path() {
        assert_eq!(tmp_path(Path::new("/a/settings.json")), PathBuf::from("/a/settings.json.tmp"));
    }
}
