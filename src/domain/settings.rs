use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_true")]
    pub console_logging_enabled: bool,
    #[serde(default = "default_false")]
    pub file_logging_enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_prefix")]
    pub file_name_prefix: String,
    #[serde(default = "default_rotation")]
    pub rotation: String, // "daily", "hourly", "minutely", "never"
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            console_logging_enabled: default_true(),
            file_logging_enabled: default_false(),
            log_dir: default_log_dir(),
            file_name_prefix: default_prefix(),
            rotation: default_rotation(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_log_dir() -> String {
    "logs".to_string()
}
fn default_prefix() -> String {
    "weartouch".to_string()
}
fn default_rotation() -> String {
    "daily".to_string()
}

/// Persisted controller settings.
///
/// The BLE UUIDs are overridable for prototype garments flashed with a
/// different vendor namespace; the defaults match production firmware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_service_uuid")]
    pub ble_service_uuid: String,
    #[serde(default = "default_analog_uuid")]
    pub ble_analog_char_uuid: String,
    #[serde(default = "default_led_uuid")]
    pub ble_led_char_uuid: String,

    #[serde(default = "default_scan_timeout_secs")]
    pub scan_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Silence window after which a synthetic release frame is emitted.
    #[serde(default = "default_idle_release_ms")]
    pub idle_release_ms: u64,

    #[serde(default)]
    pub log_settings: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ble_service_uuid: default_service_uuid(),
            ble_analog_char_uuid: default_analog_uuid(),
            ble_led_char_uuid: default_led_uuid(),
            scan_timeout_secs: default_scan_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            idle_release_ms: default_idle_release_ms(),
            log_settings: LogSettings::default(),
        }
    }
}

fn default_service_uuid() -> String {
    "d45c2000-4270-a125-a25d-ee458c085001".to_string()
}
fn default_analog_uuid() -> String {
    "d45c2010-4270-a125-a25d-ee458c085001".to_string()
}
fn default_led_uuid() -> String {
    "d45c2080-4270-a125-a25d-ee458c085001".to_string()
}
fn default_scan_timeout_secs() -> u64 {
    15
}
fn default_connect_timeout_secs() -> u64 {
    10
}
fn default_idle_release_ms() -> u64 {
    50
}

pub struct SettingsService {
    settings: Settings,
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new() -> anyhow::Result<Self> {
        let settings_path = Self::get_settings_path()?;
        let settings = Self::load_from_file(&settings_path).unwrap_or_default();

        Ok(Self {
            settings,
            settings_path,
        })
    }

    fn get_settings_path() -> anyhow::Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        path.push("weartouch");
        fs::create_dir_all(&path)?;
        path.push("settings.json");
        Ok(path)
    }

    fn load_from_file(path: &PathBuf) -> anyhow::Result<Settings> {
        let contents = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.settings_path, json)?;
        Ok(())
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_fills_every_default() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.idle_release_ms, 50);
        assert_eq!(
            settings.ble_service_uuid,
            "d45c2000-4270-a125-a25d-ee458c085001"
        );
    }

    #[test]
    fn partial_json_keeps_overrides() {
        let settings: Settings =
            serde_json::from_str(r#"{"scan_timeout_secs": 3, "idle_release_ms": 80}"#).unwrap();
        assert_eq!(settings.scan_timeout_secs, 3);
        assert_eq!(settings.idle_release_ms, 80);
        assert_eq!(settings.connect_timeout_secs, 10);
    }
}
