//! TOML-based session configuration.
//!
//! Holds the tuning options fixed at session construction:
//! - round length, start countdown, and the escalating decay schedule
//! - delivery bonus and penalty magnitudes
//!
//! Configuration is stored at `~/.config/kitchenrush/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Session timer tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Length of a round, and the ceiling for bonuses.
    #[serde(default = "default_play_duration_max")]
    pub play_duration_max: f64,
    #[serde(default = "default_countdown_duration")]
    pub countdown_duration: f64,
    /// Playing time between automatic deductions.
    #[serde(default = "default_decay_interval")]
    pub decay_interval: f64,
    /// First deduction; the n-th deduction is `n * decay_base_step`.
    #[serde(default = "default_decay_base_step")]
    pub decay_base_step: f64,
}

/// Delivery outcome magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default = "default_success_bonus")]
    pub success_bonus: f64,
    #[serde(default = "default_failure_penalty")]
    pub failure_penalty: f64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/kitchenrush/config.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

// Default functions
fn default_play_duration_max() -> f64 {
    60.0
}
fn default_countdown_duration() -> f64 {
    3.0
}
fn default_decay_interval() -> f64 {
    10.0
}
fn default_decay_base_step() -> f64 {
    3.0
}
fn default_success_bonus() -> f64 {
    10.0
}
fn default_failure_penalty() -> f64 {
    12.0
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            play_duration_max: default_play_duration_max(),
            countdown_duration: default_countdown_duration(),
            decay_interval: default_decay_interval(),
            decay_base_step: default_decay_base_step(),
        }
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            success_bonus: default_success_bonus(),
            failure_penalty: default_failure_penalty(),
        }
    }
}

impl TimerConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for non-finite values, a
    /// non-positive round length or decay interval, or a negative countdown
    /// or decay step.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("timer.play_duration_max", self.play_duration_max)?;
        require_non_negative("timer.countdown_duration", self.countdown_duration)?;
        require_positive("timer.decay_interval", self.decay_interval)?;
        require_non_negative("timer.decay_base_step", self.decay_base_step)
    }
}

impl DeliveryConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for negative or non-finite magnitudes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_negative("delivery.success_bonus", self.success_bonus)?;
        require_non_negative("delivery.failure_penalty", self.failure_penalty)
    }
}

fn require_non_negative(key: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidValue {
            key: key.into(),
            message: format!("must be a finite number >= 0, got {value}"),
        });
    }
    Ok(())
}

fn require_positive(key: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::InvalidValue {
            key: key.into(),
            message: format!("must be a finite number > 0, got {value}"),
        });
    }
    Ok(())
}

/// Returns `~/.config/kitchenrush[-dev]/` based on KITCHENRUSH_ENV.
///
/// Set KITCHENRUSH_ENV=dev to use the development directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("KITCHENRUSH_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("kitchenrush-dev")
    } else {
        base_dir.join("kitchenrush")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(root: &mut serde_json::Value, key: &str, value: &str) -> Result<()> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown().into());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Number(_) => value
                        .parse::<f64>()
                        .ok()
                        .and_then(serde_json::Number::from_f64)
                        .map(serde_json::Value::Number)
                        .ok_or_else(|| {
                            ConfigError::ParseFailed(format!("cannot parse '{value}' as number"))
                        })?,
                    serde_json::Value::Object(_) => return Err(unknown().into()),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown().into())
    }

    /// Default config file location.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// fails validation, or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            return Ok(cfg);
        }
        Self::load_from(&path)
    }

    /// Load from an explicit file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: Config = toml::from_str(&content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timer.validate()?;
        self.delivery.validate()
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. Does not persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed, or
    /// the resulting configuration is invalid. `self` is left untouched on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}
