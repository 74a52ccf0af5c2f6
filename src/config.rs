/*
 * This file is part of Allyfan.
 *
 * Copyright (C) 2025 Allyfan contributors
 *
 * Allyfan is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Allyfan is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Allyfan. If not, see <https://www.gnu.org/licenses/>.
 */

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logger::Level;

pub const CONFIG_ENV_VAR: &str = "ALLYFAN_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed to parse config {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("Invalid config: {0}")]
    Invalid(String),
}

fn default_hwmon_root() -> PathBuf { PathBuf::from("/sys/class/hwmon") }
fn default_profile_path() -> PathBuf { PathBuf::from("/etc/ally-fan-profile.conf") }
fn default_service_manager() -> String { "systemctl".to_string() }
fn default_service_unit() -> String { "ally-fan-curve.service".to_string() }
fn default_fallback_helper() -> PathBuf { PathBuf::from("/usr/local/bin/ally-fan-profile") }
fn default_command_timeout_ms() -> u64 { 30_000 }
fn default_log_path() -> PathBuf { PathBuf::from("/var/log/allyfan/logs.json") }
fn default_log_level() -> Level { Level::Info }

/// Every location and external name the backend touches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginConfig {
    /// Directory holding the `hwmon*` device entries.
    #[serde(default = "default_hwmon_root")]
    pub hwmon_root: PathBuf,
    /// One-line file holding the active profile name.
    #[serde(default = "default_profile_path")]
    pub profile_path: PathBuf,
    #[serde(default = "default_service_manager")]
    pub service_manager: String,
    /// Unit restarted to apply a new profile.
    #[serde(default = "default_service_unit")]
    pub service_unit: String,
    /// Invoked with the profile name when the service restart fails.
    #[serde(default = "default_fallback_helper")]
    pub fallback_helper: PathBuf,
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: Level,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            hwmon_root: default_hwmon_root(),
            profile_path: default_profile_path(),
            service_manager: default_service_manager(),
            service_unit: default_service_unit(),
            fallback_helper: default_fallback_helper(),
            command_timeout_ms: default_command_timeout_ms(),
            log_path: default_log_path(),
            log_level: default_log_level(),
        }
    }
}

impl PluginConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

pub fn system_config_path() -> PathBuf { PathBuf::from("/etc/allyfan/config.json") }

pub fn load_config_from(path: &Path) -> Result<PluginConfig, ConfigError> {
    let data = fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    let cfg: PluginConfig = serde_json::from_str(&data)
        .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
    validate_config(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}

/// Resolve the config: explicit path, then `$ALLYFAN_CONFIG`, then the
/// system file if it exists, else built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<PluginConfig, ConfigError> {
    if let Some(p) = explicit {
        return load_config_from(p);
    }
    if let Ok(p) = env::var(CONFIG_ENV_VAR) {
        if !p.is_empty() {
            return load_config_from(Path::new(&p));
        }
    }
    let system = system_config_path();
    if system.exists() {
        return load_config_from(&system);
    }
    Ok(PluginConfig::default())
}

pub fn validate_config(cfg: &PluginConfig) -> Result<(), String> {
    if !cfg.hwmon_root.is_absolute() {
        return Err(format!("hwmon_root must be absolute: {}", cfg.hwmon_root.display()));
    }
    if !cfg.profile_path.is_absolute() {
        return Err(format!("profile_path must be absolute: {}", cfg.profile_path.display()));
    }
    if cfg.service_manager.trim().is_empty() {
        return Err("service_manager cannot be empty".into());
    }
    if cfg.service_unit.trim().is_empty() {
        return Err("service_unit cannot be empty".into());
    }
    if cfg.fallback_helper.as_os_str().is_empty() {
        return Err("fallback_helper cannot be empty".into());
    }
    if cfg.command_timeout_ms == 0 {
        return Err("command_timeout_ms must be greater than 0".into());
    }
    Ok(())
}
