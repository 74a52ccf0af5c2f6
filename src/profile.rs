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

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::PluginConfig;
use crate::hwmon;
use crate::logger;
use crate::runner::CommandRunner;

pub const INVALID_PROFILE_MSG: &str = "Invalid profile. Use balanced/aggressive.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Balanced,
    Aggressive,
}

impl Profile {
    pub const ALL: [Profile; 2] = [Profile::Balanced, Profile::Aggressive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Balanced => "balanced",
            Profile::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trim and lower-case a requested profile name; `None` becomes empty.
pub fn normalize(input: Option<&str>) -> String {
    input.unwrap_or("").trim().to_lowercase()
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(Some(s)).as_str() {
            "balanced" => Ok(Profile::Balanced),
            "aggressive" => Ok(Profile::Aggressive),
            _ => Err(INVALID_PROFILE_MSG.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProfileResult {
    pub fn success() -> Self {
        Self { ok: true, error: None }
    }

    pub fn failure(msg: impl Into<String>) -> Self {
        Self { ok: false, error: Some(msg.into()) }
    }
}

/// Trimmed content of the profile file, or `None` when it is missing,
/// unreadable or empty.
pub fn read_active_profile(path: &Path) -> Option<String> {
    match hwmon::read_trimmed(path) {
        Ok(s) if !s.is_empty() => Some(s),
        Ok(_) => None,
        Err(e) => {
            logger::debug("profile_read_failed", json!({ "path": path.display().to_string(), "error": e.to_string() }));
            None
        }
    }
}

pub fn write_profile(path: &Path, profile: Profile) -> io::Result<()> {
    fs::write(path, format!("{}\n", profile))
}

/// Validate, persist and apply a profile.
///
/// The selection stays on disk even when both apply paths fail, so
/// `ok: false` after a successful write means "stored, maybe not active".
pub fn set_profile(config: &PluginConfig, runner: &dyn CommandRunner, name: Option<&str>) -> ProfileResult {
    let profile = match normalize(name).parse::<Profile>() {
        Ok(p) => p,
        Err(msg) => {
            logger::info("profile_rejected", json!({ "requested": name }));
            return ProfileResult::failure(msg);
        }
    };

    if let Err(e) = write_profile(&config.profile_path, profile) {
        logger::warn(
            "profile_write_failed",
            json!({ "path": config.profile_path.display().to_string(), "error": e.to_string() }),
        );
        return ProfileResult::failure(format!("Cannot write {}: {}", config.profile_path.display(), e));
    }
    logger::info("profile_persisted", json!({ "profile": profile.as_str() }));

    let timeout = config.command_timeout();
    let restart_args = vec!["restart".to_string(), config.service_unit.clone()];
    let primary = match runner.run(&config.service_manager, &restart_args, timeout) {
        Ok(()) => {
            logger::info("profile_applied", json!({ "profile": profile.as_str(), "via": "service" }));
            return ProfileResult::success();
        }
        Err(e) => e,
    };
    logger::warn("service_restart_failed", json!({ "error": primary.to_string() }));

    let helper = config.fallback_helper.to_string_lossy();
    match runner.run(&helper, &[profile.as_str().to_string()], timeout) {
        Ok(()) => {
            logger::info("profile_applied", json!({ "profile": profile.as_str(), "via": "fallback" }));
            ProfileResult::success()
        }
        Err(fallback) => {
            logger::warn("fallback_apply_failed", json!({ "error": fallback.to_string() }));
            ProfileResult::failure(format!("Apply failed: {}; fallback failed: {}", primary, fallback))
        }
    }
}
