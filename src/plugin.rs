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

//! Host-facing entry points.
//!
//! A plugin host calls `on_load`/`on_unload` around its own lifecycle and
//! `get_status`/`set_profile` on demand. Both operations run to completion
//! on the calling thread; hosts that must not block should call them from a
//! worker.

use serde_json::{json, Value};

use crate::config::PluginConfig;
use crate::hwmon::HwmonError;
use crate::logger;
use crate::profile::{self, ProfileResult};
use crate::runner::{CommandRunner, SystemCommandRunner};
use crate::status::{self, StatusResponse};

pub struct Plugin {
    config: PluginConfig,
    runner: Box<dyn CommandRunner>,
}

impl Plugin {
    pub fn new(config: PluginConfig) -> Self {
        Self::with_runner(config, Box::new(SystemCommandRunner::new()))
    }

    pub fn with_runner(config: PluginConfig, runner: Box<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn on_load(&self) {
        logger::info("backend_loaded", json!({ "message": "Ally Fan Control backend loaded" }));
    }

    pub fn on_unload(&self) {
        logger::info("backend_unloaded", json!({ "message": "Ally Fan Control backend unloaded" }));
    }

    /// Mandatory curve reads surface as `Err`; see [`status::get_status`].
    pub fn get_status(&self) -> Result<StatusResponse, HwmonError> {
        status::get_status(&self.config)
    }

    pub fn set_profile(&self, name: Option<&str>) -> ProfileResult {
        profile::set_profile(&self.config, self.runner.as_ref(), name)
    }

    pub fn status_json(&self) -> Result<Value, HwmonError> {
        let resp = self.get_status()?;
        serde_json::to_value(resp).map_err(|e| HwmonError::InvalidData(e.to_string()))
    }

    pub fn set_profile_json(&self, name: Option<&str>) -> Value {
        json!(self.set_profile(name))
    }
}
