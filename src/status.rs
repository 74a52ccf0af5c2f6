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

//! Status snapshot assembly.
//!
//! Fan speeds and temperatures are best-effort and become `None` on any
//! failure. Enable flags and curve points are mandatory: a failure there
//! aborts the whole call with an error instead of a soft `ok: false`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::PluginConfig;
use crate::hwmon::{self, HwmonError};
use crate::logger;
use crate::profile::{read_active_profile, Profile};

pub const ASUS_HWMON: &str = "asus";
pub const CURVE_HWMON: &str = "asus_custom_fan_curve";
pub const CPU_TEMP_HWMON: &str = "k10temp";
pub const GPU_TEMP_HWMON: &str = "amdgpu";
pub const CURVE_POINTS: u8 = 8;
pub const MISSING_HWMON_MSG: &str = "Required hwmon not found (asus / asus_custom_fan_curve).";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub i: u8,
    pub temp_c: i64,
    pub pwm: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub ok: bool,
    pub profile: String,
    pub cpu_rpm: Option<i64>,
    pub gpu_rpm: Option<i64>,
    pub cpu_temp_c: Option<f64>,
    pub gpu_temp_c: Option<f64>,
    pub pwm1_enable: i64,
    pub pwm2_enable: i64,
    pub curve_cpu_pwm1: Vec<CurvePoint>,
    pub curve_gpu_pwm2: Vec<CurvePoint>,
}

/// Returned when one of the two required hwmon devices is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingSensors {
    pub ok: bool,
    pub error: String,
    pub asus: Option<PathBuf>,
    pub curve: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusResponse {
    Ready(StatusSnapshot),
    Missing(MissingSensors),
}

impl StatusResponse {
    pub fn is_ok(&self) -> bool {
        matches!(self, StatusResponse::Ready(_))
    }

    pub fn snapshot(&self) -> Option<&StatusSnapshot> {
        match self {
            StatusResponse::Ready(s) => Some(s),
            StatusResponse::Missing(_) => None,
        }
    }
}

fn optional<T>(field: &str, path: Option<&Path>, res: Result<T, HwmonError>) -> Option<T> {
    match res {
        Ok(v) => Some(v),
        Err(e) => {
            logger::debug(
                "optional_read_failed",
                json!({
                    "field": field,
                    "path": path.map(|p| p.display().to_string()),
                    "error": e.to_string(),
                }),
            );
            None
        }
    }
}

fn read_fan(asus: &Path, field: &str, idx: u8) -> Option<i64> {
    let path = asus.join(format!("fan{}_input", idx));
    optional(field, Some(&path), hwmon::read_int(&path))
}

fn read_temp(root: &Path, field: &str, hw_name: &str) -> Option<f64> {
    match hwmon::find_temp_input(root, hw_name) {
        Some(path) => optional(field, Some(&path), hwmon::read_temp_c(&path)),
        None => optional(
            field,
            None,
            Err(HwmonError::InvalidData(format!("no temperature input for {}", hw_name))),
        ),
    }
}

/// Read the eight auto points of `pwm{channel}`; any missing file fails.
pub fn read_curve(curve: &Path, channel: u8) -> Result<Vec<CurvePoint>, HwmonError> {
    (1..=CURVE_POINTS)
        .map(|i| {
            let temp_c = hwmon::read_int(curve.join(format!("pwm{}_auto_point{}_temp", channel, i)))?;
            let pwm = hwmon::read_int(curve.join(format!("pwm{}_auto_point{}_pwm", channel, i)))?;
            Ok(CurvePoint { i, temp_c, pwm })
        })
        .collect()
}

pub fn get_status(config: &PluginConfig) -> Result<StatusResponse, HwmonError> {
    let root = config.hwmon_root.as_path();
    let asus = hwmon::find_device_by_name(root, ASUS_HWMON);
    let curve = hwmon::find_device_by_name(root, CURVE_HWMON);
    let (asus, curve) = match (asus, curve) {
        (Some(a), Some(c)) => (a, c),
        (asus, curve) => {
            logger::warn(
                "hwmon_missing",
                json!({
                    "asus": asus.as_ref().map(|p| p.display().to_string()),
                    "curve": curve.as_ref().map(|p| p.display().to_string()),
                }),
            );
            return Ok(StatusResponse::Missing(MissingSensors {
                ok: false,
                error: MISSING_HWMON_MSG.to_string(),
                asus,
                curve,
            }));
        }
    };

    let cpu_rpm = read_fan(&asus, "cpu_rpm", 1);
    let gpu_rpm = read_fan(&asus, "gpu_rpm", 2);
    let cpu_temp_c = read_temp(root, "cpu_temp_c", CPU_TEMP_HWMON);
    let gpu_temp_c = read_temp(root, "gpu_temp_c", GPU_TEMP_HWMON);

    let profile = read_active_profile(&config.profile_path)
        .unwrap_or_else(|| Profile::default().as_str().to_string());

    let pwm1_enable = hwmon::read_int(curve.join("pwm1_enable"))?;
    let pwm2_enable = hwmon::read_int(curve.join("pwm2_enable"))?;

    Ok(StatusResponse::Ready(StatusSnapshot {
        ok: true,
        profile,
        cpu_rpm,
        gpu_rpm,
        cpu_temp_c,
        gpu_temp_c,
        pwm1_enable,
        pwm2_enable,
        curve_cpu_pwm1: read_curve(&curve, 1)?,
        curve_gpu_pwm2: read_curve(&curve, 2)?,
    }))
}
