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

//! Allyfan - ROG Ally fan telemetry and profile switching
//!
//! This library reads fan speeds, temperatures and the custom fan curve
//! from hwmon, and switches the active fan-curve profile through the
//! external curve service.

pub mod hwmon;
pub mod config;
pub mod logger;
pub mod runner;
pub mod status;
pub mod profile;
pub mod plugin;
pub mod history;
pub mod app;
pub mod events;
pub mod ui;

#[cfg(test)]
pub mod test_utils;
