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

use std::time::{Duration, Instant};

use crate::history::History;
use crate::plugin::Plugin;
use crate::profile::Profile;
use crate::status::{StatusResponse, StatusSnapshot};

/// State behind the `watch` dashboard.
pub struct App {
    pub plugin: Plugin,
    pub last_refresh: Instant,
    pub refresh_interval: Duration,
    pub snapshot: Option<StatusSnapshot>,
    /// Shown instead of readings when the last refresh failed.
    pub status_error: Option<String>,
    pub selected: Profile,
    // (is_error, message) from the last apply
    pub feedback: Option<(bool, String)>,
    pub cpu_temps: History,
    pub gpu_temps: History,
    pub cpu_rpms: History,
    pub gpu_rpms: History,
}

impl App {
    pub fn new(plugin: Plugin) -> Self {
        let refresh_interval = Duration::from_millis(1000);
        Self {
            plugin,
            last_refresh: Instant::now().checked_sub(refresh_interval).unwrap_or_else(Instant::now),
            refresh_interval,
            snapshot: None,
            status_error: Some("Not ready".to_string()),
            selected: Profile::Aggressive,
            feedback: None,
            cpu_temps: History::default(),
            gpu_temps: History::default(),
            cpu_rpms: History::default(),
            gpu_rpms: History::default(),
        }
    }

    pub fn refresh(&mut self) {
        self.last_refresh = Instant::now();
        match self.plugin.get_status() {
            Ok(StatusResponse::Ready(snap)) => {
                if let Ok(p) = snap.profile.parse::<Profile>() {
                    self.selected = p;
                }
                if let Some(t) = snap.cpu_temp_c { self.cpu_temps.push(t); }
                if let Some(t) = snap.gpu_temp_c { self.gpu_temps.push(t); }
                if let Some(r) = snap.cpu_rpm { self.cpu_rpms.push(r as f64); }
                if let Some(r) = snap.gpu_rpm { self.gpu_rpms.push(r as f64); }
                self.snapshot = Some(snap);
                self.status_error = None;
            }
            Ok(StatusResponse::Missing(m)) => {
                self.snapshot = None;
                self.status_error = Some(m.error);
            }
            Err(e) => {
                self.snapshot = None;
                self.status_error = Some(e.to_string());
            }
        }
    }

    pub fn select(&mut self, profile: Profile) {
        self.selected = profile;
    }

    pub fn apply_selected(&mut self) {
        let res = self.plugin.set_profile(Some(self.selected.as_str()));
        self.feedback = Some(if res.ok {
            (false, format!("Fan profile applied: {}", self.selected.as_str().to_uppercase()))
        } else {
            (true, res.error.unwrap_or_else(|| "Unknown error".into()))
        });
        self.refresh();
    }

    pub fn refresh_due(&self) -> bool {
        self.last_refresh.elapsed() >= self.refresh_interval
    }
}
