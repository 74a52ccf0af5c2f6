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

use std::collections::VecDeque;

pub const DEFAULT_HISTORY_LEN: usize = 120;

/// Fixed-capacity sample buffer; pushing past capacity drops the oldest.
#[derive(Debug, Clone)]
pub struct History {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_LEN)
    }
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { samples: VecDeque::with_capacity(capacity), capacity: capacity.max(1) }
    }

    pub fn push(&mut self, v: f64) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(v);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }

    /// Samples rescaled onto 0..=100 between the window's min and max, for
    /// sparkline rendering. A flat window maps to the midpoint.
    pub fn scaled(&self) -> Vec<u64> {
        let min = self.samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = max - min;
        self.samples
            .iter()
            .map(|v| {
                if span <= f64::EPSILON {
                    50
                } else {
                    (((v - min) / span) * 100.0).round() as u64
                }
            })
            .collect()
    }
}
