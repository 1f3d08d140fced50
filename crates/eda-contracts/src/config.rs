// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use std::time::Duration;
use tracing::warn;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_MAX_UPLOAD_MB: u64 = 160;
const DEFAULT_BIN_COUNT: usize = 20;
const MAX_BIN_COUNT: usize = 100;

#[derive(Debug, Clone)]
pub struct EdaConfig {
    /// Backend base URL, without trailing slash.
    pub base_url: String,
    /// Upload size ceiling in bytes. Deployment variants run 160-200 MB.
    pub max_upload_bytes: u64,
    /// Default histogram bin count when the caller does not specify one.
    pub default_bin_count: usize,
    /// Hard cap on caller-supplied bin counts.
    pub max_bin_count: usize,
    /// Number of synthetic points per scatter series.
    pub scatter_point_count: usize,
    /// Sampling range used when only a correlation matrix is available and
    /// per-column min/max are unknown. A policy parameter, not a constant.
    pub fallback_sample_range: (f64, f64),
    pub status_timeout: Duration,
    pub results_timeout: Duration,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for EdaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            default_bin_count: DEFAULT_BIN_COUNT,
            max_bin_count: MAX_BIN_COUNT,
            scatter_point_count: 50,
            fallback_sample_range: (0.0, 100.0),
            status_timeout: Duration::from_secs(30),
            results_timeout: Duration::from_secs(60),
            retry_attempts: 3,
            retry_delay: Duration::from_secs(2),
        }
    }
}

impl EdaConfig {
    /// Reads overrides from the environment. `dotenvy::dotenv()` is expected
    /// to have been applied by the binary already.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("EDA_BACKEND_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(mb) = read_env_number::<u64>("EDA_MAX_UPLOAD_MB") {
            config.max_upload_bytes = mb * 1024 * 1024;
        }
        if let Some(bins) = read_env_number::<usize>("EDA_DEFAULT_BINS") {
            config.default_bin_count = bins.clamp(1, config.max_bin_count);
        }
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn max_upload_mb(&self) -> u64 {
        self.max_upload_bytes / (1024 * 1024)
    }
}

fn read_env_number<T: std::str::FromStr>(key: &str) -> Option<T> {
    match std::env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(key, raw = %raw, "Ignoring unparseable environment override");
                None
            }
        },
        Err(_) => None,
    }
}
