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

use chrono::{DateTime, Duration, Utc};
use eda_contracts::error::{EdaError, EdaResult};
use eda_contracts::types::AnalysisState;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One analysis job known to the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisJob {
    pub id: String,
    pub filename: Option<String>,
    pub status: AnalysisState,
    pub started_at: DateTime<Utc>,
}

/// Explicit, session-scoped analysis context. Tools that omit an analysis id
/// resolve against the most recently started job in this session rather than
/// any process-wide state.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    jobs: Vec<AnalysisJob>,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: &str, filename: Option<&str>, status: AnalysisState) {
        debug!(analysis_id = id, "Recording analysis job in session");
        self.jobs.push(AnalysisJob {
            id: id.to_string(),
            filename: filename.map(str::to_string),
            status,
            started_at: Utc::now(),
        });
    }

    pub fn latest(&self) -> Option<&AnalysisJob> {
        self.jobs.last()
    }

    pub fn jobs(&self) -> &[AnalysisJob] {
        &self.jobs
    }

    /// Updates a known job's status. Unknown ids are ignored; the backend is
    /// the source of truth and may know jobs this session never started.
    pub fn update_status(&mut self, id: &str, status: AnalysisState) -> bool {
        match self.jobs.iter_mut().find(|j| j.id == id) {
            Some(job) => {
                job.status = status;
                true
            }
            None => false,
        }
    }

    /// An explicit id always wins; otherwise the latest session job. With
    /// neither, the caller has nothing to poll.
    pub fn resolve(&self, explicit: Option<&str>) -> EdaResult<String> {
        if let Some(id) = explicit {
            return Ok(id.to_string());
        }
        self.latest()
            .map(|job| job.id.clone())
            .ok_or_else(|| EdaError::Validation {
                reason: "no analysis in this session; upload a file first".to_string(),
            })
    }

    /// Drops jobs older than `max_age`, returning how many were evicted.
    pub fn evict_older_than(&mut self, max_age: Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        let before = self.jobs.len();
        self.jobs.retain(|job| job.started_at >= cutoff);
        before - self.jobs.len()
    }
}
