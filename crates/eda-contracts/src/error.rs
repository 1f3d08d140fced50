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

use thiserror::Error;

/// Which request in a multi-step flow failed. Attached to network errors so
/// a caller can distinguish "couldn't get a slot" from "transfer failed"
/// from "couldn't start analysis".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStep {
    Presign,
    Transfer,
    Register,
    Status,
    Results,
}

impl RequestStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStep::Presign => "presigned upload slot request",
            RequestStep::Transfer => "object store transfer",
            RequestStep::Register => "analysis registration",
            RequestStep::Status => "status poll",
            RequestStep::Results => "result fetch",
        }
    }
}

impl std::fmt::Display for RequestStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum EdaError {
    #[error("Validation failed: {reason}")]
    Validation { reason: String },

    #[error("Missing required parameter '{parameter}' for chart type '{chart_type}'")]
    MissingParameter {
        parameter: String,
        chart_type: String,
    },

    #[error("Column '{column}' not found in the analysis results")]
    ColumnNotFound { column: String },

    #[error("Analysis '{analysis_id}' not found")]
    AnalysisNotFound { analysis_id: String },

    #[error("Chart type '{chart_type}' is not supported for column '{column}' of type '{dtype}'")]
    UnsupportedOperation {
        chart_type: String,
        column: String,
        dtype: String,
    },

    #[error("Network failure during {step}: {detail}")]
    Network { step: RequestStep, detail: String },

    #[error("Backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("{operation} timed out after {attempts} attempts")]
    Timeout { operation: String, attempts: u32 },

    #[error("Failed to parse backend payload: {0}")]
    Serialisation(#[from] serde_json::Error),
}

pub type EdaResult<T> = std::result::Result<T, EdaError>;

impl EdaError {
    /// Whether the retry policy may attempt the operation again.
    /// Validation and not-found errors are never retried; a definitive
    /// backend response, even a 5xx, is surfaced immediately.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EdaError::Network { .. } | EdaError::Timeout { .. }
        )
    }

    pub fn category(&self) -> &'static str {
        match self {
            EdaError::Validation { .. } | EdaError::MissingParameter { .. } => "validation",
            EdaError::ColumnNotFound { .. } | EdaError::AnalysisNotFound { .. } => "not_found",
            EdaError::UnsupportedOperation { .. } => "unsupported",
            EdaError::Network { .. } => "network",
            EdaError::Backend { .. } => "backend",
            EdaError::Timeout { .. } => "timeout",
            EdaError::Serialisation(_) => "serialisation",
        }
    }

    /// Human-readable explanation suitable for relaying to the user.
    pub fn user_message(&self) -> String {
        match self {
            EdaError::Timeout { operation, .. } => format!(
                "The {operation} did not complete in time. The backend may be \
                 busy processing a large file."
            ),
            EdaError::AnalysisNotFound { analysis_id } => format!(
                "No analysis with id '{analysis_id}' exists. It may have expired \
                 or never been started."
            ),
            _ => self.to_string(),
        }
    }

    /// A suggested next step, where one exists.
    pub fn remedy(&self) -> Option<&'static str> {
        match self {
            EdaError::MissingParameter { .. } | EdaError::ColumnNotFound { .. } => {
                Some("Call suggest_chart_columns first to find suitable columns.")
            }
            EdaError::UnsupportedOperation { .. } => {
                Some("Pick a numeric column, or choose a chart type that fits this column.")
            }
            EdaError::AnalysisNotFound { .. } => {
                Some("Start a new analysis with start_analysis_from_upload.")
            }
            EdaError::Timeout { .. } => {
                Some("Check the analysis status again in a few seconds.")
            }
            EdaError::Validation { .. } => {
                Some("Upload a .csv file within the configured size limit.")
            }
            _ => None,
        }
    }
}
