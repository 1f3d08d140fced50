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

//! Typed contract for the external EDA analysis backend.
//!
//! Everything in this crate is consumed, never computed: statistics,
//! correlation matrices and quality summaries are owned by the backend and
//! treated as immutable snapshots once fetched.

pub mod config;
pub mod error;
pub mod types;

pub use config::EdaConfig;
pub use error::{EdaError, EdaResult, RequestStep};
pub use types::{
    AnalysisResult, AnalysisResults, AnalysisStartRequest, AnalysisStartResponse, AnalysisState,
    AnalysisStatusReport, AnalysisType, ColumnStat, CorrelationData, CorrelationMatrices,
    CorrelationStrength, DataQuality, DatasetInfo, Direction, EdaSummary, OutlierMethodReport,
    OutlierReport, PresignedUploadResponse, StrongCorrelation, TopValueEntry,
};
