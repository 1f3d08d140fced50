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

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    #[default]
    BasicEda,
    AdvancedStats,
    DataQuality,
}

impl AnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::BasicEda => "basic_eda",
            AnalysisType::AdvancedStats => "advanced_stats",
            AnalysisType::DataQuality => "data_quality",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisState {
    Pending,
    // Older backend builds report "running" for the same phase.
    #[serde(alias = "running")]
    Processing,
    Completed,
    Failed,
}

impl AnalysisState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisState::Pending => "pending",
            AnalysisState::Processing => "processing",
            AnalysisState::Completed => "completed",
            AnalysisState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AnalysisState::Completed | AnalysisState::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresignedUploadResponse {
    pub upload_url: String,
    pub file_key: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub max_file_size_mb: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisStartRequest {
    pub file_key: String,
    pub analysis_type: AnalysisType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisStartResponse {
    pub analysis_id: String,
    pub status: AnalysisState,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisStatusReport {
    pub analysis_id: String,
    pub status: AnalysisState,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis_id: String,
    pub status: AnalysisState,
    #[serde(default)]
    pub file_key: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    pub results: AnalysisResults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResults {
    #[serde(default)]
    pub analysis_type: Option<String>,
    pub dataset_info: DatasetInfo,
    #[serde(default)]
    pub column_stats: Vec<ColumnStat>,
    #[serde(default)]
    pub correlations: Option<CorrelationData>,
    #[serde(default)]
    pub data_quality: Option<DataQuality>,
    #[serde(default)]
    pub summary: Option<EdaSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub filename: String,
    pub rows: u64,
    pub columns: u64,
    #[serde(default)]
    pub memory_usage: Option<u64>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub column_names: Vec<String>,
    #[serde(default)]
    pub data_types: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopValueEntry {
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutlierMethodReport {
    pub count: u64,
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub bounds: Option<OutlierBounds>,
    #[serde(default)]
    pub values: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlierBounds {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutlierReport {
    #[serde(default)]
    pub iqr_method: Option<OutlierMethodReport>,
    #[serde(default)]
    pub zscore_method: Option<OutlierMethodReport>,
}

/// Per-column statistics as computed by the backend.
///
/// Central-tendency and dispersion fields are all optional: availability
/// depends on the declared dtype and on whether the backend managed to
/// compute them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnStat {
    pub name: String,
    pub dtype: String,
    pub count: u64,
    #[serde(default)]
    pub non_null_count: Option<u64>,
    pub null_count: u64,
    pub null_percentage: f64,
    pub unique_count: u64,
    #[serde(default)]
    pub mean: Option<f64>,
    #[serde(default)]
    pub median: Option<f64>,
    #[serde(default)]
    pub std: Option<f64>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub q25: Option<f64>,
    #[serde(default)]
    pub q75: Option<f64>,
    #[serde(default)]
    pub variance: Option<f64>,
    #[serde(default)]
    pub iqr: Option<f64>,
    #[serde(default)]
    pub skewness: Option<f64>,
    #[serde(default)]
    pub kurtosis: Option<f64>,
    #[serde(default)]
    pub distribution_type: Option<String>,
    #[serde(default)]
    pub most_frequent: Option<String>,
    #[serde(default)]
    pub most_frequent_count: Option<u64>,
    #[serde(default)]
    pub top_values: Option<HashMap<String, TopValueEntry>>,
    #[serde(default)]
    pub outliers: Option<OutlierReport>,
    #[serde(default)]
    pub percentiles: Option<HashMap<String, f64>>,
    #[serde(default)]
    pub potential_datetime: Option<bool>,
    #[serde(default)]
    pub potential_numeric: Option<bool>,
}

impl ColumnStat {
    pub fn is_numeric(&self) -> bool {
        let dtype = self.dtype.to_ascii_lowercase();
        dtype.starts_with("float") || dtype.starts_with("int") || dtype == "number"
    }

    pub fn is_categorical(&self) -> bool {
        let dtype = self.dtype.to_ascii_lowercase();
        dtype == "object" || dtype == "category" || dtype == "string" || dtype == "bool"
    }

    /// Non-degenerate spread: the column actually varies.
    pub fn has_spread(&self) -> bool {
        self.std.is_some_and(|s| s > 0.0)
    }

    pub fn effective_count(&self) -> u64 {
        self.non_null_count
            .unwrap_or_else(|| self.count.saturating_sub(self.null_count))
    }

    /// Checks `null_percentage == null_count / count * 100` within tolerance.
    pub fn null_percentage_consistent(&self, tolerance: f64) -> bool {
        if self.count == 0 {
            return true;
        }
        let expected = self.null_count as f64 / self.count as f64 * 100.0;
        (self.null_percentage - expected).abs() <= tolerance
    }

    /// Checks the quartile ordering invariant when all three are present.
    pub fn quartiles_ordered(&self) -> bool {
        match (self.q25, self.median, self.q75) {
            (Some(q25), Some(median), Some(q75)) => q25 <= median && median <= q75,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl CorrelationStrength {
    /// Bucket a coefficient magnitude the way the backend labels pairs.
    pub fn from_coefficient(r: f64) -> Self {
        let magnitude = r.abs();
        if magnitude > 0.9 {
            CorrelationStrength::VeryStrong
        } else if magnitude > 0.7 {
            CorrelationStrength::Strong
        } else if magnitude > 0.4 {
            CorrelationStrength::Moderate
        } else {
            CorrelationStrength::Weak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CorrelationStrength::Weak => "weak",
            CorrelationStrength::Moderate => "moderate",
            CorrelationStrength::Strong => "strong",
            CorrelationStrength::VeryStrong => "very_strong",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Positive,
    Negative,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrongCorrelation {
    pub variable1: String,
    pub variable2: String,
    pub correlation: f64,
    pub strength: CorrelationStrength,
    pub direction: Direction,
}

pub type CorrelationMatrix = HashMap<String, HashMap<String, f64>>;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CorrelationMatrices {
    #[serde(default)]
    pub pearson: Option<CorrelationMatrix>,
    #[serde(default)]
    pub spearman: Option<CorrelationMatrix>,
    #[serde(default)]
    pub kendall: Option<CorrelationMatrix>,
    #[serde(default)]
    pub summary: Option<CorrelationSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationSummary {
    pub total_pairs: u64,
    pub strong_correlations_count: u64,
    pub max_correlation: f64,
}

impl CorrelationMatrices {
    /// The preferred matrix: linear if present, rank-based otherwise.
    pub fn preferred(&self) -> Option<&CorrelationMatrix> {
        self.pearson.as_ref().or(self.spearman.as_ref())
    }

    /// Coefficient for an unordered column pair within the preferred method.
    pub fn coefficient(&self, a: &str, b: &str) -> Option<f64> {
        let matrix = self.preferred()?;
        matrix
            .get(a)
            .and_then(|row| row.get(b))
            .or_else(|| matrix.get(b).and_then(|row| row.get(a)))
            .copied()
    }

    /// Column set of the preferred matrix, sorted for deterministic output.
    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .preferred()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CorrelationData {
    #[serde(default)]
    pub correlations: CorrelationMatrices,
    #[serde(default)]
    pub strong_correlations: Vec<StrongCorrelation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataQuality {
    #[serde(default)]
    pub completeness: Option<CompletenessReport>,
    #[serde(default)]
    pub duplicates: Option<DuplicateReport>,
    #[serde(default)]
    pub consistency: Option<ConsistencyReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletenessReport {
    pub overall_score: f64,
    #[serde(default)]
    pub by_column: HashMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateReport {
    pub total_rows: u64,
    pub duplicate_rows: u64,
    pub duplicate_percentage: f64,
    pub unique_rows: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConsistencyReport {
    #[serde(default)]
    pub high_cardinality_columns: Vec<String>,
    #[serde(default)]
    pub low_variance_columns: Vec<String>,
    #[serde(default)]
    pub potential_datetime_columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EdaSummary {
    #[serde(default)]
    pub completeness_score: Option<f64>,
    #[serde(default)]
    pub numeric_columns: Option<u64>,
    #[serde(default)]
    pub categorical_columns: Option<u64>,
    #[serde(default)]
    pub datetime_columns: Option<u64>,
    #[serde(default)]
    pub dataset_health_score: Option<f64>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub key_findings: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
}
