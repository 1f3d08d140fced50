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

use crate::chart_type::ChartType;
use eda_contracts::types::{ColumnStat, CorrelationData, CorrelationStrength};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Category count window for bar charts. Below two categories there is
/// nothing to compare; above twenty the axis becomes unreadable.
const BAR_MIN_CATEGORIES: u64 = 2;
const BAR_MAX_CATEGORIES: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityBucket {
    Excellent,
    Good,
    Fair,
}

impl QualityBucket {
    pub fn from_null_percentage(null_percentage: f64) -> Self {
        if null_percentage < 5.0 {
            QualityBucket::Excellent
        } else if null_percentage < 15.0 {
            QualityBucket::Good
        } else {
            QualityBucket::Fair
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityBucket::Excellent => "excellent",
            QualityBucket::Good => "good",
            QualityBucket::Fair => "fair",
        }
    }
}

/// One recommendation, with enough metadata for the calling agent to
/// explain it in natural language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedColumn {
    pub name: String,
    /// Second column of a scatter pair.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pair: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityBucket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<CorrelationStrength>,
    pub rationale: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSelection {
    pub chart_type: ChartType,
    pub recommended: Vec<RankedColumn>,
    /// Explanatory reason code when nothing qualifies. Absence of
    /// qualifying data is not an error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ColumnSelection {
    fn empty(chart_type: ChartType, reason: &str) -> Self {
        Self {
            chart_type,
            recommended: Vec::new(),
            reason: Some(reason.to_string()),
        }
    }

    fn ranked(chart_type: ChartType, recommended: Vec<RankedColumn>, reason: &str) -> Self {
        if recommended.is_empty() {
            Self::empty(chart_type, reason)
        } else {
            Self {
                chart_type,
                recommended,
                reason: None,
            }
        }
    }
}

/// Filters and ranks candidate columns for a chart type. Empty input or no
/// qualifying columns yields an empty list plus a reason code, never an
/// error.
pub fn select_columns(
    columns: &[ColumnStat],
    chart_type: ChartType,
    correlations: Option<&CorrelationData>,
) -> ColumnSelection {
    debug!(
        chart_type = %chart_type,
        column_count = columns.len(),
        has_correlations = correlations.is_some(),
        "Selecting candidate columns"
    );
    match chart_type {
        ChartType::Bar => select_bar(columns),
        ChartType::Histogram | ChartType::Distribution | ChartType::Density
        | ChartType::Boxplot => select_numeric_spread(columns, chart_type),
        ChartType::Scatter | ChartType::CorrelationHeatmap => {
            select_pairs(columns, chart_type, correlations)
        }
        ChartType::MissingValues => select_missing(columns),
        ChartType::Outliers => select_outlier_columns(columns),
        ChartType::Line => select_line(columns),
    }
}

fn select_bar(columns: &[ColumnStat]) -> ColumnSelection {
    let mut candidates: Vec<&ColumnStat> = columns
        .iter()
        .filter(|c| {
            c.is_categorical()
                && (BAR_MIN_CATEGORIES..=BAR_MAX_CATEGORIES).contains(&c.unique_count)
                && c.top_values.as_ref().is_some_and(|tv| !tv.is_empty())
        })
        .collect();
    candidates.sort_by(|a, b| {
        a.null_percentage
            .partial_cmp(&b.null_percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let recommended = candidates
        .into_iter()
        .map(|c| {
            let quality = QualityBucket::from_null_percentage(c.null_percentage);
            RankedColumn {
                name: c.name.clone(),
                pair: None,
                dtype: Some(c.dtype.clone()),
                quality: Some(quality),
                correlation: None,
                strength: None,
                rationale: format!(
                    "{} categories, {:.1}% missing ({} quality)",
                    c.unique_count,
                    c.null_percentage,
                    quality.as_str()
                ),
            }
        })
        .collect();

    ColumnSelection::ranked(
        ChartType::Bar,
        recommended,
        "no categorical columns with 2-20 categories",
    )
}

fn select_numeric_spread(columns: &[ColumnStat], chart_type: ChartType) -> ColumnSelection {
    let recommended = columns
        .iter()
        .filter(|c| c.is_numeric() && c.has_spread())
        .map(|c| RankedColumn {
            name: c.name.clone(),
            pair: None,
            dtype: Some(c.dtype.clone()),
            quality: Some(QualityBucket::from_null_percentage(c.null_percentage)),
            correlation: None,
            strength: None,
            rationale: summarise_numeric(c),
        })
        .collect();

    ColumnSelection::ranked(
        chart_type,
        recommended,
        "no numeric columns with non-zero spread",
    )
}

fn summarise_numeric(c: &ColumnStat) -> String {
    match (c.mean, c.std) {
        (Some(mean), Some(std)) => format!("numeric, mean {mean:.2}, std {std:.2}"),
        (Some(mean), None) => format!("numeric, mean {mean:.2}"),
        _ => "numeric with non-zero spread".to_string(),
    }
}

/// Unordered numeric pairs, ranked by |r| descending when a correlation
/// matrix is available. Degrades to the matrix column set when per-column
/// statistics are entirely absent.
fn select_pairs(
    columns: &[ColumnStat],
    chart_type: ChartType,
    correlations: Option<&CorrelationData>,
) -> ColumnSelection {
    let numeric: Vec<&ColumnStat> = columns.iter().filter(|c| c.is_numeric()).collect();

    let mut recommended: Vec<RankedColumn> = if numeric.len() >= 2 {
        numeric
            .iter()
            .tuple_combinations()
            .map(|(a, b)| pair_entry(&a.name, &b.name, Some(a.dtype.clone()), correlations))
            .collect()
    } else if let Some(corr) = correlations {
        // No usable statistics: fall back to the matrix's own column set,
        // with fewer fields populated.
        let names = corr.correlations.column_names();
        names
            .iter()
            .tuple_combinations()
            .map(|(a, b)| pair_entry(a, b, None, correlations))
            .collect()
    } else {
        Vec::new()
    };

    recommended.sort_by(|a, b| {
        let ra = a.correlation.map_or(0.0, f64::abs);
        let rb = b.correlation.map_or(0.0, f64::abs);
        rb.partial_cmp(&ra).unwrap_or(std::cmp::Ordering::Equal)
    });

    ColumnSelection::ranked(
        chart_type,
        recommended,
        "fewer than two numeric columns and no correlation matrix",
    )
}

fn pair_entry(
    a: &str,
    b: &str,
    dtype: Option<String>,
    correlations: Option<&CorrelationData>,
) -> RankedColumn {
    let r = correlations.and_then(|c| c.correlations.coefficient(a, b));
    let strength = r.map(CorrelationStrength::from_coefficient);
    let rationale = match r {
        Some(r) => format!(
            "correlation {:.2} ({})",
            r,
            strength.map_or("unknown", |s| s.as_str())
        ),
        None => "numeric pair, correlation unknown".to_string(),
    };
    RankedColumn {
        name: a.to_string(),
        pair: Some(b.to_string()),
        dtype,
        quality: None,
        correlation: r,
        strength,
        rationale,
    }
}

fn select_missing(columns: &[ColumnStat]) -> ColumnSelection {
    let mut with_nulls: Vec<&ColumnStat> =
        columns.iter().filter(|c| c.null_percentage > 0.0).collect();
    with_nulls.sort_by(|a, b| {
        b.null_percentage
            .partial_cmp(&a.null_percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let recommended = with_nulls
        .into_iter()
        .map(|c| RankedColumn {
            name: c.name.clone(),
            pair: None,
            dtype: Some(c.dtype.clone()),
            quality: Some(QualityBucket::from_null_percentage(c.null_percentage)),
            correlation: None,
            strength: None,
            rationale: format!("{:.1}% missing", c.null_percentage),
        })
        .collect();
    ColumnSelection::ranked(
        ChartType::MissingValues,
        recommended,
        "no columns with missing values",
    )
}

fn select_outlier_columns(columns: &[ColumnStat]) -> ColumnSelection {
    let recommended = columns
        .iter()
        .filter_map(|c| {
            let iqr = c.outliers.as_ref()?.iqr_method.as_ref()?;
            if iqr.count == 0 {
                return None;
            }
            Some(RankedColumn {
                name: c.name.clone(),
                pair: None,
                dtype: Some(c.dtype.clone()),
                quality: None,
                correlation: None,
                strength: None,
                rationale: format!("{} outliers by the IQR method", iqr.count),
            })
        })
        .collect();
    ColumnSelection::ranked(
        ChartType::Outliers,
        recommended,
        "no columns with IQR-method outliers",
    )
}

fn select_line(columns: &[ColumnStat]) -> ColumnSelection {
    let recommended = columns
        .iter()
        .filter(|c| c.is_numeric() && c.mean.is_some())
        .map(|c| RankedColumn {
            name: c.name.clone(),
            pair: None,
            dtype: Some(c.dtype.clone()),
            quality: Some(QualityBucket::from_null_percentage(c.null_percentage)),
            correlation: None,
            strength: None,
            rationale: summarise_numeric(c),
        })
        .collect();
    ColumnSelection::ranked(ChartType::Line, recommended, "no numeric columns with a mean")
}
