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

//! Chart-data synthesis registry.
//!
//! One synthesizer per chart family, dispatched through [`SynthRegistry`]
//! rather than a monolithic branch, so each family is testable and
//! extensible on its own.

mod categorical;
mod distribution;
mod scatter;
mod summary;

use crate::chart_type::ChartType;
use eda_contracts::config::EdaConfig;
use eda_contracts::error::{EdaError, EdaResult};
use eda_contracts::types::{ColumnStat, CorrelationData};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

pub use categorical::{BarSynth, LineSynth, MissingValuesSynth};
pub use distribution::{DensitySynth, HistogramSynth};
pub use scatter::ScatterSynth;
pub use summary::{BoxplotSynth, HeatmapSynth, OutlierSynth};

/// Caller-supplied knobs for one synthesis request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartParams {
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub x_column: Option<String>,
    #[serde(default)]
    pub y_column: Option<String>,
    #[serde(default)]
    pub max_bins: Option<usize>,
}

/// Policy knobs shared by all synthesizers. Derived from [`EdaConfig`] so
/// deployment variants can tune them without touching the synthesizers.
#[derive(Debug, Clone)]
pub struct SynthPolicy {
    pub default_bin_count: usize,
    pub max_bin_count: usize,
    pub scatter_point_count: usize,
    pub fallback_sample_range: (f64, f64),
    pub density_point_count: usize,
    pub heatmap_cell_cap: usize,
    pub heatmap_min_coefficient: f64,
    pub missing_column_cap: usize,
    pub outlier_point_cap: usize,
}

impl Default for SynthPolicy {
    fn default() -> Self {
        Self::from_config(&EdaConfig::default())
    }
}

impl SynthPolicy {
    pub fn from_config(config: &EdaConfig) -> Self {
        Self {
            default_bin_count: config.default_bin_count,
            max_bin_count: config.max_bin_count,
            scatter_point_count: config.scatter_point_count,
            fallback_sample_range: config.fallback_sample_range,
            density_point_count: 50,
            heatmap_cell_cap: 15,
            heatmap_min_coefficient: 0.1,
            missing_column_cap: 10,
            outlier_point_cap: 50,
        }
    }

    pub(crate) fn bin_count(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_bin_count)
            .clamp(1, self.max_bin_count)
    }
}

/// A single plot-ready point. Within one synthesised series all points
/// share the same variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartPoint {
    /// Category-like value with a magnitude: bar, histogram, distribution,
    /// density, missing-values, line.
    Frequency { value: String, count: f64 },
    /// Scatter point.
    Xy {
        x: f64,
        y: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        group: Option<String>,
    },
    /// Correlation heatmap cell.
    Cell { x: String, y: String, value: f64 },
    /// Boxplot-style point, also used for outlier listings.
    Box {
        category: String,
        value: f64,
        outlier: bool,
    },
}

/// A finite, render-ready series with descriptive labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSeries {
    pub chart_type: ChartType,
    pub points: Vec<ChartPoint>,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// True when the series was synthesised from summary statistics rather
    /// than replayed from raw rows.
    pub approximate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caveat: Option<String>,
}

pub(crate) const SYNTHESIS_CAVEAT: &str =
    "Synthesised from summary statistics; shows the recorded shape, not raw rows.";

/// Everything a synthesizer may look at. Borrowed, read-only: synthesis is
/// a pure function of its inputs.
pub struct SynthContext<'a> {
    pub columns: &'a [ColumnStat],
    pub correlations: Option<&'a CorrelationData>,
    pub params: &'a ChartParams,
    pub policy: &'a SynthPolicy,
    pub chart_type: ChartType,
}

impl<'a> SynthContext<'a> {
    pub fn column(&self, name: &str) -> EdaResult<&'a ColumnStat> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| EdaError::ColumnNotFound {
                column: name.to_string(),
            })
    }

    /// The single column the chart type requires, by name.
    pub fn required_column(&self) -> EdaResult<&'a ColumnStat> {
        let name = self
            .params
            .column
            .as_deref()
            .ok_or_else(|| EdaError::MissingParameter {
                parameter: "column_name".to_string(),
                chart_type: self.chart_type.as_str().to_string(),
            })?;
        self.column(name)
    }

    pub fn require_numeric(&self, stat: &ColumnStat) -> EdaResult<()> {
        if stat.is_numeric() {
            Ok(())
        } else {
            Err(EdaError::UnsupportedOperation {
                chart_type: self.chart_type.as_str().to_string(),
                column: stat.name.clone(),
                dtype: stat.dtype.clone(),
            })
        }
    }
}

pub trait Synthesizer: Send + Sync {
    fn synthesize(&self, ctx: &SynthContext<'_>) -> EdaResult<ChartSeries>;
}

/// Chart-type tag to synthesizer mapping.
pub struct SynthRegistry {
    synthesizers: HashMap<ChartType, Box<dyn Synthesizer>>,
    policy: SynthPolicy,
}

impl SynthRegistry {
    pub fn new(policy: SynthPolicy) -> Self {
        let mut synthesizers: HashMap<ChartType, Box<dyn Synthesizer>> = HashMap::new();
        synthesizers.insert(ChartType::Bar, Box::new(BarSynth));
        synthesizers.insert(ChartType::Line, Box::new(LineSynth));
        synthesizers.insert(ChartType::Histogram, Box::new(HistogramSynth));
        synthesizers.insert(ChartType::Distribution, Box::new(HistogramSynth));
        synthesizers.insert(ChartType::Density, Box::new(DensitySynth));
        synthesizers.insert(ChartType::Boxplot, Box::new(BoxplotSynth));
        synthesizers.insert(ChartType::Scatter, Box::new(ScatterSynth));
        synthesizers.insert(ChartType::CorrelationHeatmap, Box::new(HeatmapSynth));
        synthesizers.insert(ChartType::MissingValues, Box::new(MissingValuesSynth));
        synthesizers.insert(ChartType::Outliers, Box::new(OutlierSynth));
        Self {
            synthesizers,
            policy,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(SynthPolicy::default())
    }

    pub fn policy(&self) -> &SynthPolicy {
        &self.policy
    }

    /// Derives a render-ready series for the requested chart type.
    pub fn synthesize(
        &self,
        chart_type: ChartType,
        columns: &[ColumnStat],
        correlations: Option<&CorrelationData>,
        params: &ChartParams,
    ) -> EdaResult<ChartSeries> {
        let ctx = SynthContext {
            columns,
            correlations,
            params,
            policy: &self.policy,
            chart_type,
        };
        let synth = self
            .synthesizers
            .get(&chart_type)
            .ok_or_else(|| EdaError::Validation {
                reason: format!("no synthesizer registered for '{chart_type}'"),
            })?;
        let series = synth.synthesize(&ctx)?;
        debug!(
            chart_type = %chart_type,
            points = series.points.len(),
            approximate = series.approximate,
            "Synthesised chart series"
        );
        Ok(series)
    }
}

impl Default for SynthRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Gaussian probability density, the shared kernel for distribution and
/// density synthesis.
pub(crate) fn gaussian_pdf(x: f64, mean: f64, std: f64) -> f64 {
    if std <= 0.0 {
        return 0.0;
    }
    let z = (x - mean) / std;
    (-0.5 * z * z).exp() / (std * (2.0 * std::f64::consts::PI).sqrt())
}
