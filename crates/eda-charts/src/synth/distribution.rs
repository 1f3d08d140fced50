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

use super::{gaussian_pdf, ChartPoint, ChartSeries, SynthContext, Synthesizer, SYNTHESIS_CAVEAT};
use eda_contracts::error::EdaResult;
use eda_contracts::types::ColumnStat;

/// Shape model selected by the backend's `distribution_type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShapeModel {
    Normal,
    Uniform,
    Skewed,
}

impl ShapeModel {
    fn for_column(stat: &ColumnStat) -> Self {
        match stat.distribution_type.as_deref() {
            Some("uniform") => ShapeModel::Uniform,
            Some("skewed") | Some("right_skewed") | Some("left_skewed") => ShapeModel::Skewed,
            _ => ShapeModel::Normal,
        }
    }

    /// Relative density weight at `x`. The skewed model widens the Gaussian
    /// on the side the skewness points to and narrows it on the other.
    fn weight(&self, x: f64, stat: &ColumnStat, mean: f64, std: f64) -> f64 {
        match self {
            ShapeModel::Uniform => 1.0,
            ShapeModel::Normal => gaussian_pdf(x, mean, std),
            ShapeModel::Skewed => {
                let skew = stat.skewness.unwrap_or(0.0);
                let stretch = 1.0 + skew.abs().min(2.0);
                let effective_std = if (x >= mean) == (skew >= 0.0) {
                    std * stretch
                } else {
                    std / stretch
                };
                gaussian_pdf(x, mean, effective_std)
            }
        }
    }
}

/// Histogram / distribution synthesis from summary statistics. Partitions
/// [min, max] into bins and fills each bin centre from the column's shape
/// model, scaled to the observation count. Not a replay of raw values.
pub struct HistogramSynth;

impl Synthesizer for HistogramSynth {
    fn synthesize(&self, ctx: &SynthContext<'_>) -> EdaResult<ChartSeries> {
        let stat = ctx.required_column()?;
        ctx.require_numeric(stat)?;

        let min = stat.min.unwrap_or(0.0);
        let max = stat.max.unwrap_or(min);
        let mean = stat.mean.unwrap_or((min + max) / 2.0);
        // Degenerate or missing spread still deserves a plot; fall back to
        // a sixth of the range as the Gaussian width.
        let std = stat
            .std
            .filter(|s| *s > 0.0)
            .unwrap_or(((max - min) / 6.0).max(f64::EPSILON));
        let total = stat.effective_count() as f64;

        let bins = ctx.policy.bin_count(ctx.params.max_bins);
        let mut points = Vec::with_capacity(bins);

        if max <= min {
            // Constant column: everything lands in one bin.
            points.push(ChartPoint::Frequency {
                value: format_bin(min),
                count: total.max(1.0),
            });
        } else {
            let model = ShapeModel::for_column(stat);
            let width = (max - min) / bins as f64;
            let centres: Vec<f64> = (0..bins)
                .map(|i| min + width * (i as f64 + 0.5))
                .collect();
            let weights: Vec<f64> = centres
                .iter()
                .map(|&x| model.weight(x, stat, mean, std))
                .collect();
            let weight_sum: f64 = weights.iter().sum();
            if weight_sum > 0.0 {
                for (centre, weight) in centres.iter().zip(&weights) {
                    let count = weight / weight_sum * total;
                    // Zero-weight bins are dropped rather than emitted.
                    if count > 0.0 {
                        points.push(ChartPoint::Frequency {
                            value: format_bin(*centre),
                            count,
                        });
                    }
                }
            }
        }

        Ok(ChartSeries {
            chart_type: ctx.chart_type,
            points,
            title: format!("Distribution of {}", stat.name),
            x_label: stat.name.clone(),
            y_label: "Count".to_string(),
            approximate: true,
            caveat: Some(SYNTHESIS_CAVEAT.to_string()),
        })
    }
}

/// Continuous density approximation: a Gaussian kernel evaluated at evenly
/// spaced points across [min, max].
pub struct DensitySynth;

impl Synthesizer for DensitySynth {
    fn synthesize(&self, ctx: &SynthContext<'_>) -> EdaResult<ChartSeries> {
        let stat = ctx.required_column()?;
        ctx.require_numeric(stat)?;

        let min = stat.min.unwrap_or(0.0);
        let max = stat.max.unwrap_or(min + 1.0);
        let mean = stat.mean.unwrap_or((min + max) / 2.0);
        let std = stat
            .std
            .filter(|s| *s > 0.0)
            .unwrap_or(((max - min) / 6.0).max(f64::EPSILON));

        let steps = ctx.policy.density_point_count;
        let span = (max - min).max(f64::EPSILON);
        let points = (0..steps)
            .map(|i| {
                let x = min + span * i as f64 / (steps - 1).max(1) as f64;
                ChartPoint::Frequency {
                    value: format_bin(x),
                    count: gaussian_pdf(x, mean, std),
                }
            })
            .collect();

        Ok(ChartSeries {
            chart_type: ctx.chart_type,
            points,
            title: format!("Density of {}", stat.name),
            x_label: stat.name.clone(),
            y_label: "Density".to_string(),
            approximate: true,
            caveat: Some(SYNTHESIS_CAVEAT.to_string()),
        })
    }
}

fn format_bin(x: f64) -> String {
    if x.abs() >= 1000.0 {
        format!("{x:.0}")
    } else {
        format!("{x:.2}")
    }
}
