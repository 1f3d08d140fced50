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

use super::{ChartPoint, ChartSeries, SynthContext, Synthesizer, SYNTHESIS_CAVEAT};
use crate::selector::{select_columns, RankedColumn};
use crate::ChartType;
use eda_contracts::error::{EdaError, EdaResult};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Synthetic scatter: points are drawn within each column's recorded range
/// and biased toward the recorded correlation, so the picture reflects the
/// relationship's strength without replaying any source row.
pub struct ScatterSynth;

struct Axis {
    name: String,
    min: f64,
    max: f64,
}

impl Synthesizer for ScatterSynth {
    fn synthesize(&self, ctx: &SynthContext<'_>) -> EdaResult<ChartSeries> {
        let (x_axis, y_axis) = resolve_axes(ctx)?;
        let r = ctx
            .correlations
            .and_then(|c| c.correlations.coefficient(&x_axis.name, &y_axis.name))
            .unwrap_or(0.0)
            .clamp(-1.0, 1.0);

        let mut rng = rand::thread_rng();
        // Noise around the midline; correlation strength decides how much
        // of the y position the x position dictates.
        let noise: Normal<f64> = Normal::new(0.5, 0.25).expect("fixed normal parameters are valid");
        let magnitude = r.abs();

        let points = (0..ctx.policy.scatter_point_count)
            .map(|_| {
                let x_norm: f64 = rng.gen_range(0.0..=1.0);
                let base = if r >= 0.0 { x_norm } else { 1.0 - x_norm };
                let jitter = noise.sample(&mut rng).clamp(0.0, 1.0);
                let y_norm = (magnitude * base + (1.0 - magnitude) * jitter).clamp(0.0, 1.0);
                ChartPoint::Xy {
                    x: x_axis.min + x_norm * (x_axis.max - x_axis.min),
                    y: y_axis.min + y_norm * (y_axis.max - y_axis.min),
                    group: None,
                }
            })
            .collect();

        Ok(ChartSeries {
            chart_type: ChartType::Scatter,
            points,
            title: format!("{} vs {}", x_axis.name, y_axis.name),
            x_label: x_axis.name,
            y_label: y_axis.name,
            approximate: true,
            caveat: Some(SYNTHESIS_CAVEAT.to_string()),
        })
    }
}

/// Explicit x/y columns are validated; otherwise the two highest-ranked
/// numeric columns are used. When per-column statistics are entirely absent
/// but a correlation matrix exists, ranges degrade to the configured
/// fallback sampling range.
fn resolve_axes(ctx: &SynthContext<'_>) -> EdaResult<(Axis, Axis)> {
    match (ctx.params.x_column.as_deref(), ctx.params.y_column.as_deref()) {
        (Some(x), Some(y)) => {
            if ctx.columns.is_empty() && ctx.correlations.is_some() {
                return Ok((fallback_axis(ctx, x), fallback_axis(ctx, y)));
            }
            let x_stat = ctx.column(x)?;
            let y_stat = ctx.column(y)?;
            ctx.require_numeric(x_stat)?;
            ctx.require_numeric(y_stat)?;
            Ok((axis_from_stat(ctx, x_stat), axis_from_stat(ctx, y_stat)))
        }
        (None, None) => {
            let selection = select_columns(ctx.columns, ChartType::Scatter, ctx.correlations);
            let best: &RankedColumn =
                selection
                    .recommended
                    .first()
                    .ok_or_else(|| EdaError::MissingParameter {
                        parameter: "x_column/y_column".to_string(),
                        chart_type: ChartType::Scatter.as_str().to_string(),
                    })?;
            let pair = best.pair.clone().ok_or_else(|| EdaError::MissingParameter {
                parameter: "y_column".to_string(),
                chart_type: ChartType::Scatter.as_str().to_string(),
            })?;
            let x_axis = match ctx.column(&best.name) {
                Ok(stat) => axis_from_stat(ctx, stat),
                Err(_) => fallback_axis(ctx, &best.name),
            };
            let y_axis = match ctx.column(&pair) {
                Ok(stat) => axis_from_stat(ctx, stat),
                Err(_) => fallback_axis(ctx, &pair),
            };
            Ok((x_axis, y_axis))
        }
        _ => Err(EdaError::MissingParameter {
            parameter: "x_column and y_column must be supplied together".to_string(),
            chart_type: ChartType::Scatter.as_str().to_string(),
        }),
    }
}

fn axis_from_stat(ctx: &SynthContext<'_>, stat: &eda_contracts::types::ColumnStat) -> Axis {
    let (fallback_min, fallback_max) = ctx.policy.fallback_sample_range;
    let min = stat.min.unwrap_or(fallback_min);
    let max = stat.max.filter(|m| *m > min).unwrap_or(min + (fallback_max - fallback_min));
    Axis {
        name: stat.name.clone(),
        min,
        max,
    }
}

fn fallback_axis(ctx: &SynthContext<'_>, name: &str) -> Axis {
    let (min, max) = ctx.policy.fallback_sample_range;
    Axis {
        name: name.to_string(),
        min,
        max,
    }
}
