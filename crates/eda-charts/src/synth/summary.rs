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

use super::{ChartPoint, ChartSeries, SynthContext, Synthesizer};
use eda_contracts::error::{EdaError, EdaResult};
use itertools::Itertools;

/// Five-number summary taken directly from statistics. No synthesis.
pub struct BoxplotSynth;

impl Synthesizer for BoxplotSynth {
    fn synthesize(&self, ctx: &SynthContext<'_>) -> EdaResult<ChartSeries> {
        let stat = ctx.required_column()?;
        ctx.require_numeric(stat)?;

        let five = [
            ("min", stat.min),
            ("q1", stat.q25),
            ("median", stat.median),
            ("q3", stat.q75),
            ("max", stat.max),
        ];
        let mut points = Vec::with_capacity(5);
        for (label, value) in five {
            let value = value.ok_or_else(|| EdaError::UnsupportedOperation {
                chart_type: ctx.chart_type.as_str().to_string(),
                column: stat.name.clone(),
                dtype: stat.dtype.clone(),
            })?;
            points.push(ChartPoint::Box {
                category: label.to_string(),
                value,
                outlier: false,
            });
        }

        Ok(ChartSeries {
            chart_type: ctx.chart_type,
            points,
            title: format!("Five-number summary of {}", stat.name),
            x_label: stat.name.clone(),
            y_label: "Value".to_string(),
            approximate: false,
            caveat: None,
        })
    }
}

/// IQR-method outlier listing for one column, capped by policy.
pub struct OutlierSynth;

impl Synthesizer for OutlierSynth {
    fn synthesize(&self, ctx: &SynthContext<'_>) -> EdaResult<ChartSeries> {
        let stat = ctx.required_column()?;
        let iqr = stat
            .outliers
            .as_ref()
            .and_then(|o| o.iqr_method.as_ref())
            .ok_or_else(|| EdaError::UnsupportedOperation {
                chart_type: ctx.chart_type.as_str().to_string(),
                column: stat.name.clone(),
                dtype: stat.dtype.clone(),
            })?;

        let points: Vec<ChartPoint> = iqr
            .values
            .iter()
            .filter_map(serde_json::Value::as_f64)
            .take(ctx.policy.outlier_point_cap)
            .enumerate()
            .map(|(index, value)| ChartPoint::Box {
                category: index.to_string(),
                value,
                outlier: true,
            })
            .collect();

        Ok(ChartSeries {
            chart_type: ctx.chart_type,
            points,
            title: format!("IQR outliers in {}", stat.name),
            x_label: "Outlier".to_string(),
            y_label: stat.name.clone(),
            approximate: false,
            caveat: None,
        })
    }
}

/// Upper triangle of the correlation matrix, strongest pairs first,
/// weak cells (|r| at or below the policy floor) dropped.
pub struct HeatmapSynth;

impl Synthesizer for HeatmapSynth {
    fn synthesize(&self, ctx: &SynthContext<'_>) -> EdaResult<ChartSeries> {
        let correlations = ctx.correlations.ok_or_else(|| EdaError::Validation {
            reason: "no correlation data available in this analysis".to_string(),
        })?;
        let names = correlations.correlations.column_names();
        if names.len() < 2 {
            return Err(EdaError::Validation {
                reason: "the correlation matrix covers fewer than two columns".to_string(),
            });
        }

        let mut cells: Vec<(String, String, f64)> = names
            .iter()
            .tuple_combinations()
            .filter_map(|(a, b)| {
                correlations
                    .correlations
                    .coefficient(a, b)
                    .filter(|r| r.abs() > ctx.policy.heatmap_min_coefficient)
                    .map(|r| (a.clone(), b.clone(), r))
            })
            .collect();
        cells.sort_by(|a, b| b.2.abs().total_cmp(&a.2.abs()));
        cells.truncate(ctx.policy.heatmap_cell_cap);

        let points = cells
            .into_iter()
            .map(|(x, y, value)| ChartPoint::Cell { x, y, value })
            .collect();

        Ok(ChartSeries {
            chart_type: ctx.chart_type,
            points,
            title: "Strongest correlations".to_string(),
            x_label: "Variable 1".to_string(),
            y_label: "Variable 2".to_string(),
            approximate: false,
            caveat: None,
        })
    }
}
