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
use eda_contracts::types::ColumnStat;

/// Bar chart. With a named column, one bar per top value; without one, an
/// aggregate view across categorical columns (unique-category counts).
pub struct BarSynth;

impl Synthesizer for BarSynth {
    fn synthesize(&self, ctx: &SynthContext<'_>) -> EdaResult<ChartSeries> {
        match ctx.params.column.as_deref() {
            Some(name) => single_column_bars(ctx, ctx.column(name)?),
            None => aggregate_bars(ctx),
        }
    }
}

fn single_column_bars(ctx: &SynthContext<'_>, stat: &ColumnStat) -> EdaResult<ChartSeries> {
    let top_values = stat
        .top_values
        .as_ref()
        .filter(|tv| !tv.is_empty())
        .ok_or_else(|| EdaError::UnsupportedOperation {
            chart_type: ctx.chart_type.as_str().to_string(),
            column: stat.name.clone(),
            dtype: stat.dtype.clone(),
        })?;

    let mut points: Vec<ChartPoint> = top_values
        .iter()
        .map(|(value, entry)| ChartPoint::Frequency {
            value: value.clone(),
            count: entry.count as f64,
        })
        .collect();
    points.sort_by(|a, b| frequency_count(b).total_cmp(&frequency_count(a)));

    Ok(ChartSeries {
        chart_type: ctx.chart_type,
        points,
        title: format!("Top values of {}", stat.name),
        x_label: stat.name.clone(),
        y_label: "Count".to_string(),
        approximate: false,
        caveat: None,
    })
}

fn aggregate_bars(ctx: &SynthContext<'_>) -> EdaResult<ChartSeries> {
    let points: Vec<ChartPoint> = ctx
        .columns
        .iter()
        .filter(|c| c.is_categorical())
        .map(|c| ChartPoint::Frequency {
            value: c.name.clone(),
            count: c.unique_count as f64,
        })
        .collect();

    Ok(ChartSeries {
        chart_type: ctx.chart_type,
        points,
        title: "Unique categories per column".to_string(),
        x_label: "Column".to_string(),
        y_label: "Unique values".to_string(),
        approximate: false,
        caveat: None,
    })
}

/// Line chart across columns: mean value per numeric column. A dataset-level
/// overview rather than a within-column series.
pub struct LineSynth;

impl Synthesizer for LineSynth {
    fn synthesize(&self, ctx: &SynthContext<'_>) -> EdaResult<ChartSeries> {
        let points: Vec<ChartPoint> = ctx
            .columns
            .iter()
            .filter(|c| c.is_numeric())
            .filter_map(|c| {
                c.mean.map(|mean| ChartPoint::Frequency {
                    value: c.name.clone(),
                    count: mean,
                })
            })
            .collect();

        Ok(ChartSeries {
            chart_type: ctx.chart_type,
            points,
            title: "Mean value per numeric column".to_string(),
            x_label: "Column".to_string(),
            y_label: "Mean".to_string(),
            approximate: false,
            caveat: None,
        })
    }
}

/// Missing-values overview: one point per column with nulls, worst first,
/// capped at the policy's top-N.
pub struct MissingValuesSynth;

impl Synthesizer for MissingValuesSynth {
    fn synthesize(&self, ctx: &SynthContext<'_>) -> EdaResult<ChartSeries> {
        let mut with_nulls: Vec<&ColumnStat> = ctx
            .columns
            .iter()
            .filter(|c| c.null_percentage > 0.0)
            .collect();
        with_nulls.sort_by(|a, b| b.null_percentage.total_cmp(&a.null_percentage));
        with_nulls.truncate(ctx.policy.missing_column_cap);

        let points = with_nulls
            .into_iter()
            .map(|c| ChartPoint::Frequency {
                value: c.name.clone(),
                count: c.null_percentage,
            })
            .collect();

        Ok(ChartSeries {
            chart_type: ctx.chart_type,
            points,
            title: "Missing values by column".to_string(),
            x_label: "Column".to_string(),
            y_label: "Missing (%)".to_string(),
            approximate: false,
            caveat: None,
        })
    }
}

fn frequency_count(point: &ChartPoint) -> f64 {
    match point {
        ChartPoint::Frequency { count, .. } => *count,
        _ => 0.0,
    }
}
