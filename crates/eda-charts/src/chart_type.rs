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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Bar,
    Line,
    Histogram,
    Distribution,
    Density,
    Boxplot,
    Scatter,
    CorrelationHeatmap,
    MissingValues,
    Outliers,
}

impl ChartType {
    pub const ALL: [ChartType; 10] = [
        ChartType::Bar,
        ChartType::Line,
        ChartType::Histogram,
        ChartType::Distribution,
        ChartType::Density,
        ChartType::Boxplot,
        ChartType::Scatter,
        ChartType::CorrelationHeatmap,
        ChartType::MissingValues,
        ChartType::Outliers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Histogram => "histogram",
            ChartType::Distribution => "distribution",
            ChartType::Density => "density",
            ChartType::Boxplot => "boxplot",
            ChartType::Scatter => "scatter",
            ChartType::CorrelationHeatmap => "correlation_heatmap",
            ChartType::MissingValues => "missing_values",
            ChartType::Outliers => "outliers",
        }
    }

    /// Chart families that require a single numeric column.
    pub fn needs_numeric_column(&self) -> bool {
        matches!(
            self,
            ChartType::Histogram
                | ChartType::Distribution
                | ChartType::Density
                | ChartType::Boxplot
        )
    }
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChartType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown chart type '{s}'"))
    }
}
