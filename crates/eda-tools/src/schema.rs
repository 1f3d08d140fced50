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

use eda_charts::ChartType;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A named tool with its JSON input schema, in the shape LLM runtimes expect
/// for function declarations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

fn chart_type_values() -> Vec<&'static str> {
    ChartType::ALL.iter().map(|t| t.as_str()).collect()
}

/// The five tool declarations the façade dispatches.
pub fn tool_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "start_analysis_from_upload".to_string(),
            description: "Register an already-uploaded CSV with the analysis backend and \
                          start an analysis job."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "file_key": {
                        "type": "string",
                        "description": "Object-store key returned by the upload flow"
                    },
                    "file_name": {
                        "type": "string",
                        "description": "Original filename, for session bookkeeping"
                    },
                    "analysis_type": {
                        "type": "string",
                        "enum": ["basic_eda", "advanced_stats", "data_quality"]
                    }
                },
                "required": ["file_key", "file_name"]
            }),
        },
        ToolSpec {
            name: "check_analysis_status".to_string(),
            description: "Check the lifecycle status of an analysis job. Safe to call \
                          speculatively; omitting the id checks the most recent job."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "analysis_id": {
                        "type": "string",
                        "description": "Analysis id; defaults to the session's latest job"
                    }
                },
                "required": []
            }),
        },
        ToolSpec {
            name: "get_analysis_result".to_string(),
            description: "Fetch the complete analysis results: dataset info, per-column \
                          statistics, correlations, data quality and summary."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "analysis_id": {
                        "type": "string",
                        "description": "Analysis id; defaults to the session's latest job"
                    }
                },
                "required": []
            }),
        },
        ToolSpec {
            name: "suggest_chart_columns".to_string(),
            description: "Rank the columns of a completed analysis by suitability for a \
                          given chart type. Call this before generate_chart_data when the \
                          user has not named a column."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "analysis_id": {"type": "string"},
                    "chart_type": {"type": "string", "enum": chart_type_values()}
                },
                "required": ["chart_type"]
            }),
        },
        ToolSpec {
            name: "generate_chart_data".to_string(),
            description: "Derive render-ready chart data from a completed analysis. \
                          Distribution, density and scatter series are synthesised from \
                          summary statistics and flagged as approximate."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "analysis_id": {"type": "string"},
                    "chart_type": {"type": "string", "enum": chart_type_values()},
                    "column_name": {
                        "type": "string",
                        "description": "Column for single-column chart types"
                    },
                    "x_column": {"type": "string"},
                    "y_column": {"type": "string"},
                    "max_bins": {"type": "integer", "minimum": 1}
                },
                "required": ["chart_type"]
            }),
        },
    ]
}
