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

use crate::session::AnalysisSession;
use eda_charts::{select_columns, ChartParams, ChartType, SynthPolicy, SynthRegistry};
use eda_client::BackendClient;
use eda_contracts::config::EdaConfig;
use eda_contracts::error::{EdaError, EdaResult};
use eda_contracts::types::{AnalysisResult, AnalysisType};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Uniform envelope for every tool invocation. Failures are data, not
/// errors: nothing an LLM runtime cannot relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolOutcome {
    fn ok(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            error: None,
        }
    }

    fn failure(err: &EdaError) -> Self {
        let mut message = err.user_message();
        if let Some(remedy) = err.remedy() {
            message.push(' ');
            message.push_str(remedy);
        }
        Self {
            success: false,
            message,
            data: None,
            error: Some(err.category().to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StartArgs {
    file_key: String,
    file_name: String,
    #[serde(default)]
    analysis_type: Option<AnalysisType>,
}

#[derive(Debug, Deserialize)]
struct JobArgs {
    #[serde(default)]
    analysis_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SuggestArgs {
    #[serde(default)]
    analysis_id: Option<String>,
    chart_type: String,
}

#[derive(Debug, Deserialize)]
struct ChartArgs {
    #[serde(default)]
    analysis_id: Option<String>,
    chart_type: String,
    #[serde(default)]
    column_name: Option<String>,
    #[serde(default)]
    x_column: Option<String>,
    #[serde(default)]
    y_column: Option<String>,
    #[serde(default)]
    max_bins: Option<usize>,
}

/// The tool façade: one backend client, one session context, one synthesizer
/// registry. Concurrent tool calls share the session behind an async lock.
pub struct EdaToolkit {
    client: BackendClient,
    session: RwLock<AnalysisSession>,
    registry: SynthRegistry,
}

impl EdaToolkit {
    pub fn new(config: EdaConfig) -> Self {
        let registry = SynthRegistry::new(SynthPolicy::from_config(&config));
        Self {
            client: BackendClient::new(config),
            session: RwLock::new(AnalysisSession::new()),
            registry,
        }
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }

    /// Routes a named tool call. Malformed arguments and every downstream
    /// error become a failed outcome; this function never errors.
    pub async fn dispatch(&self, name: &str, args: Value) -> ToolOutcome {
        match name {
            "start_analysis_from_upload" => match serde_json::from_value(args) {
                Ok(args) => self.start_analysis_from_upload(args).await,
                Err(e) => ToolOutcome::failure(&EdaError::from(e)),
            },
            "check_analysis_status" => match serde_json::from_value::<JobArgs>(args) {
                Ok(args) => self.check_analysis_status(args.analysis_id.as_deref()).await,
                Err(e) => ToolOutcome::failure(&EdaError::from(e)),
            },
            "get_analysis_result" => match serde_json::from_value::<JobArgs>(args) {
                Ok(args) => self.get_analysis_result(args.analysis_id.as_deref()).await,
                Err(e) => ToolOutcome::failure(&EdaError::from(e)),
            },
            "suggest_chart_columns" => match serde_json::from_value(args) {
                Ok(args) => self.suggest_chart_columns(args).await,
                Err(e) => ToolOutcome::failure(&EdaError::from(e)),
            },
            "generate_chart_data" => match serde_json::from_value(args) {
                Ok(args) => self.generate_chart_data(args).await,
                Err(e) => ToolOutcome::failure(&EdaError::from(e)),
            },
            other => {
                warn!(tool = other, "Unknown tool requested");
                ToolOutcome::failure(&EdaError::Validation {
                    reason: format!("unknown tool '{other}'"),
                })
            }
        }
    }

    async fn start_analysis_from_upload(&self, args: StartArgs) -> ToolOutcome {
        match self.try_start(&args).await {
            Ok(outcome) => outcome,
            Err(e) => ToolOutcome::failure(&e),
        }
    }

    async fn try_start(&self, args: &StartArgs) -> EdaResult<ToolOutcome> {
        let analysis_type = args.analysis_type.unwrap_or_default();
        let response = self
            .client
            .start_analysis(&args.file_key, analysis_type)
            .await?;
        self.session.write().await.record(
            &response.analysis_id,
            Some(&args.file_name),
            response.status,
        );
        info!(
            analysis_id = %response.analysis_id,
            file_name = %args.file_name,
            "Analysis started"
        );
        Ok(ToolOutcome::ok(
            format!(
                "Analysis started for '{}' (id {}).",
                args.file_name, response.analysis_id
            ),
            Some(json!({
                "analysis_id": response.analysis_id,
                "status": response.status,
            })),
        ))
    }

    /// Side-effect free apart from session bookkeeping; safe to call
    /// speculatively while waiting for a job to complete.
    async fn check_analysis_status(&self, analysis_id: Option<&str>) -> ToolOutcome {
        match self.try_status(analysis_id).await {
            Ok(outcome) => outcome,
            Err(e) => ToolOutcome::failure(&e),
        }
    }

    async fn try_status(&self, analysis_id: Option<&str>) -> EdaResult<ToolOutcome> {
        let id = self.session.read().await.resolve(analysis_id)?;
        let report = self.client.status(&id).await?;
        self.session.write().await.update_status(&id, report.status);
        let is_complete = report.status.is_terminal();
        Ok(ToolOutcome::ok(
            format!("Analysis {} is {}.", id, report.status.as_str()),
            Some(json!({
                "analysis_id": report.analysis_id,
                "status": report.status,
                "progress": report.progress,
                "message": report.message,
                "is_complete": is_complete,
            })),
        ))
    }

    async fn get_analysis_result(&self, analysis_id: Option<&str>) -> ToolOutcome {
        match self.try_result(analysis_id).await {
            Ok((id, result)) => ToolOutcome::ok(
                format!(
                    "Results for analysis {} ({} rows, {} columns).",
                    id, result.results.dataset_info.rows, result.results.dataset_info.columns
                ),
                serde_json::to_value(&result).ok(),
            ),
            Err(e) => ToolOutcome::failure(&e),
        }
    }

    async fn suggest_chart_columns(&self, args: SuggestArgs) -> ToolOutcome {
        let chart_type = match parse_chart_type(&args.chart_type) {
            Ok(t) => t,
            Err(e) => return ToolOutcome::failure(&e),
        };
        match self.try_result(args.analysis_id.as_deref()).await {
            Ok((_, result)) => {
                let selection = select_columns(
                    &result.results.column_stats,
                    chart_type,
                    result.results.correlations.as_ref(),
                );
                let message = match &selection.reason {
                    Some(reason) => format!(
                        "No suitable columns for a {chart_type} chart: {reason}."
                    ),
                    None => format!(
                        "{} candidate column(s) for a {chart_type} chart.",
                        selection.recommended.len()
                    ),
                };
                ToolOutcome::ok(message, serde_json::to_value(&selection).ok())
            }
            Err(e) => ToolOutcome::failure(&e),
        }
    }

    async fn generate_chart_data(&self, args: ChartArgs) -> ToolOutcome {
        let chart_type = match parse_chart_type(&args.chart_type) {
            Ok(t) => t,
            Err(e) => return ToolOutcome::failure(&e),
        };
        let params = ChartParams {
            column: args.column_name.clone(),
            x_column: args.x_column.clone(),
            y_column: args.y_column.clone(),
            max_bins: args.max_bins,
        };
        let result = match self.try_result(args.analysis_id.as_deref()).await {
            Ok((_, result)) => result,
            Err(e) => return ToolOutcome::failure(&e),
        };
        match self.registry.synthesize(
            chart_type,
            &result.results.column_stats,
            result.results.correlations.as_ref(),
            &params,
        ) {
            Ok(series) => {
                let message = match &series.caveat {
                    Some(caveat) => format!("{} chart ready. {caveat}", series.chart_type),
                    None => format!("{} chart ready.", series.chart_type),
                };
                ToolOutcome::ok(message, serde_json::to_value(&series).ok())
            }
            Err(e) => ToolOutcome::failure(&e),
        }
    }

    async fn try_result(&self, analysis_id: Option<&str>) -> EdaResult<(String, AnalysisResult)> {
        let id = self.session.read().await.resolve(analysis_id)?;
        let result = self.client.results(&id).await?;
        self.session.write().await.update_status(&id, result.status);
        Ok((id, result))
    }
}

fn parse_chart_type(raw: &str) -> EdaResult<ChartType> {
    ChartType::from_str(raw).map_err(|reason| EdaError::Validation { reason })
}
