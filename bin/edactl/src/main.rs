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

// Minimal bootstrap; the actual behaviour lives in the library crates.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eda_client::{BackendClient, UploadOrchestrator};
use eda_contracts::config::EdaConfig;
use eda_tools::{tool_specs, EdaToolkit, ToolOutcome};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "edactl", about = "CSV upload and chart derivation against the EDA backend")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a CSV and start an analysis.
    Upload { file: PathBuf },

    /// Check the status of an analysis job.
    Status { analysis_id: String },

    /// Rank columns by suitability for a chart type.
    Suggest {
        chart_type: String,
        #[arg(long)]
        analysis_id: String,
    },

    /// Derive render-ready chart data from a completed analysis.
    Chart {
        chart_type: String,
        #[arg(long)]
        analysis_id: String,
        #[arg(long)]
        column: Option<String>,
        #[arg(long)]
        x_column: Option<String>,
        #[arg(long)]
        y_column: Option<String>,
        #[arg(long)]
        max_bins: Option<usize>,
    },

    /// Print the tool declarations exposed to LLM runtimes.
    Tools,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = EdaConfig::from_env();

    match cli.cmd {
        Command::Upload { file } => upload(config, file).await,
        Command::Status { analysis_id } => status(config, &analysis_id).await,
        Command::Suggest {
            chart_type,
            analysis_id,
        } => {
            let toolkit = EdaToolkit::new(config);
            let outcome = toolkit
                .dispatch(
                    "suggest_chart_columns",
                    json!({"analysis_id": analysis_id, "chart_type": chart_type}),
                )
                .await;
            print_outcome(outcome)
        }
        Command::Chart {
            chart_type,
            analysis_id,
            column,
            x_column,
            y_column,
            max_bins,
        } => {
            let toolkit = EdaToolkit::new(config);
            let outcome = toolkit
                .dispatch(
                    "generate_chart_data",
                    json!({
                        "analysis_id": analysis_id,
                        "chart_type": chart_type,
                        "column_name": column,
                        "x_column": x_column,
                        "y_column": y_column,
                        "max_bins": max_bins,
                    }),
                )
                .await;
            print_outcome(outcome)
        }
        Command::Tools => {
            println!("{}", serde_json::to_string_pretty(&tool_specs())?);
            Ok(())
        }
    }
}

async fn upload(config: EdaConfig, file: PathBuf) -> Result<()> {
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .context("file path has no usable filename")?
        .to_string();
    let bytes = tokio::fs::read(&file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    info!(filename = %filename, size = bytes.len(), "Uploading");

    let orchestrator = UploadOrchestrator::new(BackendClient::new(config));
    let receipt = orchestrator.upload(&filename, bytes).await?;
    println!("{}", serde_json::to_string_pretty(&receipt)?);
    Ok(())
}

async fn status(config: EdaConfig, analysis_id: &str) -> Result<()> {
    let client = BackendClient::new(config);
    let report = client.status(analysis_id).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_outcome(outcome: ToolOutcome) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    if outcome.success {
        Ok(())
    } else {
        anyhow::bail!("{}", outcome.message)
    }
}
