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

use crate::retry::{call_with_policy, RetryPolicy};
use eda_contracts::config::EdaConfig;
use eda_contracts::error::{EdaError, EdaResult, RequestStep};
use eda_contracts::types::{
    AnalysisResult, AnalysisStartRequest, AnalysisStartResponse, AnalysisStatusReport,
    AnalysisType, PresignedUploadResponse,
};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

/// Thin typed client over the analysis backend's HTTP surface. One
/// `reqwest::Client` is shared across all calls.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    config: EdaConfig,
}

impl BackendClient {
    pub fn new(config: EdaConfig) -> Self {
        let client = Client::builder()
            .build()
            .expect("Failed to create HTTP client");
        Self { client, config }
    }

    pub fn config(&self) -> &EdaConfig {
        &self.config
    }

    fn status_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.config.retry_attempts,
            self.config.retry_delay,
            self.config.status_timeout,
        )
    }

    fn results_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.config.retry_attempts,
            self.config.retry_delay,
            self.config.results_timeout,
        )
    }

    /// Requests a time-limited presigned upload slot, keyed by filename.
    pub async fn presigned_upload(&self, filename: &str) -> EdaResult<PresignedUploadResponse> {
        let url = format!("{}/api/v1/r2/presigned-upload/", self.config.base_url);
        debug!(filename, "Requesting presigned upload slot");
        let response = self
            .client
            .post(&url)
            .query(&[("filename", filename), ("folder", "uploads")])
            .send()
            .await
            .map_err(|e| network(RequestStep::Presign, e))?;
        decode(response, RequestStep::Presign, None).await
    }

    /// Transfers raw bytes directly to the object store slot.
    pub async fn put_object(&self, upload_url: &str, bytes: Vec<u8>) -> EdaResult<()> {
        debug!(upload_url, size = bytes.len(), "Transferring file to object store");
        let response = self
            .client
            .put(upload_url)
            .header("Content-Type", "text/csv")
            .body(bytes)
            .send()
            .await
            .map_err(|e| network(RequestStep::Transfer, e))?;
        expect_success(response).await
    }

    /// Relays the transfer through the backend's CORS proxy. Used once,
    /// only after a direct transfer fails at the transport level.
    pub async fn put_object_via_proxy(&self, upload_url: &str, bytes: Vec<u8>) -> EdaResult<()> {
        let url = format!("{}/cors-proxy/r2-upload", self.config.base_url);
        info!(upload_url, "Retrying transfer through the proxy relay");
        let response = self
            .client
            .post(&url)
            .query(&[("target_url", upload_url)])
            .header("Content-Type", "text/csv")
            .body(bytes)
            .send()
            .await
            .map_err(|e| network(RequestStep::Transfer, e))?;
        expect_success(response).await
    }

    /// Registers an uploaded object with the backend, starting an analysis
    /// job.
    pub async fn start_analysis(
        &self,
        file_key: &str,
        analysis_type: AnalysisType,
    ) -> EdaResult<AnalysisStartResponse> {
        let url = format!("{}/api/v1/analysis/start", self.config.base_url);
        debug!(file_key, analysis_type = analysis_type.as_str(), "Starting analysis");
        let request = AnalysisStartRequest {
            file_key: file_key.to_string(),
            analysis_type,
        };
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| network(RequestStep::Register, e))?;
        decode(response, RequestStep::Register, None).await
    }

    /// Polls the job's lifecycle status with the bounded status policy.
    pub async fn status(&self, analysis_id: &str) -> EdaResult<AnalysisStatusReport> {
        let url = format!("{}/api/v1/analysis/status/{}", self.config.base_url, analysis_id);
        let policy = self.status_policy();
        call_with_policy(&policy, "status poll", || {
            let client = self.client.clone();
            let url = url.clone();
            async move {
                let response = client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| network(RequestStep::Status, e))?;
                decode(response, RequestStep::Status, Some(analysis_id)).await
            }
        })
        .await
    }

    /// Fetches the full analysis result. The longer timeout reflects the
    /// payload size.
    pub async fn results(&self, analysis_id: &str) -> EdaResult<AnalysisResult> {
        let url = format!(
            "{}/api/v1/analysis/results/{}",
            self.config.base_url, analysis_id
        );
        let policy = self.results_policy();
        call_with_policy(&policy, "result fetch", || {
            let client = self.client.clone();
            let url = url.clone();
            async move {
                let response = client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| network(RequestStep::Results, e))?;
                decode(response, RequestStep::Results, Some(analysis_id)).await
            }
        })
        .await
    }
}

fn network(step: RequestStep, error: reqwest::Error) -> EdaError {
    EdaError::Network {
        step,
        detail: error.to_string(),
    }
}

/// Decodes a JSON body on success; maps 404 to a definitive not-found when
/// an analysis id is in play, and every other non-2xx to a backend error.
async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
    step: RequestStep,
    analysis_id: Option<&str>,
) -> EdaResult<T> {
    let status = response.status();
    if status.is_success() {
        let body = response
            .bytes()
            .await
            .map_err(|e| network(step, e))?;
        return serde_json::from_slice(&body).map_err(EdaError::from);
    }
    Err(error_for_status(status, response, analysis_id).await)
}

async fn expect_success(response: reqwest::Response) -> EdaResult<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    Err(error_for_status(status, response, None).await)
}

async fn error_for_status(
    status: StatusCode,
    response: reqwest::Response,
    analysis_id: Option<&str>,
) -> EdaError {
    if status == StatusCode::NOT_FOUND {
        if let Some(id) = analysis_id {
            return EdaError::AnalysisNotFound {
                analysis_id: id.to_string(),
            };
        }
    }
    let message = response.text().await.unwrap_or_default();
    EdaError::Backend {
        status: status.as_u16(),
        message,
    }
}
