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

use crate::backend::BackendClient;
use eda_contracts::error::{EdaError, EdaResult};
use eda_contracts::types::{AnalysisState, AnalysisType};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// What the caller gets back after a successful upload-and-register pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub file_key: String,
    pub analysis_id: String,
    pub status: AnalysisState,
    pub file_name: String,
    pub file_size: usize,
}

/// Drives the three-step upload pipeline: presign, transfer, register.
/// Local validation happens before any network traffic.
#[derive(Debug, Clone)]
pub struct UploadOrchestrator {
    client: BackendClient,
}

impl UploadOrchestrator {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }

    fn validate(&self, filename: &str, size: usize) -> EdaResult<()> {
        if !filename.to_lowercase().ends_with(".csv") {
            return Err(EdaError::Validation {
                reason: format!("'{filename}' is not a CSV file; only .csv uploads are accepted"),
            });
        }
        let limit = self.client.config().max_upload_bytes;
        if size as u64 > limit {
            return Err(EdaError::Validation {
                reason: format!(
                    "file is {size} bytes, above the {limit} byte upload limit"
                ),
            });
        }
        Ok(())
    }

    /// Uploads a CSV and registers it for analysis. A direct transfer that
    /// fails at the transport level is retried exactly once through the
    /// backend's proxy relay; any definitive response is surfaced as-is.
    pub async fn upload(&self, filename: &str, bytes: Vec<u8>) -> EdaResult<UploadReceipt> {
        let file_size = bytes.len();
        self.validate(filename, file_size)?;

        let slot = self.client.presigned_upload(filename).await?;
        info!(filename, file_key = %slot.file_key, "Presigned upload slot granted");

        match self.client.put_object(&slot.upload_url, bytes.clone()).await {
            Ok(()) => {}
            Err(err @ EdaError::Network { .. }) => {
                warn!(error = %err, "Direct transfer failed, falling back to proxy relay");
                self.client
                    .put_object_via_proxy(&slot.upload_url, bytes)
                    .await?;
            }
            Err(err) => return Err(err),
        }

        let registration = self
            .client
            .start_analysis(&slot.file_key, AnalysisType::default())
            .await?;
        info!(
            analysis_id = %registration.analysis_id,
            status = registration.status.as_str(),
            "Analysis registered"
        );

        Ok(UploadReceipt {
            file_key: slot.file_key,
            analysis_id: registration.analysis_id,
            status: registration.status,
            file_name: filename.to_string(),
            file_size,
        })
    }
}
