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

use eda_client::{BackendClient, UploadOrchestrator};
use eda_contracts::config::EdaConfig;
use eda_contracts::error::EdaError;
use eda_contracts::types::AnalysisState;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CSV_BODY: &[u8] = b"region,revenue\nnorth,100\nsouth,80\n";

fn orchestrator(config: EdaConfig) -> UploadOrchestrator {
    UploadOrchestrator::new(BackendClient::new(config))
}

#[tokio::test]
async fn non_csv_rejected_before_any_request() {
    let server = MockServer::start().await;
    let orchestrator = orchestrator(EdaConfig::default().with_base_url(&server.uri()));

    let err = orchestrator
        .upload("data.txt", CSV_BODY.to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, EdaError::Validation { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn oversize_file_rejected_before_any_request() {
    let server = MockServer::start().await;
    let config = EdaConfig {
        max_upload_bytes: 16,
        ..EdaConfig::default().with_base_url(&server.uri())
    };
    let orchestrator = orchestrator(config);

    let err = orchestrator
        .upload("big.csv", CSV_BODY.to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, EdaError::Validation { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn upload_presigns_transfers_and_registers() {
    let server = MockServer::start().await;
    let object_url = format!("{}/r2/uploads/sales.csv", server.uri());

    Mock::given(method("POST"))
        .and(path("/api/v1/r2/presigned-upload/"))
        .and(query_param("filename", "sales.csv"))
        .and(query_param("folder", "uploads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "upload_url": object_url,
            "file_key": "uploads/sales.csv"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/r2/uploads/sales.csv"))
        .and(header("Content-Type", "text/csv"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/analysis/start"))
        .and(body_json(json!({
            "file_key": "uploads/sales.csv",
            "analysis_type": "basic_eda"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "analysis_id": "abc-123",
            "status": "pending"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = orchestrator(EdaConfig::default().with_base_url(&server.uri()));
    let receipt = orchestrator
        .upload("sales.csv", CSV_BODY.to_vec())
        .await
        .unwrap();

    assert_eq!(receipt.file_key, "uploads/sales.csv");
    assert_eq!(receipt.analysis_id, "abc-123");
    assert_eq!(receipt.status, AnalysisState::Pending);
    assert_eq!(receipt.file_name, "sales.csv");
    assert_eq!(receipt.file_size, CSV_BODY.len());
}

#[tokio::test]
async fn unreachable_object_store_falls_back_to_proxy_relay() {
    let server = MockServer::start().await;
    // Nothing listens on the discard port, so the direct PUT fails at the
    // transport level and the relay path takes over.
    let dead_url = "http://127.0.0.1:9/r2/uploads/sales.csv";

    Mock::given(method("POST"))
        .and(path("/api/v1/r2/presigned-upload/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "upload_url": dead_url,
            "file_key": "uploads/sales.csv"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/cors-proxy/r2-upload"))
        .and(query_param("target_url", dead_url))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/analysis/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "analysis_id": "abc-123",
            "status": "pending"
        })))
        .mount(&server)
        .await;

    let orchestrator = orchestrator(EdaConfig::default().with_base_url(&server.uri()));
    let receipt = orchestrator
        .upload("sales.csv", CSV_BODY.to_vec())
        .await
        .unwrap();
    assert_eq!(receipt.analysis_id, "abc-123");
}

#[tokio::test]
async fn rejected_transfer_is_not_relayed() {
    let server = MockServer::start().await;
    let object_url = format!("{}/r2/uploads/sales.csv", server.uri());

    Mock::given(method("POST"))
        .and(path("/api/v1/r2/presigned-upload/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "upload_url": object_url,
            "file_key": "uploads/sales.csv"
        })))
        .mount(&server)
        .await;

    // A definitive rejection from the object store must not trigger the
    // proxy relay.
    Mock::given(method("PUT"))
        .and(path("/r2/uploads/sales.csv"))
        .respond_with(ResponseTemplate::new(403).set_body_string("signature expired"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/cors-proxy/r2-upload"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let orchestrator = orchestrator(EdaConfig::default().with_base_url(&server.uri()));
    let err = orchestrator
        .upload("sales.csv", CSV_BODY.to_vec())
        .await
        .unwrap_err();
    match err {
        EdaError::Backend { status, .. } => assert_eq!(status, 403),
        other => panic!("expected backend error, got {other:?}"),
    }
}
