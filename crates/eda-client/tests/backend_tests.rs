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

use eda_client::BackendClient;
use eda_contracts::config::EdaConfig;
use eda_contracts::error::EdaError;
use eda_contracts::types::AnalysisState;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn quick_config(base_url: &str) -> EdaConfig {
    EdaConfig {
        status_timeout: Duration::from_millis(100),
        results_timeout: Duration::from_millis(100),
        retry_attempts: 3,
        retry_delay: Duration::from_millis(1),
        ..EdaConfig::default().with_base_url(base_url)
    }
}

#[tokio::test]
async fn status_decodes_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/analysis/status/abc-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "analysis_id": "abc-123",
            "status": "processing",
            "progress": 40.0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = BackendClient::new(quick_config(&server.uri()));
    let report = client.status("abc-123").await.unwrap();
    assert_eq!(report.analysis_id, "abc-123");
    assert_eq!(report.status, AnalysisState::Processing);
    assert_eq!(report.progress, Some(40.0));
}

#[tokio::test]
async fn status_running_alias_maps_to_processing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/analysis/status/abc-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "analysis_id": "abc-123",
            "status": "running"
        })))
        .mount(&server)
        .await;

    let client = BackendClient::new(quick_config(&server.uri()));
    let report = client.status("abc-123").await.unwrap();
    assert_eq!(report.status, AnalysisState::Processing);
}

#[tokio::test]
async fn status_404_is_not_found_after_one_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/analysis/status/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = BackendClient::new(quick_config(&server.uri()));
    let err = client.status("gone").await.unwrap_err();
    match err {
        EdaError::AnalysisNotFound { analysis_id } => assert_eq!(analysis_id, "gone"),
        other => panic!("expected not-found, got {other:?}"),
    }
}

#[tokio::test]
async fn status_500_surfaces_backend_error_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/analysis/status/abc-123"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let client = BackendClient::new(quick_config(&server.uri()));
    let err = client.status("abc-123").await.unwrap_err();
    match err {
        EdaError::Backend { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected backend error, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_status_exhausts_the_retry_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/analysis/status/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(500))
                .set_body_json(json!({"analysis_id": "slow", "status": "processing"})),
        )
        .expect(3)
        .mount(&server)
        .await;

    let client = BackendClient::new(quick_config(&server.uri()));
    let err = client.status("slow").await.unwrap_err();
    match err {
        EdaError::Timeout { attempts, .. } => assert_eq!(attempts, 3),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn results_decodes_full_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/analysis/results/abc-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "analysis_id": "abc-123",
            "status": "completed",
            "results": {
                "dataset_info": {
                    "filename": "sales.csv",
                    "rows": 5000,
                    "columns": 8
                },
                "column_stats": [
                    {
                        "name": "revenue",
                        "dtype": "float64",
                        "count": 5000,
                        "null_count": 12,
                        "null_percentage": 0.24,
                        "unique_count": 4810,
                        "mean": 1040.2,
                        "std": 220.5
                    }
                ]
            }
        })))
        .mount(&server)
        .await;

    let client = BackendClient::new(quick_config(&server.uri()));
    let result = client.results("abc-123").await.unwrap();
    assert_eq!(result.status, AnalysisState::Completed);
    assert_eq!(result.results.dataset_info.rows, 5000);
    assert_eq!(result.results.column_stats.len(), 1);
    assert!(result.results.column_stats[0].is_numeric());
}

#[tokio::test]
async fn results_404_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/analysis/results/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = BackendClient::new(quick_config(&server.uri()));
    let err = client.results("gone").await.unwrap_err();
    assert!(matches!(err, EdaError::AnalysisNotFound { .. }));
}
