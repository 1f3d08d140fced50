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

use eda_contracts::error::{EdaError, EdaResult};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// An explicit retry policy value instead of loops inlined per call site.
/// The delay is fixed, matching the backend's polling contract.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration, timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            timeout,
        }
    }
}

/// Runs `operation` under the policy. Only transient errors (transport
/// failures, per-attempt timeouts) are retried; a definitive response —
/// validation, not-found, or any backend status — is surfaced immediately.
/// Exhausting the budget yields a `Timeout` distinct from not-found.
pub async fn call_with_policy<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut f: F,
) -> EdaResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = EdaResult<T>>,
{
    let mut last_transient: Option<EdaError> = None;

    for attempt in 1..=policy.max_attempts {
        debug!(operation, attempt, max = policy.max_attempts, "Attempting request");

        match tokio::time::timeout(policy.timeout, f()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) if err.is_transient() => {
                warn!(operation, attempt, error = %err, "Transient failure");
                last_transient = Some(err);
            }
            Ok(Err(err)) => return Err(err),
            Err(_) => {
                warn!(
                    operation,
                    attempt,
                    timeout_secs = policy.timeout.as_secs(),
                    "Request timed out"
                );
                last_transient = Some(EdaError::Timeout {
                    operation: operation.to_string(),
                    attempts: attempt,
                });
            }
        }

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.delay).await;
        }
    }

    // Keep the original detail when the last failure was a network error;
    // a timeout budget exhaustion is reported as such either way.
    match last_transient {
        Some(EdaError::Network { step, detail }) => {
            warn!(operation, %step, detail = %detail, "Retry budget exhausted");
            Err(EdaError::Timeout {
                operation: operation.to_string(),
                attempts: policy.max_attempts,
            })
        }
        _ => Err(EdaError::Timeout {
            operation: operation.to_string(),
            attempts: policy.max_attempts,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eda_contracts::error::RequestStep;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quick_policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(50))
    }

    #[tokio::test]
    async fn succeeds_first_attempt() {
        let calls = AtomicU32::new(0);
        let result = call_with_policy(&quick_policy(), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, EdaError>(7) }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_transient_error_short_circuits() {
        let calls = AtomicU32::new(0);
        let result: EdaResult<()> = call_with_policy(&quick_policy(), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(EdaError::AnalysisNotFound {
                    analysis_id: "gone".into(),
                })
            }
        })
        .await;
        assert!(matches!(result, Err(EdaError::AnalysisNotFound { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transient_errors_exhaust_the_budget() {
        let calls = AtomicU32::new(0);
        let result: EdaResult<()> = call_with_policy(&quick_policy(), "status poll", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(EdaError::Network {
                    step: RequestStep::Status,
                    detail: "connection refused".into(),
                })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(EdaError::Timeout {
                operation,
                attempts,
            }) => {
                assert_eq!(operation, "status poll");
                assert_eq!(attempts, 3);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
