/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Conflict retry for optimistic-concurrency writes.
//!
//! The API server rejects a write whose `resourceVersion` is stale with HTTP
//! 409. [`retry_on_conflict`] runs a write again on that answer, waiting
//! between attempts, until it succeeds, fails with anything other than a
//! conflict, or runs out of attempts.

use backoff::ExponentialBackoffBuilder;
use kube::Error as KubeError;
use skiff_utils::logging::prelude::*;
use std::future::Future;
use std::time::Duration;

/// Attempts and spacing for [`retry_on_conflict`].
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub steps: u32,
    pub initial_interval: Duration,
    pub factor: f64,
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            steps: 5,
            initial_interval: Duration::from_millis(10),
            factor: 1.0,
            jitter: 0.1,
        }
    }
}

impl From<&skiff_utils::config::Retry> for RetryPolicy {
    fn from(retry: &skiff_utils::config::Retry) -> Self {
        Self {
            steps: retry.steps,
            initial_interval: Duration::from_millis(retry.initial_interval_ms),
            factor: retry.factor,
            jitter: retry.jitter.clamp(0.0, 1.0),
        }
    }
}

/// True when the API server refused a write because the object changed.
pub fn is_conflict(error: &KubeError) -> bool {
    match error {
        KubeError::Api(api_err) => api_err.code == 409 || api_err.reason == "Conflict",
        _ => false,
    }
}

/// Runs `operation`, retrying it while it fails with a conflict.
///
/// At most `policy.steps` attempts are made (at least one). Non-conflict
/// errors are returned at once; when attempts run out the last conflict is
/// returned.
pub async fn retry_on_conflict<F, Fut, T>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, KubeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, KubeError>>,
{
    let steps = policy.steps.max(1);
    let backoff = ExponentialBackoffBuilder::new()
        .with_initial_interval(policy.initial_interval)
        .with_max_interval(Duration::from_secs(60))
        .with_multiplier(policy.factor)
        .with_randomization_factor(policy.jitter)
        .with_max_elapsed_time(None)
        .build();

    let mut attempt = 0u32;
    let attempt_with_backoff = || {
        attempt += 1;
        let current = attempt;
        let fut = operation();
        async move {
            match fut.await {
                Ok(value) => Ok(value),
                Err(error) if is_conflict(&error) && current < steps => {
                    warn!(
                        "Conflict on attempt {}/{}, retrying: {}",
                        current, steps, error
                    );
                    Err(backoff::Error::transient(error))
                }
                Err(error) => {
                    if is_conflict(&error) {
                        error!("Conflict persisted after {} attempts: {}", steps, error);
                    }
                    Err(backoff::Error::permanent(error))
                }
            }
        }
    };

    backoff::future::retry(backoff, attempt_with_backoff).await
}
