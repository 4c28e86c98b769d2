/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Pod listing and the periodic pod poller.

use k8s_openapi::api::core::v1::Pod;
use kube::api::ListParams;
use kube::{Api, ResourceExt};
use skiff_utils::logging::prelude::*;
use std::future::Future;
use tokio::select;
use tokio::signal::ctrl_c;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// `"<position>: <namespace> -> <name>"`, counting positions from 1.
pub fn format_pod_line(index: usize, pod: &Pod) -> String {
    format!(
        "{}: {} -> {}",
        index + 1,
        pod.namespace().unwrap_or_default(),
        pod.name_any()
    )
}

/// Lists every pod visible through `api`.
pub async fn list_pods(api: &Api<Pod>) -> Result<Vec<Pod>, Box<dyn std::error::Error>> {
    let pods = api.list(&ListParams::default()).await?;
    Ok(pods.items)
}

/// Lists pods on a fixed period and logs one line per pod.
pub struct PodPoller {
    api: Api<Pod>,
    interval: Duration,
    max_iterations: Option<u64>,
}

impl PodPoller {
    pub fn new(
        api: Api<Pod>,
        interval: Duration,
        max_iterations: Option<u64>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        if interval.is_zero() {
            return Err("Pod polling interval must be greater than zero".into());
        }
        Ok(Self {
            api,
            interval,
            max_iterations,
        })
    }

    /// Polls until a list call fails, `max_iterations` rounds have run, or
    /// Ctrl-C arrives. The first round runs immediately.
    ///
    /// Returns the number of completed rounds.
    pub async fn run(&self) -> Result<u64, Box<dyn std::error::Error>> {
        self.run_until(ctrl_c()).await
    }

    /// Same as [`PodPoller::run`], stopping when `shutdown` resolves.
    ///
    /// A shutdown future that fails (for example a signal handler that could
    /// not be installed) ends the poller with that error.
    pub async fn run_until<S>(&self, shutdown: S) -> Result<u64, Box<dyn std::error::Error>>
    where
        S: Future<Output = std::io::Result<()>>,
    {
        if self.max_iterations == Some(0) {
            debug!("Pod poller asked for zero rounds");
            return Ok(0);
        }

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut rounds = 0u64;
        loop {
            select! {
                _ = ticker.tick() => {
                    let pods = list_pods(&self.api).await?;
                    debug!("Listed {} pods", pods.len());
                    for (index, pod) in pods.iter().enumerate() {
                        info!("{}", format_pod_line(index, pod));
                    }
                    rounds += 1;
                    if self.max_iterations.is_some_and(|max| rounds >= max) {
                        debug!("Pod poller finished after {} rounds", rounds);
                        break;
                    }
                }
                signal = &mut shutdown => {
                    match signal {
                        Ok(()) => {
                            info!("Received shutdown signal, stopping pod poller");
                            break;
                        }
                        Err(e) => {
                            error!("Failed to listen for shutdown signal: {}", e);
                            return Err(format!("Failed to listen for shutdown signal: {}", e).into());
                        }
                    }
                }
            }
        }
        Ok(rounds)
    }
}
