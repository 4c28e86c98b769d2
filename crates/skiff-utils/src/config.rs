/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Skiff Config Module
//!
//! Layered settings for the Skiff binaries.
//!
//! Values are loaded and overridden in this order (later sources win):
//!
//! 1. Defaults from the embedded `default.toml`
//! 2. An optional external TOML file (`--config <file>`)
//! 3. Environment variables prefixed with `SKIFF__`, using `__` between
//!    section and key
//!
//! # Environment Variables
//!
//! - `SKIFF__LOG__LEVEL`: "trace", "debug", "info", "warn", "error" (default "info")
//! - `SKIFF__LOG__FORMAT`: "text" or "json" (default "text")
//! - `SKIFF__CLUSTER__KUBECONFIG_PATH`: kubeconfig file (default `$HOME/.kube/config`)
//! - `SKIFF__CLUSTER__CONTEXT`: kubeconfig context to use instead of the current one
//! - `SKIFF__CLUSTER__IN_CLUSTER`: use the pod's service account (default false)
//! - `SKIFF__CLUSTER__NAMESPACE`: namespace for every call (default "default")
//! - `SKIFF__DEPLOYMENT__IMAGE` / `SKIFF__DEPLOYMENT__UPDATED_IMAGE`: images
//!   used by create and update
//! - `SKIFF__DEPLOYMENT__STEP_PAUSE_SECONDS`: pause between create, update and
//!   delete in the deployment walkthrough (default 60)
//! - `SKIFF__POLLER__INTERVAL_SECONDS`: pod listing period (default 5)
//! - `SKIFF__POLLER__MAX_ITERATIONS`: stop polling after this many rounds
//! - `SKIFF__RETRY__STEPS`: attempts allowed for a conflicting update (default 5)

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

const DEFAULT_SETTINGS: &str = include_str!("../default.toml");

/// Top-level settings.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub log: Log,
    pub cluster: Cluster,
    pub deployment: Deployment,
    pub poller: Poller,
    pub retry: Retry,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Log {
    /// Log level (e.g., "info", "debug", "warn", "error")
    pub level: String,
    /// "text" for human-readable, "json" for structured JSON
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_format() -> String {
    "text".to_string()
}

/// How to reach the cluster.
#[derive(Debug, Deserialize, Clone)]
pub struct Cluster {
    /// Kubeconfig file; `$HOME/.kube/config` when unset
    pub kubeconfig_path: Option<String>,
    /// Context inside the kubeconfig
    pub context: Option<String>,
    /// Use the in-cluster service account instead of a kubeconfig
    #[serde(default)]
    pub in_cluster: bool,
    pub namespace: String,
}

/// Shape of the managed Deployment.
#[derive(Debug, Deserialize, Clone)]
pub struct Deployment {
    pub name: String,
    pub replicas: i32,
    /// Value of the `app` label shared by selector and pod template
    pub app_label: String,
    pub container_name: String,
    pub image: String,
    /// Image written by the update step
    pub updated_image: String,
    pub container_port: i32,
    pub port_name: String,
    /// Pause between steps of the deployment walkthrough, in seconds
    pub step_pause_seconds: u64,
}

/// Pod polling loop.
#[derive(Debug, Deserialize, Clone)]
pub struct Poller {
    pub interval_seconds: u64,
    pub max_iterations: Option<u64>,
}

/// Retry policy for conflicting writes.
#[derive(Debug, Deserialize, Clone)]
pub struct Retry {
    /// Total attempts, including the first
    pub steps: u32,
    pub initial_interval_ms: u64,
    /// Multiplier applied to the interval after each attempt
    pub factor: f64,
    /// Randomization factor, 0.0 to 1.0
    pub jitter: f64,
}

impl Settings {
    /// Loads settings from the embedded defaults, an optional file and the
    /// `SKIFF__` environment.
    pub fn new(file: Option<String>) -> Result<Self, ConfigError> {
        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_SETTINGS, FileFormat::Toml));

        if let Some(path) = file {
            builder = builder.add_source(File::with_name(&path));
        }

        builder
            .add_source(Environment::with_prefix("SKIFF").separator("__"))
            .build()?
            .try_deserialize()
    }
}
