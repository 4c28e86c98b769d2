/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Cluster Connection
//!
//! Builds a [`kube::Client`] from one of two sources:
//!
//! - a kubeconfig file on disk, for running outside the cluster
//!   (`$HOME/.kube/config` unless another path is configured);
//! - the in-cluster environment (service account token, CA bundle and the
//!   `KUBERNETES_SERVICE_HOST`/`KUBERNETES_SERVICE_PORT` variables), for
//!   running inside a pod.

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Client as K8sClient;
use kube::Config;
use skiff_utils::config::Cluster;
use skiff_utils::logging::prelude::*;
use std::fmt;
use std::path::PathBuf;

/// Where connection settings come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionSource {
    /// A kubeconfig file, optionally pinned to one context.
    Kubeconfig {
        path: PathBuf,
        context: Option<String>,
    },
    /// The service account mounted into the running pod.
    InCluster,
}

impl fmt::Display for ConnectionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionSource::Kubeconfig {
                path,
                context: Some(context),
            } => write!(f, "kubeconfig {} (context {})", path.display(), context),
            ConnectionSource::Kubeconfig {
                path,
                context: None,
            } => write!(f, "kubeconfig {}", path.display()),
            ConnectionSource::InCluster => write!(f, "in-cluster service account"),
        }
    }
}

impl ConnectionSource {
    /// Picks the source described by the cluster settings.
    ///
    /// `in_cluster` wins over any kubeconfig path. Without a configured path
    /// the kubeconfig in the user's home directory is used.
    pub fn from_settings(cluster: &Cluster) -> Result<Self, Box<dyn std::error::Error>> {
        if cluster.in_cluster {
            return Ok(ConnectionSource::InCluster);
        }
        let path = match cluster.kubeconfig_path.as_deref() {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => default_kubeconfig_path()?,
        };
        Ok(ConnectionSource::Kubeconfig {
            path,
            context: cluster.context.clone(),
        })
    }
}

/// `<home>/.kube/config` for the current user.
pub fn default_kubeconfig_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let dirs = directories::BaseDirs::new()
        .ok_or("Cannot locate kubeconfig: home directory is unknown")?;
    Ok(dirs.home_dir().join(".kube").join("config"))
}

/// Resolves the client configuration for `source`.
pub async fn load_config(source: &ConnectionSource) -> Result<Config, Box<dyn std::error::Error>> {
    match source {
        ConnectionSource::Kubeconfig { path, context } => {
            let kubeconfig = Kubeconfig::read_from(path)
                .map_err(|e| format!("Failed to read kubeconfig {}: {}", path.display(), e))?;
            let options = KubeConfigOptions {
                context: context.clone(),
                ..Default::default()
            };
            let config = Config::from_custom_kubeconfig(kubeconfig, &options)
                .await
                .map_err(|e| format!("Invalid kubeconfig {}: {}", path.display(), e))?;
            Ok(config)
        }
        ConnectionSource::InCluster => {
            let config = Config::incluster()
                .map_err(|e| format!("Failed to load in-cluster configuration: {}", e))?;
            Ok(config)
        }
    }
}

/// Creates a Kubernetes client whose default namespace is `namespace`.
pub async fn create_k8s_client(
    source: &ConnectionSource,
    namespace: &str,
) -> Result<K8sClient, Box<dyn std::error::Error>> {
    debug!("Loading cluster configuration from {}", source);
    let mut config = load_config(source).await?;
    config.default_namespace = namespace.to_string();
    let cluster_url = config.cluster_url.clone();

    let client = K8sClient::try_from(config)
        .map_err(|e| format!("Failed to create Kubernetes client: {}", e))?;

    info!("Kubernetes client ready for {} ({})", cluster_url, source);
    Ok(client)
}

/// Asks the API server for its version, proving the client can reach it.
pub async fn verify_connectivity(client: &K8sClient) -> Result<String, Box<dyn std::error::Error>> {
    let info = client
        .apiserver_version()
        .await
        .map_err(|e| format!("Failed to connect to Kubernetes cluster: {}", e))?;
    info!(
        "Connected to Kubernetes {} ({})",
        info.git_version, info.platform
    );
    Ok(info.git_version)
}
