//! # Skiff
//!
//! Skiff talks to a Kubernetes API server with a typed client. It manages one
//! example Deployment and polls the pods of a namespace, either from a
//! workstation through a kubeconfig file or from inside a pod through its
//! service account.
//!
//! ## Modules
//!
//! ### Kubernetes Module
//! ```ignore
//! pub mod k8s;
//! ```
//! - Connection configuration (kubeconfig file or in-cluster)
//! - Deployment create/get/update/delete
//! - Pod listing and the pod poller
//!
//! ### Retry Module
//! ```ignore
//! pub mod retry;
//! ```
//! Re-runs writes rejected with a conflict, under a bounded policy.
//!
//! ### CLI Module
//! ```ignore
//! pub mod cli;
//! ```
//! Command parsing and the command flows.
//!
//! ## Deployment Walkthrough
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Skiff
//!     participant K8s
//!
//!     Skiff->>K8s: Create Deployment (nginx:1.16)
//!     Note over Skiff: pause
//!     Skiff->>K8s: Get Deployment
//!     Skiff->>K8s: Update image (nginx:1.17)
//!     Skiff->>K8s: Resubmit, retrying on conflict
//!     Note over Skiff: pause
//!     Skiff->>K8s: Delete (foreground)
//! ```
//!
//! ## Configuration
//!
//! ```toml
//! [cluster]
//! kubeconfig_path = "/home/me/.kube/config"
//! in_cluster = false
//! namespace = "default"
//!
//! [poller]
//! interval_seconds = 5
//! ```

pub mod cli;
pub mod k8s;
pub mod retry;
