//! Kubernetes API access: building a client, managing the Deployment, and
//! polling pods.

pub mod connection;
pub mod deployments;
pub mod pods;
