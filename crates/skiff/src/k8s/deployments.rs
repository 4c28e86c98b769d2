/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Deployment Operations
//!
//! Create, read, update and delete for a single `apps/v1` Deployment in one
//! namespace. The object's shape comes from a [`DeploymentTemplate`]: one
//! container, one TCP port, and an `app` label shared by the selector and
//! the pod template.

use crate::retry::{retry_on_conflict, RetryPolicy};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{Container, ContainerPort, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use kube::api::{DeleteParams, PostParams};
use kube::{Api, ResourceExt};
use skiff_utils::logging::prelude::*;
use std::collections::BTreeMap;
use std::fmt;

/// Label key shared by the selector and the pod template.
pub const APP_LABEL_KEY: &str = "app";

/// Everything needed to build the managed Deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTemplate {
    pub name: String,
    pub replicas: i32,
    pub app_label: String,
    pub container_name: String,
    pub image: String,
    pub container_port: i32,
    pub port_name: String,
}

impl From<&skiff_utils::config::Deployment> for DeploymentTemplate {
    fn from(settings: &skiff_utils::config::Deployment) -> Self {
        Self {
            name: settings.name.clone(),
            replicas: settings.replicas,
            app_label: settings.app_label.clone(),
            container_name: settings.container_name.clone(),
            image: settings.image.clone(),
            container_port: settings.container_port,
            port_name: settings.port_name.clone(),
        }
    }
}

/// Builds the Deployment object described by `template`.
pub fn build_deployment(template: &DeploymentTemplate) -> Deployment {
    let labels = BTreeMap::from([(APP_LABEL_KEY.to_string(), template.app_label.clone())]);

    Deployment {
        metadata: ObjectMeta {
            name: Some(template.name.clone()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(template.replicas),
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                // must match the selector above
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: template.container_name.clone(),
                        image: Some(template.image.clone()),
                        ports: Some(vec![ContainerPort {
                            container_port: template.container_port,
                            name: Some(template.port_name.clone()),
                            protocol: Some("TCP".to_string()),
                            ..Default::default()
                        }]),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Sets the image of the first container.
pub fn set_container_image(
    deployment: &mut Deployment,
    image: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let name = deployment.name_any();
    let container = deployment
        .spec
        .as_mut()
        .and_then(|spec| spec.template.spec.as_mut())
        .and_then(|pod| pod.containers.first_mut())
        .ok_or_else(|| format!("Deployment '{}' has no containers", name))?;
    container.image = Some(image.to_string());
    Ok(())
}

/// Creates the Deployment described by `template`.
pub async fn create_deployment(
    api: &Api<Deployment>,
    template: &DeploymentTemplate,
) -> Result<Deployment, Box<dyn std::error::Error>> {
    let deployment = build_deployment(template);
    debug!(
        "Creating deployment '{}' with image {}",
        template.name, template.image
    );
    let created = api.create(&PostParams::default(), &deployment).await?;
    info!("Created deployment '{}'", created.name_any());
    Ok(created)
}

/// Fetches a Deployment by name.
pub async fn get_deployment(
    api: &Api<Deployment>,
    name: &str,
) -> Result<Deployment, Box<dyn std::error::Error>> {
    Ok(api.get(name).await?)
}

/// Moves the first container of `name` to `image`.
///
/// The change is written once with a plain update. The object the server
/// returned is then written again under `policy`, resubmitting that last
/// known copy on conflict rather than fetching a fresh one.
pub async fn update_deployment(
    api: &Api<Deployment>,
    name: &str,
    image: &str,
    policy: &RetryPolicy,
) -> Result<Deployment, Box<dyn std::error::Error>> {
    let mut current = api.get(name).await?;
    set_container_image(&mut current, image)?;

    let params = PostParams::default();
    let updated = api.replace(name, &params, &current).await?;
    debug!(
        "Deployment '{}' updated to image {} (resourceVersion {:?})",
        name,
        image,
        updated.resource_version()
    );

    let confirmed = retry_on_conflict(policy, || api.replace(name, &params, &updated)).await?;
    info!("Updated deployment '{}' to image {}", name, image);
    Ok(confirmed)
}

/// Deletes `name`, removing its ReplicaSets and pods before the Deployment.
pub async fn delete_deployment(
    api: &Api<Deployment>,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    api.delete(name, &DeleteParams::foreground()).await?;
    info!("Deleted deployment '{}'", name);
    Ok(())
}

/// A short view of a Deployment for log lines and the `get` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentSummary {
    pub name: String,
    pub namespace: Option<String>,
    pub replicas: i32,
    pub ready_replicas: i32,
    pub image: Option<String>,
}

impl fmt::Display for DeploymentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ready={}/{} image={}",
            self.namespace.as_deref().unwrap_or("-"),
            self.name,
            self.ready_replicas,
            self.replicas,
            self.image.as_deref().unwrap_or("<none>")
        )
    }
}

pub fn summarize_deployment(deployment: &Deployment) -> DeploymentSummary {
    let spec = deployment.spec.as_ref();
    DeploymentSummary {
        name: deployment.name_any(),
        namespace: deployment.namespace(),
        replicas: spec.and_then(|s| s.replicas).unwrap_or(1),
        ready_replicas: deployment
            .status
            .as_ref()
            .and_then(|s| s.ready_replicas)
            .unwrap_or(0),
        image: spec
            .and_then(|s| s.template.spec.as_ref())
            .and_then(|pod| pod.containers.first())
            .and_then(|c| c.image.clone()),
    }
}
