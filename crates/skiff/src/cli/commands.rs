/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # CLI Commands Module
//!
//! Every command follows the same sequence:
//!
//! ```mermaid
//! flowchart TD
//!     A[Load Settings] --> B[Apply CLI Flags]
//!     B --> C[Init Logger]
//!     C --> D[Resolve Connection Source]
//!     D --> E[Create Kubernetes Client]
//!     E --> F{Command}
//!     F --> G[Deployment Steps]
//!     F --> H[Pod Poller]
//!     F --> I[Version Check]
//! ```
//!
//! Errors are not handled here. The first failing API call ends the command
//! and its error is returned to `main`.

use crate::cli::{apply_poller_flags, Cli, Commands, DeploymentSubcommands, OutputFormat};
use crate::k8s::connection::{create_k8s_client, verify_connectivity, ConnectionSource};
use crate::k8s::deployments::{
    create_deployment, delete_deployment, get_deployment, summarize_deployment,
    update_deployment, DeploymentTemplate,
};
use crate::k8s::pods::PodPoller;
use crate::retry::RetryPolicy;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Pod;
use kube::Api;
use skiff_utils::config::{self, Settings};
use skiff_utils::logging::{self, prelude::*};
use tokio::time::{sleep, Duration};

/// Runs the parsed command line to completion.
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = Settings::new(cli.config.clone())?;
    cli.cluster.apply(&mut settings.cluster);
    if let Commands::Pods {
        interval,
        iterations,
    } = &cli.command
    {
        apply_poller_flags(*interval, *iterations, &mut settings.poller);
    }
    logging::init_with_format(&settings.log.level, &settings.log.format)?;

    let source = ConnectionSource::from_settings(&settings.cluster)?;
    let client = create_k8s_client(&source, &settings.cluster.namespace).await?;
    let namespace = settings.cluster.namespace.as_str();
    let policy = RetryPolicy::from(&settings.retry);

    match cli.command {
        Commands::Deployment(deployment) => {
            let api: Api<Deployment> = Api::namespaced(client, namespace);
            match deployment.command {
                DeploymentSubcommands::Run { pause } => {
                    let pause = Duration::from_secs(
                        pause.unwrap_or(settings.deployment.step_pause_seconds),
                    );
                    handle_deployment(&api, &settings.deployment, &policy, pause).await?;
                }
                DeploymentSubcommands::Create => {
                    let template = DeploymentTemplate::from(&settings.deployment);
                    let created = create_deployment(&api, &template).await?;
                    println!("{}", summarize_deployment(&created));
                }
                DeploymentSubcommands::Update { image } => {
                    let image = image.unwrap_or_else(|| settings.deployment.updated_image.clone());
                    let updated =
                        update_deployment(&api, &settings.deployment.name, &image, &policy).await?;
                    println!("{}", summarize_deployment(&updated));
                }
                DeploymentSubcommands::Delete => {
                    delete_deployment(&api, &settings.deployment.name).await?;
                    println!("deployment '{}' deleted", settings.deployment.name);
                }
                DeploymentSubcommands::Get { output } => {
                    let current = get_deployment(&api, &settings.deployment.name).await?;
                    println!("{}", render_deployment(&current, output)?);
                }
            }
        }
        Commands::Pods { .. } => {
            let api: Api<Pod> = Api::namespaced(client, namespace);
            poll_pods(api, &settings.poller).await?;
        }
        Commands::Check => {
            let version = verify_connectivity(&client).await?;
            println!("{}", version);
        }
    }

    Ok(())
}

/// Creates the Deployment, waits, moves it to the updated image, waits, and
/// deletes it.
pub async fn handle_deployment(
    api: &Api<Deployment>,
    settings: &config::Deployment,
    policy: &RetryPolicy,
    pause: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("start handle deployments...");

    let template = DeploymentTemplate::from(settings);
    create_deployment(api, &template).await?;
    info!("create deployment success");

    sleep(pause).await;

    update_deployment(api, &settings.name, &settings.updated_image, policy).await?;
    info!("update deployment success");

    sleep(pause).await;

    delete_deployment(api, &settings.name).await?;
    info!("delete deployment success");

    Ok(())
}

/// Runs the pod poller with the configured period and round limit.
pub async fn poll_pods(
    api: Api<Pod>,
    poller: &config::Poller,
) -> Result<u64, Box<dyn std::error::Error>> {
    info!(
        "Polling pods every {}s{}",
        poller.interval_seconds,
        poller
            .max_iterations
            .map(|n| format!(" for {} rounds", n))
            .unwrap_or_default()
    );
    PodPoller::new(
        api,
        Duration::from_secs(poller.interval_seconds),
        poller.max_iterations,
    )?
    .run()
    .await
}

/// Formats a Deployment for the `get` command.
pub fn render_deployment(
    deployment: &Deployment,
    output: OutputFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match output {
        OutputFormat::Summary => summarize_deployment(deployment).to_string(),
        OutputFormat::Yaml => serde_yaml::to_string(deployment)?,
        OutputFormat::Json => serde_json::to_string_pretty(deployment)?,
    })
}
