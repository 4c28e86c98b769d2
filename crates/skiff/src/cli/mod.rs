pub mod commands;

use clap::{Args, Parser, Subcommand, ValueEnum};
use skiff_utils::config::{Cluster, Poller};

/// Skiff CLI
///
/// Drives a Kubernetes cluster through its API: manages an example Deployment
/// and polls the pods of a namespace, from outside the cluster with a
/// kubeconfig or from inside a pod with its service account.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file layered over the built-in defaults
    #[arg(long, global = true, env = "SKIFF_CONFIG")]
    pub config: Option<String>,

    #[command(flatten)]
    pub cluster: ClusterArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection flags; each one overrides the matching `cluster` setting.
#[derive(Args, Debug, Default)]
pub struct ClusterArgs {
    /// Kubeconfig file (defaults to $HOME/.kube/config)
    #[arg(long, global = true)]
    pub kubeconfig: Option<String>,

    /// Kubeconfig context to use instead of the current one
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// Authenticate with the pod's service account
    #[arg(long, global = true)]
    pub in_cluster: bool,

    /// Namespace to operate in
    #[arg(long, short = 'n', global = true)]
    pub namespace: Option<String>,
}

impl ClusterArgs {
    pub fn apply(&self, cluster: &mut Cluster) {
        if let Some(path) = &self.kubeconfig {
            cluster.kubeconfig_path = Some(path.clone());
        }
        if let Some(context) = &self.context {
            cluster.context = Some(context.clone());
        }
        if self.in_cluster {
            cluster.in_cluster = true;
        }
        if let Some(namespace) = &self.namespace {
            cluster.namespace = namespace.clone();
        }
    }
}

/// Folds the `pods` flags into the poller settings.
pub fn apply_poller_flags(interval: Option<u64>, iterations: Option<u64>, poller: &mut Poller) {
    if let Some(seconds) = interval {
        poller.interval_seconds = seconds;
    }
    if iterations.is_some() {
        poller.max_iterations = iterations;
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage the example Deployment
    Deployment(DeploymentCommands),

    /// List pods periodically
    Pods {
        /// Seconds between listings
        #[arg(long)]
        interval: Option<u64>,
        /// Stop after this many listings
        #[arg(long)]
        iterations: Option<u64>,
    },

    /// Connect and print the API server version
    Check,
}

#[derive(Args)]
pub struct DeploymentCommands {
    #[command(subcommand)]
    pub command: DeploymentSubcommands,
}

#[derive(Subcommand)]
pub enum DeploymentSubcommands {
    /// Create, update, then delete the Deployment, pausing between steps
    Run {
        /// Seconds to wait between steps
        #[arg(long)]
        pause: Option<u64>,
    },

    /// Create the Deployment
    Create,

    /// Change the image of the Deployment's first container
    Update {
        /// New image (defaults to deployment.updated_image)
        #[arg(long)]
        image: Option<String>,
    },

    /// Delete the Deployment and, first, its pods
    Delete,

    /// Show the Deployment
    Get {
        #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Summary)]
        output: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Summary,
    Yaml,
    Json,
}

/// Parses command-line arguments into the Cli structure.
pub fn parse_cli() -> Cli {
    Cli::parse()
}
