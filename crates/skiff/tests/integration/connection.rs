use crate::fixtures::{FakeCluster, GIT_VERSION};
use clap::Parser;
use skiff::cli::{commands, Cli};
use skiff::k8s::connection::verify_connectivity;

#[tokio::test]
async fn test_verify_connectivity_returns_server_version() {
    let cluster = FakeCluster::new();

    let version = verify_connectivity(&cluster.client())
        .await
        .expect("Failed to reach fake API server");

    assert_eq!(version, GIT_VERSION);
    assert_eq!(cluster.request_lines(), vec!["GET /version"]);
}

#[tokio::test]
async fn test_verify_connectivity_reports_unreachable_server() {
    let cluster = FakeCluster::new();
    cluster.fail_version();

    let err = verify_connectivity(&cluster.client())
        .await
        .expect_err("an unavailable API server should fail the check");

    assert!(err
        .to_string()
        .starts_with("Failed to connect to Kubernetes cluster:"));
}

#[tokio::test]
async fn test_run_fails_on_missing_kubeconfig() {
    let dir = tempfile::tempdir().unwrap();
    let kubeconfig = dir.path().join("absent").join("config");
    let cli = Cli::try_parse_from([
        "skiff",
        "--kubeconfig",
        kubeconfig.to_str().unwrap(),
        "check",
    ])
    .unwrap();

    let err = commands::run(cli)
        .await
        .expect_err("check without a kubeconfig should fail");

    assert!(
        err.to_string().starts_with("Failed to read kubeconfig"),
        "unexpected error: {}",
        err
    );
}
