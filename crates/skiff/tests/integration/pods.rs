use crate::fixtures::{FakeCluster, NAMESPACE};
use k8s_openapi::api::core::v1::Pod;
use kube::Api;
use skiff::cli::commands::poll_pods;
use skiff::k8s::pods::{format_pod_line, list_pods, PodPoller};
use skiff_utils::config;
use std::time::Duration;

const PODS: &str = "GET /api/v1/namespaces/default/pods";

fn setup() -> (FakeCluster, Api<Pod>) {
    let cluster = FakeCluster::new();
    let api = Api::namespaced(cluster.client(), NAMESPACE);
    (cluster, api)
}

#[tokio::test]
async fn test_list_pods() {
    let (cluster, api) = setup();
    cluster.add_pod("nginx-deployment-7d9f-abcde");
    cluster.add_pod("nginx-deployment-7d9f-fghij");

    let pods = list_pods(&api).await.expect("Failed to list pods");
    let lines: Vec<_> = pods
        .iter()
        .enumerate()
        .map(|(index, pod)| format_pod_line(index, pod))
        .collect();

    assert_eq!(
        lines,
        vec![
            "1: default -> nginx-deployment-7d9f-abcde",
            "2: default -> nginx-deployment-7d9f-fghij",
        ]
    );
}

#[tokio::test]
async fn test_list_pods_in_empty_namespace() {
    let (_cluster, api) = setup();
    assert!(list_pods(&api).await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_poller_runs_requested_rounds() {
    let (cluster, api) = setup();
    cluster.add_pod("web-0");

    let poller = PodPoller::new(api, Duration::from_secs(5), Some(3)).unwrap();
    let started = tokio::time::Instant::now();
    let rounds = poller.run().await.expect("poller failed");

    assert_eq!(rounds, 3);
    assert_eq!(cluster.request_lines(), vec![PODS; 3]);
    // first round is immediate, then one interval between each
    assert!(started.elapsed() >= Duration::from_secs(10));
    assert!(started.elapsed() < Duration::from_secs(15));
}

#[tokio::test(start_paused = true)]
async fn test_poller_stops_on_first_error() {
    let (cluster, api) = setup();
    cluster.fail_pod_lists_from(3);

    let poller = PodPoller::new(api, Duration::from_secs(5), None).unwrap();
    let err = poller
        .run()
        .await
        .expect_err("poller should stop when listing fails");

    assert!(err.to_string().contains("etcd is unavailable"));
    assert_eq!(cluster.request_lines().len(), 3);
}

#[tokio::test]
async fn test_poller_rejects_zero_interval() {
    let (_cluster, api) = setup();
    assert!(PodPoller::new(api, Duration::ZERO, Some(1)).is_err());
}

#[tokio::test(start_paused = true)]
async fn test_poll_pods_uses_settings() {
    let (cluster, api) = setup();
    let settings = config::Poller {
        interval_seconds: 1,
        max_iterations: Some(2),
    };

    let rounds = poll_pods(api, &settings).await.unwrap();
    assert_eq!(rounds, 2);
    assert_eq!(cluster.request_lines().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_poller_with_zero_iterations_lists_nothing() {
    let (cluster, api) = setup();
    cluster.add_pod("web-0");

    let poller = PodPoller::new(api, Duration::from_secs(5), Some(0)).unwrap();
    let rounds = poller.run().await.expect("poller failed");

    assert_eq!(rounds, 0);
    assert!(cluster.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_poller_stops_on_shutdown() {
    let (cluster, api) = setup();

    let poller = PodPoller::new(api, Duration::from_secs(5), None).unwrap();
    let shutdown = async {
        tokio::time::sleep(Duration::from_secs(7)).await;
        Ok::<(), std::io::Error>(())
    };
    let rounds = poller.run_until(shutdown).await.expect("poller failed");

    // listings at 0s and 5s, shutdown at 7s
    assert_eq!(rounds, 2);
    assert_eq!(cluster.request_lines(), vec![PODS; 2]);
}

#[tokio::test(start_paused = true)]
async fn test_poller_fails_when_shutdown_listener_fails() {
    let (_cluster, api) = setup();

    let poller = PodPoller::new(api, Duration::from_secs(5), None).unwrap();
    let shutdown = async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        Err::<(), _>(std::io::Error::other("signal handler unavailable"))
    };
    let err = poller
        .run_until(shutdown)
        .await
        .expect_err("a failed shutdown listener should end the poller");

    assert!(err
        .to_string()
        .contains("Failed to listen for shutdown signal: signal handler unavailable"));
}
