//! Sweeper actor tests
//!
//! These tests run the actor on a Tokio runtime next to async producers.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use cluster_cache::{
    Ttl,
    actors::sweeper::SweeperHandle,
    config::SweepConfig,
};

use crate::helpers::*;

#[tokio::test]
async fn test_handles_share_one_sweeper() {
    let cluster = Arc::new(create_test_cluster(Ttl::Immortal));
    let handle = SweeperHandle::spawn(cluster.clone(), &SweepConfig { interval: 3600 });

    let mut tasks = vec![];
    for _ in 0..5 {
        let handle = handle.clone();
        tasks.push(tokio::spawn(async move { handle.sweep_now().await }));
    }

    for result in futures::future::join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let stats = handle.get_stats().await.unwrap();
    assert_eq!(stats.passes, 5);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_producers_and_sweeper_interleave() {
    let cluster = Arc::new(create_test_cluster(Ttl::from_secs(60)));
    let stale = Utc::now() - TimeDelta::seconds(3600);
    cluster.refresh_host("gone", Ttl::from_secs(60), stale).unwrap();

    let handle = SweeperHandle::spawn(cluster.clone(), &SweepConfig { interval: 3600 });

    let producer = {
        let cluster = cluster.clone();
        tokio::spawn(async move {
            for i in 0..20 {
                cluster
                    .record_metric("alive", metric(&format!("m{i}"), 60), Utc::now())
                    .unwrap();
                tokio::task::yield_now().await;
            }
        })
    };

    let report = handle.sweep_now().await.unwrap();
    producer.await.unwrap();

    assert_eq!(report.hosts_removed, 1);
    assert!(!cluster.contains_host("gone"));
    assert!(cluster.contains_host("alive"));
    assert_eq!(cluster.metric_count(), 20);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_dropping_every_handle_stops_the_actor() {
    let cluster = Arc::new(create_test_cluster(Ttl::Immortal));
    let handle = SweeperHandle::spawn(cluster.clone(), &SweepConfig { interval: 3600 });
    handle.sweep_now().await.unwrap();

    drop(handle);
    tokio::time::sleep(Duration::from_millis(50)).await;

    // the actor held the only other reference to the cluster
    assert_eq!(Arc::strong_count(&cluster), 1);
}
