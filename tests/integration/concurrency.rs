//! Concurrency and race condition tests
//!
//! These tests verify thread-safety while the sweeper runs:
//! - Producers refreshing hosts during sweep passes
//! - Readers exporting snapshots during sweep passes
//! - Removed hosts never reachable again

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use chrono::{TimeDelta, Utc};
use cluster_cache::{Cluster, MetricScope, Ttl, sweep_cluster};

use crate::helpers::*;

#[test]
fn test_refreshing_producer_keeps_host_alive_during_sweeps() {
    let cluster = create_test_cluster(Ttl::Immortal);
    cluster.refresh_host("busy", Ttl::from_secs(1), Utc::now()).unwrap();
    let running = AtomicBool::new(true);

    thread::scope(|scope| {
        scope.spawn(|| {
            while running.load(Ordering::Relaxed) {
                cluster.refresh_host("busy", Ttl::from_secs(1), Utc::now()).unwrap();
            }
        });

        for _ in 0..200 {
            sweep_cluster(&cluster, Utc::now());
            assert!(cluster.contains_host("busy"));
        }

        running.store(false, Ordering::Relaxed);
    });

    // once the producer is gone the host ages out and stays gone
    let report = sweep_cluster(&cluster, Utc::now() + TimeDelta::seconds(5));
    assert_eq!(report.hosts_removed, 1);
    assert!(!cluster.contains_host("busy"));
    assert!(cluster.host_envelope("busy").is_none());
}

#[test]
fn test_concurrent_producers_and_sweeps_no_race() {
    let cluster = Arc::new(create_test_cluster(Ttl::from_secs(60)));
    let stale = Utc::now() - TimeDelta::seconds(600);

    for i in 0..100 {
        cluster
            .record_metric(&format!("stale-{i}"), metric("load_one", 0), stale)
            .unwrap();
    }

    thread::scope(|scope| {
        for producer in 0..4 {
            let cluster = cluster.clone();
            scope.spawn(move || {
                for round in 0..50 {
                    for host in 0..10 {
                        let name = format!("live-{producer}-{host}");
                        let update = metric(&format!("metric-{}", round % 5), 60);
                        cluster.record_metric(&name, update, Utc::now()).unwrap();
                    }
                }
            });
        }

        let sweeper = cluster.clone();
        scope.spawn(move || {
            for _ in 0..20 {
                sweep_cluster(&sweeper, Utc::now());
            }
        });
    });

    sweep_cluster(&cluster, Utc::now());

    assert_eq!(cluster.host_count(), 40);
    assert_eq!(cluster.metric_count(), 40 * 5);
    assert!(!cluster.contains_host("stale-0"));
}

#[test]
fn test_snapshots_during_sweeps_only_see_whole_hosts() {
    let cluster: Arc<Cluster> = Arc::new(create_test_cluster(Ttl::from_secs(30)));
    let base = Utc::now();

    for i in 0..64 {
        let name = format!("host-{i}");
        cluster.record_metric(&name, metric("load_one", 0), base).unwrap();
        cluster.record_metric(&name, metric("custom", 0), base).unwrap();
    }

    thread::scope(|scope| {
        for _ in 0..3 {
            let cluster = cluster.clone();
            scope.spawn(move || {
                for _ in 0..50 {
                    let snapshot = cluster.snapshot(base);
                    for host in &snapshot.hosts {
                        // a reachable host always has both of its metric stores intact
                        assert_eq!(host.builtin.len(), 1);
                        assert_eq!(host.user.len(), 1);
                    }
                }
            });
        }

        let cluster = cluster.clone();
        scope.spawn(move || {
            sweep_cluster(&cluster, base + TimeDelta::seconds(31));
        });
    });

    assert_eq!(cluster.host_count(), 0);
    assert!(
        cluster
            .lookup_metric("host-0", MetricScope::User, "custom")
            .is_none()
    );
}
