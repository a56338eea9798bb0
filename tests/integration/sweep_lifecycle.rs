//! End-to-end expiry behavior of hosts and metrics
//!
//! These tests drive the cluster through the public API only:
//! - Host and metric expiry thresholds
//! - Cascade removal of a host's metric stores
//! - Metric expiry independent of the owning host
//! - Bounded size over repeated insert/sweep cycles

use cluster_cache::{MetricScope, Ttl, sweep_cluster};
use pretty_assertions::assert_eq;

use crate::helpers::*;

#[test]
fn test_host_expiry_example() {
    let cluster = create_test_cluster(Ttl::Immortal);
    cluster.refresh_host("h1", Ttl::from_secs(300), at(1000)).unwrap();

    sweep_cluster(&cluster, at(1300));
    assert!(cluster.contains_host("h1"), "alive at exactly ttl");

    let report = sweep_cluster(&cluster, at(1301));
    assert_eq!(report.hosts_removed, 1);
    assert!(!cluster.contains_host("h1"));
}

#[test]
fn test_immortal_entries_survive_any_age() {
    let cluster = create_test_cluster(Ttl::Immortal);
    cluster.record_metric("h1", metric("boottime", 0), at(0)).unwrap();

    for secs in [1, 3_600, 86_400 * 365, i32::MAX as i64] {
        let report = sweep_cluster(&cluster, at(secs));
        assert!(!report.removed_anything());
    }

    assert!(
        cluster
            .lookup_metric("h1", MetricScope::Builtin, "boottime")
            .is_some()
    );
}

#[test]
fn test_cascade_removes_all_metrics_of_expired_host() {
    let cluster = create_test_cluster(Ttl::from_secs(60));
    cluster.record_metric("h1", metric("load_one", 0), at(0)).unwrap();
    cluster.record_metric("h1", metric("queue_depth", 0), at(0)).unwrap();
    cluster.record_metric("h2", metric("load_one", 0), at(50)).unwrap();

    let report = sweep_cluster(&cluster, at(100));

    assert_eq!(report.hosts_removed, 1);
    assert_eq!(report.metrics_disposed, 2);
    assert!(
        cluster
            .lookup_metric("h1", MetricScope::Builtin, "load_one")
            .is_none()
    );
    assert!(
        cluster
            .lookup_metric("h1", MetricScope::User, "queue_depth")
            .is_none()
    );
    assert!(cluster.snapshot(at(100)).host("h1").is_none());
    assert_eq!(cluster.metric_count(), 1);
}

#[test]
fn test_metric_expires_while_immortal_host_persists() {
    let cluster = create_test_cluster(Ttl::Immortal);
    cluster.record_metric("h1", metric("custom", 60), at(0)).unwrap();

    sweep_cluster(&cluster, at(60));
    assert!(cluster.lookup_metric("h1", MetricScope::User, "custom").is_some());

    let report = sweep_cluster(&cluster, at(61));
    assert_eq!(report.metrics_removed, 1);
    assert!(cluster.lookup_metric("h1", MetricScope::User, "custom").is_none());
    assert!(cluster.contains_host("h1"));
}

#[test]
fn test_refreshed_metric_is_kept() {
    let cluster = create_test_cluster(Ttl::Immortal);
    cluster.record_metric("h1", metric("cpu_user", 30), at(0)).unwrap();
    cluster.record_metric("h1", metric("cpu_user", 30), at(25)).unwrap();

    let report = sweep_cluster(&cluster, at(50));

    assert_eq!(report.metrics_removed, 0);
    assert_eq!(cluster.metric_count(), 1);
}

#[test]
fn test_repeated_cycles_stay_bounded() {
    let cluster = create_test_cluster(Ttl::from_secs(10));

    for round in 0..50i64 {
        let now = at(round * 20);
        for host in 0..8 {
            let name = format!("round-{round}-host-{host}");
            cluster.record_metric(&name, metric("load_one", 5), now).unwrap();
        }

        sweep_cluster(&cluster, now);

        // only the hosts written this round are still alive
        assert_eq!(cluster.host_count(), 8);
        assert_eq!(cluster.metric_count(), 8);
    }
}
