//! Helper functions for integration tests

use chrono::{DateTime, Utc};
use cluster_cache::{Cluster, MetricUpdate, MetricValue, Ttl, config::ClusterConfig};

pub fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

pub fn create_test_cluster(host_ttl: Ttl) -> Cluster {
    Cluster::new(&ClusterConfig {
        host_buckets: 16,
        metric_buckets: 4,
        host_ttl,
    })
}

pub fn metric(name: &str, ttl_secs: u64) -> MetricUpdate {
    MetricUpdate::new(name, MetricValue::Float(1.0), Ttl::from_secs(ttl_secs))
}
