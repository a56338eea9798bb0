//! Read-side export of the cluster contents

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::envelope::{Envelope, Ttl};
use crate::store::{Cursor, Visit};

use super::host::MetricStore;
use super::metric::{Metric, MetricValue};

/// Point-in-time view of every host and metric, ready to be serialized
///
/// Walks are weakly consistent: entries inserted while the snapshot is being
/// taken may or may not be included.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterSnapshot {
    pub taken_at: DateTime<Utc>,
    pub hosts: Vec<HostSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HostSnapshot {
    pub name: String,
    pub last_refresh: DateTime<Utc>,
    pub age_secs: i64,
    pub ttl: Ttl,
    pub builtin: Vec<MetricSnapshot>,
    pub user: Vec<MetricSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricSnapshot {
    pub name: String,
    pub value: MetricValue,
    pub units: String,
    pub last_refresh: DateTime<Utc>,
    pub age_secs: i64,
    pub ttl: Ttl,
}

impl ClusterSnapshot {
    pub fn host(&self, name: &str) -> Option<&HostSnapshot> {
        self.hosts.iter().find(|host| host.name == name)
    }

    pub fn metric_count(&self) -> usize {
        self.hosts
            .iter()
            .map(|host| host.builtin.len() + host.user.len())
            .sum()
    }
}

impl HostSnapshot {
    pub(super) fn capture<T>(name: &str, record: &Envelope<T>, now: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            last_refresh: record.last_refresh,
            age_secs: record.age(now).num_seconds(),
            ttl: record.ttl,
            builtin: Vec::new(),
            user: Vec::new(),
        }
    }
}

pub(super) fn capture_metrics(store: &MetricStore, now: DateTime<Utc>) -> Vec<MetricSnapshot> {
    let mut metrics = Vec::with_capacity(store.len());

    store.walk_from(Cursor::START, |name, record: &Envelope<Metric>| {
        metrics.push(MetricSnapshot {
            name: name.clone(),
            value: record.payload.value.clone(),
            units: record.payload.units.clone(),
            last_refresh: record.last_refresh,
            age_secs: record.age(now).num_seconds(),
            ttl: record.ttl,
        });
        Visit::Continue
    });

    metrics.sort_by(|a, b| a.name.cmp(&b.name));
    metrics
}
