//! Three-level cluster store: hosts by name, metrics by name per host
//!
//! ```text
//! Cluster ── KeyedStore<host, HostRecord>
//!                 │
//!                 ├── builtin: KeyedStore<metric, MetricRecord>
//!                 └── user:    KeyedStore<metric, MetricRecord>
//! ```
//!
//! A [`Cluster`] is created once and shared as `Arc<Cluster>` between the
//! producers that feed it, the readers that export it and the sweeper that ages
//! it out. Only the sweeper removes entries.

pub mod host;
pub mod metric;
pub mod snapshot;

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::config::ClusterConfig;
use crate::envelope::{Envelope, Ttl};
use crate::store::{Cursor, KeyedStore, StoreError, StoreResult, Visit};

pub use host::{Host, HostRecord, MetricStore};
pub use metric::{Metric, MetricRecord, MetricScope, MetricUpdate, MetricValue};
pub use snapshot::{ClusterSnapshot, HostSnapshot, MetricSnapshot};

#[derive(Debug)]
pub struct Cluster {
    hosts: KeyedStore<String, HostRecord>,
    metric_buckets: usize,
    host_ttl: Ttl,
}

impl Cluster {
    pub fn new(config: &ClusterConfig) -> Self {
        trace!(
            "creating cluster store ({} host buckets, {} metric buckets, host ttl {})",
            config.host_buckets, config.metric_buckets, config.host_ttl
        );

        Self {
            hosts: KeyedStore::new(config.host_buckets),
            metric_buckets: config.metric_buckets,
            host_ttl: config.host_ttl,
        }
    }

    /// The top-level store, keyed by host name
    pub fn hosts(&self) -> &KeyedStore<String, HostRecord> {
        &self.hosts
    }

    /// Ttl given to hosts that are created implicitly by a metric update
    pub fn default_host_ttl(&self) -> Ttl {
        self.host_ttl
    }

    fn new_host(&self, ttl: Ttl, now: DateTime<Utc>) -> HostRecord {
        Envelope::new(Host::new(self.metric_buckets), ttl, now)
    }

    /// Create `host` or refresh its timestamp and ttl, keeping its metrics
    pub fn refresh_host(&self, host: &str, ttl: Ttl, now: DateTime<Utc>) -> StoreResult<()> {
        self.hosts.upsert_with(
            host.to_string(),
            || self.new_host(ttl, now),
            |record| record.refresh(ttl, now),
        )
    }

    /// Mark `host` as alive at `now`, creating it with the default ttl
    pub fn heartbeat(&self, host: &str, now: DateTime<Utc>) -> StoreResult<()> {
        self.hosts.upsert_with(
            host.to_string(),
            || self.new_host(self.host_ttl, now),
            |record| record.touch(now),
        )
    }

    /// Store a measurement for `host`
    ///
    /// Every update counts as a sign of life from the host, so the host's
    /// timestamp is refreshed as well. Unknown hosts are created with the
    /// default host ttl.
    pub fn record_metric(
        &self,
        host: &str,
        update: MetricUpdate,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        let scope = update.scope();
        let MetricUpdate {
            name,
            value,
            units,
            ttl,
            ..
        } = update;
        if name.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        let record = Envelope::new(Metric { value, units }, ttl, now);

        self.hosts.upsert_with(
            host.to_string(),
            || self.new_host(self.host_ttl, now),
            |entry| {
                entry.touch(now);
                entry.payload
                    .metrics(scope)
                    .insert_or_refresh(name, record)
                    .map(drop)
            },
        )?
    }

    pub fn contains_host(&self, host: &str) -> bool {
        self.hosts.contains_key(host)
    }

    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    /// Refresh bookkeeping of `host`, without its metrics
    pub fn host_envelope(&self, host: &str) -> Option<Envelope<()>> {
        self.hosts.with(host, |record| Envelope {
            last_refresh: record.last_refresh,
            ttl: record.ttl,
            payload: (),
        })
    }

    /// Total number of metrics across every host
    pub fn metric_count(&self) -> usize {
        let mut total = 0;
        self.hosts.walk_from(Cursor::START, |_, record| {
            total += record.payload.metric_count();
            Visit::Continue
        });
        total
    }

    pub fn lookup_metric(&self, host: &str, scope: MetricScope, name: &str) -> Option<MetricRecord> {
        self.hosts
            .with(host, |record| record.payload.metrics(scope).lookup(name))
            .flatten()
    }

    /// Export every host and metric as of `now`, sorted by name
    pub fn snapshot(&self, now: DateTime<Utc>) -> ClusterSnapshot {
        let mut hosts = Vec::with_capacity(self.hosts.len());

        self.hosts.walk_from(Cursor::START, |name, record| {
            let mut host = HostSnapshot::capture(name, record, now);
            host.builtin = snapshot::capture_metrics(record.payload.builtin(), now);
            host.user = snapshot::capture_metrics(record.payload.user(), now);
            hosts.push(host);
            Visit::Continue
        });

        hosts.sort_by(|a, b| a.name.cmp(&b.name));

        ClusterSnapshot {
            taken_at: now,
            hosts,
        }
    }
}
