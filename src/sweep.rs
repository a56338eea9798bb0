//! Expiration sweep over the cluster hierarchy
//!
//! A pass walks the host store once. Live hosts get both of their metric
//! stores swept on the spot; expired hosts are unlinked from the cluster and
//! their metric stores disposed of, without looking at individual metrics.
//!
//! ## Walk protocol
//!
//! ```text
//! walk_from(cursor) ──► visitor finds expired entry ──► Stop(at)
//!        ▲                                                │
//!        │                                   remove_if(key, still expired)
//!        │                                                │
//!        └──── cursor = position of removed entry ◄───────┘
//! ```
//!
//! Resuming at the removed entry's position means every surviving entry is
//! visited exactly once per pass, however many entries are removed around it.
//! All decisions in a pass use the single `now` captured by the caller.

use std::fmt::Debug;
use std::hash::Hash;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::cluster::{Cluster, HostRecord};
use crate::envelope::Envelope;
use crate::store::{Cursor, KeyedStore, Removal, Visit, Walk};

/// Outcome of a single sweep pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepReport {
    /// The instant every expiry decision of the pass was made against
    pub swept_at: DateTime<Utc>,

    /// Host visits made by the walk (each surviving host counts once)
    pub hosts_visited: usize,

    /// Expired hosts unlinked from the cluster
    pub hosts_removed: usize,

    /// Expired metrics removed from hosts that are still alive
    pub metrics_removed: usize,

    /// Metrics released together with a removed host
    pub metrics_disposed: usize,

    /// Wall-clock time the pass took
    pub elapsed: Duration,
}

impl SweepReport {
    fn new(swept_at: DateTime<Utc>) -> Self {
        Self {
            swept_at,
            hosts_visited: 0,
            hosts_removed: 0,
            metrics_removed: 0,
            metrics_disposed: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn removed_anything(&self) -> bool {
        self.hosts_removed > 0 || self.metrics_removed > 0
    }
}

/// Remove every entry of `store` that is expired at `now`
///
/// Returns how many entries were removed.
pub fn sweep_store<K, T>(store: &KeyedStore<K, Envelope<T>>, now: DateTime<Utc>) -> usize
where
    K: AsRef<[u8]> + Hash + Eq + Clone + Debug,
{
    let mut removed = 0;
    let mut cursor = Cursor::START;

    loop {
        let mut victim = None;
        let walk = store.walk_from(cursor, |key, entry| {
            if entry.is_expired(now) {
                victim = Some(key.clone());
                Visit::Stop
            } else {
                Visit::Continue
            }
        });

        let (Walk::Stopped(at), Some(key)) = (walk, victim) else {
            break;
        };

        cursor = reap_entry(store, &key, at, now, &mut removed);
    }

    removed
}

/// Resolve an entry the walk stopped at because it looked expired
///
/// Returns the cursor the walk resumes from.
fn reap_entry<K, T>(
    store: &KeyedStore<K, Envelope<T>>,
    key: &K,
    at: Cursor,
    now: DateTime<Utc>,
    removed: &mut usize,
) -> Cursor
where
    K: AsRef<[u8]> + Hash + Eq + Debug,
{
    match store.remove_if(key, |entry| entry.is_expired(now)) {
        Removal::Removed { cursor, .. } => {
            trace!("removed expired entry {key:?}");
            *removed += 1;
            cursor
        }
        Removal::Retained { cursor } => {
            trace!("entry {key:?} was refreshed before removal");
            cursor
        }
        Removal::Absent => {
            warn!("entry {key:?} vanished before removal");
            at
        }
    }
}

fn sweep_host_metrics(record: &HostRecord, now: DateTime<Utc>) -> usize {
    sweep_store(record.payload.builtin(), now) + sweep_store(record.payload.user(), now)
}

/// Run one complete sweep pass over `cluster` as of `now`
pub fn sweep_cluster(cluster: &Cluster, now: DateTime<Utc>) -> SweepReport {
    let started = Instant::now();
    let hosts = cluster.hosts();
    let mut report = SweepReport::new(now);
    let mut cursor = Cursor::START;

    loop {
        let mut victim = None;
        let walk = hosts.walk_from(cursor, |name, record| {
            report.hosts_visited += 1;

            if record.is_expired(now) {
                victim = Some(name.clone());
                return Visit::Stop;
            }

            report.metrics_removed += sweep_host_metrics(record, now);
            Visit::Continue
        });

        let (Walk::Stopped(at), Some(name)) = (walk, victim) else {
            break;
        };

        cursor = reap_host(hosts, &name, at, now, &mut report);
    }

    report.elapsed = started.elapsed();
    report
}

/// Resolve a host the walk stopped at because it looked expired
///
/// An expired host is unlinked and disposed of. A host refreshed since the
/// walk saw it stays, and its metrics are swept here since the walk skipped
/// them. Returns the cursor the walk resumes from.
fn reap_host(
    hosts: &KeyedStore<String, HostRecord>,
    name: &str,
    at: Cursor,
    now: DateTime<Utc>,
    report: &mut SweepReport,
) -> Cursor {
    match hosts.remove_if(name, |record| record.is_expired(now)) {
        Removal::Removed { value, cursor } => {
            let disposed = value.payload.dispose();
            debug!("removed expired host {name:?} ({disposed} metrics)");
            report.hosts_removed += 1;
            report.metrics_disposed += disposed;
            cursor
        }
        Removal::Retained { cursor } => {
            debug!("host {name:?} was refreshed before removal");
            if let Some(removed) = hosts.with(name, |record| sweep_host_metrics(record, now)) {
                report.metrics_removed += removed;
            }
            cursor
        }
        Removal::Absent => {
            warn!("host {name:?} vanished before removal");
            at
        }
    }
}
