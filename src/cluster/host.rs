//! Host records and the two metric stores each host owns

use crate::envelope::Envelope;
use crate::store::KeyedStore;

use super::metric::{MetricRecord, MetricScope};

pub type MetricStore = KeyedStore<String, MetricRecord>;

/// Payload of a host record
///
/// A host exclusively owns its metric stores. They are only reachable through
/// the host's entry in the cluster, and are emptied by [`Host::dispose`] once
/// that entry has been unlinked.
#[derive(Debug)]
pub struct Host {
    builtin: MetricStore,
    user: MetricStore,
}

/// Stored form of a host: the payload plus its refresh bookkeeping
pub type HostRecord = Envelope<Host>;

impl Host {
    pub fn new(metric_buckets: usize) -> Self {
        Self {
            builtin: KeyedStore::new(metric_buckets),
            user: KeyedStore::new(metric_buckets),
        }
    }

    pub fn metrics(&self, scope: MetricScope) -> &MetricStore {
        match scope {
            MetricScope::Builtin => &self.builtin,
            MetricScope::User => &self.user,
        }
    }

    pub fn builtin(&self) -> &MetricStore {
        &self.builtin
    }

    pub fn user(&self) -> &MetricStore {
        &self.user
    }

    pub fn metric_count(&self) -> usize {
        self.builtin.len() + self.user.len()
    }

    /// Release both metric stores, returning how many metrics they held
    pub fn dispose(self) -> usize {
        self.builtin.drain() + self.user.drain()
    }
}
