//! Metric payloads and the built-in metric catalogue

use serde::{Deserialize, Serialize};

use crate::envelope::{Envelope, Ttl};

/// Metrics every agent reports out of the box
///
/// These land in a host's built-in store; anything else a producer sends is
/// treated as user-defined.
pub const BUILTIN_METRICS: &[&str] = &[
    "boottime",
    "bytes_in",
    "bytes_out",
    "cpu_aidle",
    "cpu_idle",
    "cpu_nice",
    "cpu_num",
    "cpu_speed",
    "cpu_system",
    "cpu_user",
    "cpu_wio",
    "disk_free",
    "disk_total",
    "gexec",
    "heartbeat",
    "load_fifteen",
    "load_five",
    "load_one",
    "location",
    "machine_type",
    "mem_buffers",
    "mem_cached",
    "mem_free",
    "mem_shared",
    "mem_total",
    "mtu",
    "os_name",
    "os_release",
    "part_max_used",
    "pkts_in",
    "pkts_out",
    "proc_run",
    "proc_total",
    "swap_free",
    "swap_total",
    "sys_clock",
];

/// Which of a host's two metric stores a metric lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricScope {
    Builtin,
    User,
}

impl MetricScope {
    pub fn for_name(name: &str) -> Self {
        if BUILTIN_METRICS.contains(&name) {
            MetricScope::Builtin
        } else {
            MetricScope::User
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub value: MetricValue,
    #[serde(default)]
    pub units: String,
}

/// Stored form of a metric: the payload plus its refresh bookkeeping
pub type MetricRecord = Envelope<Metric>;

/// A single measurement handed over by a producer
#[derive(Debug, Clone, PartialEq)]
pub struct MetricUpdate {
    pub name: String,
    pub value: MetricValue,
    pub units: String,
    pub ttl: Ttl,
    /// Store to write into; derived from the name when `None`
    pub scope: Option<MetricScope>,
}

impl MetricUpdate {
    pub fn new(name: impl Into<String>, value: MetricValue, ttl: Ttl) -> Self {
        Self {
            name: name.into(),
            value,
            units: String::new(),
            ttl,
            scope: None,
        }
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    pub fn in_scope(mut self, scope: MetricScope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn scope(&self) -> MetricScope {
        self.scope.unwrap_or_else(|| MetricScope::for_name(&self.name))
    }
}
