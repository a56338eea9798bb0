use std::time::Duration;

use tracing::trace;

use crate::envelope::Ttl;
use crate::util::{get_host_ttl, get_sweep_interval};

/// Sweeper configuration
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SweepConfig {
    /// Seconds between two sweep passes
    #[serde(default = "default_sweep_interval")]
    pub interval: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: default_sweep_interval(),
        }
    }
}

impl SweepConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval.max(1))
    }
}

/// Layout of the cluster store
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ClusterConfig {
    #[serde(default = "default_host_buckets")]
    pub host_buckets: usize,

    #[serde(default = "default_metric_buckets")]
    pub metric_buckets: usize,

    /// Ttl for hosts that never announced one (0 = never expire)
    #[serde(default)]
    pub host_ttl: Ttl,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            host_buckets: default_host_buckets(),
            metric_buckets: default_metric_buckets(),
            host_ttl: Ttl::Immortal,
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sweep: SweepConfig,

    #[serde(default)]
    pub cluster: ClusterConfig,

    /// Seconds between two summaries of the cluster contents (0 = off)
    #[serde(default)]
    pub report_interval: u64,
}

impl Config {
    /// Apply overrides from the environment on top of the file contents
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(interval) = get_sweep_interval() {
            self.sweep.interval = interval;
        }
        if let Some(ttl) = get_host_ttl() {
            self.cluster.host_ttl = ttl;
        }
        self
    }
}

fn default_sweep_interval() -> u64 {
    180
}

fn default_host_buckets() -> usize {
    1024
}

fn default_metric_buckets() -> usize {
    64
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    serde_json::from_str(&file_content)
        .map_err(|e| anyhow::anyhow!("Invalid configuration file provided: {e}"))
        .inspect(|config| trace!("loaded config: {config:?}"))
}
