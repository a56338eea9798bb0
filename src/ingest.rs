//! Line-oriented JSON producer
//!
//! Every line carries one sample for one host:
//!
//! ```text
//! {"host": "web-1", "host_ttl": 300, "metric": {"name": "load_one", "value": 0.42, "ttl": 60}}
//! {"host": "web-1"}                      ← heartbeat only
//! ```
//!
//! Malformed lines are logged and skipped.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, trace, warn};

use crate::cluster::{Cluster, MetricScope, MetricUpdate, MetricValue};
use crate::envelope::Ttl;

#[derive(Debug, Clone, Deserialize)]
pub struct Sample {
    pub host: String,

    /// Announced host ttl; hosts keep their current ttl when absent
    #[serde(default)]
    pub host_ttl: Option<Ttl>,

    #[serde(default)]
    pub metric: Option<SampleMetric>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SampleMetric {
    pub name: String,
    pub value: MetricValue,
    #[serde(default)]
    pub units: String,
    #[serde(default)]
    pub ttl: Ttl,
    #[serde(default)]
    pub scope: Option<MetricScope>,
}

impl Sample {
    /// Write this sample into `cluster` as of `now`
    pub fn apply(self, cluster: &Cluster, now: DateTime<Utc>) -> anyhow::Result<()> {
        // a recorded metric already counts as a heartbeat; the host is only
        // touched on its own once the metric went in
        if let Some(metric) = self.metric {
            let mut update = MetricUpdate::new(metric.name, metric.value, metric.ttl)
                .with_units(metric.units);
            update.scope = metric.scope;

            cluster
                .record_metric(&self.host, update, now)
                .with_context(|| format!("failed to record metric for {:?}", self.host))?;

            if let Some(ttl) = self.host_ttl {
                cluster
                    .refresh_host(&self.host, ttl, now)
                    .with_context(|| format!("failed to refresh host {:?}", self.host))?;
            }

            return Ok(());
        }

        let refreshed = match self.host_ttl {
            Some(ttl) => cluster.refresh_host(&self.host, ttl, now),
            None => cluster.heartbeat(&self.host, now),
        };
        refreshed.with_context(|| format!("failed to refresh host {:?}", self.host))
    }
}

/// Parse and apply a single line
pub fn apply_line(cluster: &Cluster, line: &str, now: DateTime<Utc>) -> anyhow::Result<()> {
    let sample: Sample = serde_json::from_str(line).context("failed to parse sample")?;
    trace!("received sample for {}", sample.host);
    sample.apply(cluster, now)
}

/// Counters for a finished ingest run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub accepted: usize,
    pub rejected: usize,
}

/// Feed every line of `reader` into `cluster` until end of input
pub async fn ingest_lines<R>(reader: R, cluster: &Cluster) -> anyhow::Result<IngestStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut stats = IngestStats::default();

    while let Some(line) = lines.next_line().await.context("failed to read input")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match apply_line(cluster, line, Utc::now()) {
            Ok(()) => stats.accepted += 1,
            Err(e) => {
                warn!("skipping sample: {e:#}");
                stats.rejected += 1;
            }
        }
    }

    debug!(
        "ingest finished: {} accepted, {} rejected",
        stats.accepted, stats.rejected
    );

    Ok(stats)
}
