//! SweeperActor - Ages expired hosts and metrics out of the cluster
//!
//! The actor is the only task that ever deletes from the cluster. It wakes up
//! on a fixed interval, captures the current time once and runs a full
//! [`sweep_cluster`] pass against that instant.
//!
//! ## Message Flow
//!
//! ```text
//! Timer tick → capture now → sweep pass → update stats → wait
//!     ↑
//!     └─── Commands (SweepNow, GetStats, UpdateInterval, Shutdown)
//! ```
//!
//! A pass is synchronous and never yields, so a shutdown request is only
//! observed between passes and can never leave a host half-removed.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::{debug, info, instrument, trace, warn};

use crate::cluster::Cluster;
use crate::config::SweepConfig;
use crate::sweep::{SweepReport, sweep_cluster};

use super::messages::{SweepCommand, SweepStats};

/// Actor that periodically sweeps a single cluster
pub struct SweeperActor {
    /// Shared cluster store
    cluster: Arc<Cluster>,

    /// Command receiver for control messages
    command_rx: mpsc::Receiver<SweepCommand>,

    /// Current sweep interval
    interval_duration: Duration,

    /// Accumulated statistics
    stats: SweepStats,
}

fn sweep_timer(period: Duration) -> Interval {
    // first tick one period from now: nothing is stale right after startup
    let mut ticker = time::interval_at(time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

impl SweeperActor {
    pub fn new(
        cluster: Arc<Cluster>,
        config: &SweepConfig,
        command_rx: mpsc::Receiver<SweepCommand>,
    ) -> Self {
        Self {
            cluster,
            command_rx,
            interval_duration: config.interval(),
            stats: SweepStats::default(),
        }
    }

    /// Run the actor's main loop
    ///
    /// This runs until:
    /// - A Shutdown command is received
    /// - Every handle has been dropped
    #[instrument(skip(self), fields(interval = ?self.interval_duration))]
    pub async fn run(mut self) {
        debug!("starting sweeper actor");

        let mut ticker = sweep_timer(self.interval_duration);

        loop {
            tokio::select! {
                // Timer tick - run a pass
                _ = ticker.tick() => {
                    self.sweep();
                }

                // Handle commands, or exit once every handle is gone
                cmd = self.command_rx.recv() => {
                    let Some(cmd) = cmd else {
                        warn!("command channel closed, shutting down");
                        break;
                    };

                    match cmd {
                        SweepCommand::SweepNow { respond_to } => {
                            debug!("received SweepNow command");
                            let report = self.sweep();
                            let _ = respond_to.send(report);
                        }

                        SweepCommand::GetStats { respond_to } => {
                            let _ = respond_to.send(self.stats.clone());
                        }

                        SweepCommand::UpdateInterval { interval_secs } => {
                            debug!("updating interval to {interval_secs}s");
                            self.interval_duration = Duration::from_secs(interval_secs.max(1));
                            ticker = sweep_timer(self.interval_duration);
                        }

                        SweepCommand::Shutdown => {
                            debug!("received shutdown command");
                            break;
                        }
                    }
                }
            }
        }

        debug!("sweeper actor stopped");
    }

    /// Run a single pass against the current time and record it
    fn sweep(&mut self) -> SweepReport {
        trace!("sweeper running");

        let report = sweep_cluster(&self.cluster, Utc::now());
        self.stats.record(&report);

        if report.removed_anything() {
            info!(
                "sweep removed {} hosts ({} metrics disposed) and {} metrics in {:?}",
                report.hosts_removed,
                report.metrics_disposed,
                report.metrics_removed,
                report.elapsed
            );
        } else {
            trace!(
                "sweep visited {} hosts, nothing expired",
                report.hosts_visited
            );
        }

        report
    }
}

/// Handle for controlling a SweeperActor
///
/// This handle provides a typed API for sending commands to the actor.
/// It can be cloned and shared across tasks; the actor stops once every
/// clone has been dropped.
#[derive(Clone)]
pub struct SweeperHandle {
    /// Command sender
    sender: mpsc::Sender<SweepCommand>,
}

impl SweeperHandle {
    /// Spawn a new sweeper actor for `cluster`
    pub fn spawn(cluster: Arc<Cluster>, config: &SweepConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);

        let actor = SweeperActor::new(cluster, config, cmd_rx);

        tokio::spawn(actor.run());

        Self { sender: cmd_tx }
    }

    /// Run a pass immediately and return its report
    pub async fn sweep_now(&self) -> Result<SweepReport> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(SweepCommand::SweepNow { respond_to: tx })
            .await
            .context("failed to send SweepNow command")?;

        rx.await.context("failed to receive sweep report")
    }

    /// Get sweeper statistics
    pub async fn get_stats(&self) -> Option<SweepStats> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(SweepCommand::GetStats { respond_to: tx })
            .await
            .ok()?;

        rx.await.ok()
    }

    /// Update the sweep interval
    pub async fn update_interval(&self, interval_secs: u64) -> Result<()> {
        self.sender
            .send(SweepCommand::UpdateInterval { interval_secs })
            .await
            .context("failed to send UpdateInterval command")?;
        Ok(())
    }

    /// Gracefully shut down the sweeper
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(SweepCommand::Shutdown)
            .await
            .context("failed to send Shutdown command")?;
        Ok(())
    }
}
