//! Message types for actor communication
//!
//! ## Design Principles
//!
//! 1. **Commands**: Request/response messages sent to the sweeper via mpsc
//! 2. **Replies**: oneshot channels carried inside the command
//! 3. **Between passes**: commands are only handled while no pass is running

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::oneshot;

use crate::sweep::SweepReport;

/// Commands that can be sent to the SweeperActor
#[derive(Debug)]
pub enum SweepCommand {
    /// Run a pass immediately (bypassing the interval timer)
    ///
    /// Used for testing and manual cleanup.
    SweepNow {
        /// Channel to send the pass report back
        respond_to: oneshot::Sender<SweepReport>,
    },

    /// Get accumulated sweep statistics
    GetStats {
        respond_to: oneshot::Sender<SweepStats>,
    },

    /// Update the sweep interval
    ///
    /// The timer restarts with the new interval right away.
    UpdateInterval {
        /// New interval in seconds
        interval_secs: u64,
    },

    /// Gracefully shut down the sweeper
    ///
    /// Never interrupts a pass; the actor exits before starting the next one.
    Shutdown,
}

/// Sweeper statistics accumulated over the actor's lifetime
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SweepStats {
    /// Completed passes (timer and manual)
    pub passes: u64,

    /// Hosts removed across all passes
    pub hosts_removed: u64,

    /// Metrics removed from live hosts across all passes
    pub metrics_removed: u64,

    /// Metrics released along with removed hosts
    pub metrics_disposed: u64,

    /// When the most recent pass was made
    pub last_pass: Option<DateTime<Utc>>,
}

impl SweepStats {
    pub fn record(&mut self, report: &SweepReport) {
        self.passes += 1;
        self.hosts_removed += report.hosts_removed as u64;
        self.metrics_removed += report.metrics_removed as u64;
        self.metrics_disposed += report.metrics_disposed as u64;
        self.last_pass = Some(report.swept_at);
    }
}
