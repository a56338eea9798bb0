//! Live cache of cluster monitoring data with TTL-based expiry
//!
//! Producers write hosts and their metrics into a shared [`Cluster`], readers
//! export it with [`Cluster::snapshot`], and a single
//! [`SweeperHandle`](actors::sweeper::SweeperHandle) task periodically removes
//! every host and metric whose time-to-live has elapsed.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use cluster_cache::{Cluster, actors::sweeper::SweeperHandle, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let cluster = Arc::new(Cluster::new(&config.cluster));
//!     let sweeper = SweeperHandle::spawn(cluster.clone(), &config.sweep);
//!     // hand `cluster` to producers and readers
//!     sweeper.shutdown().await
//! }
//! ```

pub mod actors;
pub mod cluster;
pub mod config;
pub mod envelope;
pub mod ingest;
pub mod store;
pub mod sweep;
pub mod util;

pub use cluster::{Cluster, MetricScope, MetricUpdate, MetricValue};
pub use envelope::{Envelope, Ttl, is_expired};
pub use sweep::{SweepReport, sweep_cluster, sweep_store};
