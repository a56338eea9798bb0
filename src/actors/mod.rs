//! Actor-based background tasks
//!
//! Each actor runs as an independent async task controlled through a cloneable
//! handle that talks to it over a Tokio mpsc channel.
//!
//! ## Architecture Overview
//!
//! ```text
//!   producers ──insert/refresh──►┌──────────────┐◄──lookup/snapshot── readers
//!                                │ Arc<Cluster> │
//!                                └──────▲───────┘
//!                                       │ delete (only writer that removes)
//!                               ┌───────┴───────┐
//!                               │ SweeperActor  │◄── SweeperHandle commands
//!                               └───────────────┘
//! ```
//!
//! ## Communication Patterns
//!
//! 1. **Commands**: the actor has an mpsc command channel for control messages
//! 2. **Request/Response**: oneshot channels for reports and statistics

pub mod messages;
pub mod sweeper;
