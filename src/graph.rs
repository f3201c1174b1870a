//! src/graph.rs
//!
//! Top-level `graph` module: per-channel sample storage, viewport, Y
//! autoscaling and series persistence.

pub mod autoscale;
pub mod channel;
pub mod config;
pub mod data;
pub mod snapshot;
pub mod viewport;

/// Re-exports
pub use channel::{Channel, ChannelId, Zoom};
pub use config::GraphConfig;
pub use data::{Sample, SeriesStore};
pub use viewport::{ScrollState, Viewport};
