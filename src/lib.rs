//! src/lib.rs
//!
//! loopmon: host companion for a two-loop detector.
//!
//! The core (`protocol`, `graph`, `params`, `session`) turns the device's
//! inbound line stream into typed state and user intents into command text.
//! `link` is the serial transport and `app`/`ui`/`panels` the terminal front
//! end.

pub mod app;
pub mod config;
pub mod error;
pub mod graph;
pub mod link;
pub mod panels;
pub mod params;
pub mod protocol;
pub mod session;
pub mod ui;

pub use error::{MonitorError, Result};
pub use session::{Event, Session, ViewAction};
