//! src/params.rs
//!
//! Device parameter registers and the optimistic edit protocol that keeps
//! them in sync with the device.

pub mod sync;
pub mod table;

/// Re-exports
pub use sync::ParamSyncController;
pub use table::{ParameterRegister, ParameterTable, RegisterSpec, SyncState};
