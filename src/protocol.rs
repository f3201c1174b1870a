//! src/protocol.rs
//!
//! Line protocol spoken by the detector: inbound line classification and
//! decoders, plus the outbound command set.

pub mod command;
pub mod eeprom;
pub mod router;
pub mod telemetry;

/// Re-exports
pub use command::Command;
pub use eeprom::{EepromDump, EepromRow};
pub use router::{Inbound, route};
pub use telemetry::TelemetryFrame;
