//! src/error.rs
//!
//! Error type shared by the protocol, graph, parameter and session layers.
//!
//! Nothing here is fatal: every variant leaves prior state intact and the
//! caller decides whether to log it or surface it as a status message.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    /// A `LIVE:` payload did not carry exactly 22 comma fields.
    #[error("malformed telemetry: expected 22 fields, got {fields}")]
    MalformedTelemetry { fields: usize },

    /// A `PARAMETERS:` payload did not match the register schema.
    #[error("malformed parameter snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("cannot parse {field} from {text:?}")]
    NumericParse { field: &'static str, text: String },

    /// A local edit was out of range or not a number.
    #[error("{name}: value {text:?} must be between 0 and {high}")]
    ValidationRejected {
        name: String,
        text: String,
        high: i32,
    },

    #[error("no register at row {0}")]
    UnknownRegister(usize),

    /// Attempted send with no open transport.
    #[error("serial port not open")]
    IoUnavailable,

    #[error("not allowed while live mode is on")]
    LiveActive,

    #[error("not allowed while connected")]
    Connected,

    #[error("invalid series file: {0}")]
    InvalidSeriesFile(String),

    #[error("unknown command {0:?}")]
    UnknownCommand(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serial error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
